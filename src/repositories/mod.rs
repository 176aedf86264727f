//! Repositorios
//!
//! Contratos de acceso a datos. Hay una implementación PostgreSQL (`sqlx`)
//! y otra en memoria que se elige con `STORAGE_BACKEND=memory`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::financial_entry::{EntryFilters, FinancialEntry};
use crate::models::pagination::{Page, PageRequest};
use crate::models::truck::{Truck, TruckFilters};
use crate::models::user::{NewUser, User};
use crate::utils::errors::{AppError, AppResult};

pub mod financial_entry_repository;
pub mod memory_repository;
pub mod truck_repository;
pub mod user_repository;

pub use financial_entry_repository::PgFinancialEntryRepository;
pub use memory_repository::{
    InMemoryFinancialEntryRepository, InMemoryTruckRepository, InMemoryUserRepository,
};
pub use truck_repository::PgTruckRepository;
pub use user_repository::PgUserRepository;

/// Registro de camiones
#[async_trait]
pub trait TruckRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Truck>>;

    async fn find_active(&self) -> AppResult<Vec<Truck>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Truck>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Truck>>;

    async fn find_page(&self, filters: &TruckFilters, page: PageRequest) -> AppResult<Page<Truck>>;

    /// `exclude` permite ignorar al propio camión al editar
    async fn license_plate_exists(&self, license_plate: &str, exclude: Option<Uuid>) -> AppResult<bool>;

    async fn create(&self, truck: Truck) -> AppResult<Truck>;

    /// Persiste todos los campos mutables de un camión ya mezclado
    async fn update(&self, truck: Truck) -> AppResult<Truck>;
}

/// Fuente de registros financieros
#[async_trait]
pub trait FinancialEntryRepository: Send + Sync {
    async fn find_by_filters(&self, filters: &EntryFilters) -> AppResult<Vec<FinancialEntry>>;

    async fn find_page(
        &self,
        filters: &EntryFilters,
        page: PageRequest,
    ) -> AppResult<Page<FinancialEntry>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FinancialEntry>>;

    async fn create(&self, entry: FinancialEntry) -> AppResult<FinancialEntry>;

    async fn update(&self, entry: FinancialEntry) -> AppResult<FinancialEntry>;
}

/// Usuarios
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn record_login(&self, id: Uuid) -> AppResult<()>;
}

/// Traduce violaciones de unicidad a `Conflict`
pub(crate) fn map_unique_violation(error: sqlx::Error, conflict: impl FnOnce() -> AppError) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict(),
        _ => AppError::Database(error),
    }
}

/// Patrón `%term%` para `LIKE`/`ILIKE ... ESCAPE '\'`. Los comodines del
/// término se escapan para que coincidan literalmente, igual que en memoria.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("volvo"), "%volvo%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern(r"c:\x"), r"%c:\\x%");
    }
}

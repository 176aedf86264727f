//! Repositorios en memoria
//!
//! Misma semántica de filtros y orden que PostgreSQL. Se usan con
//! `STORAGE_BACKEND=memory` y en los tests de la API.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FinancialEntryRepository, TruckRepository, UserRepository};
use crate::models::financial_entry::{EntryFilters, FinancialEntry};
use crate::models::pagination::{Page, PageRequest};
use crate::models::truck::{Truck, TruckFilters};
use crate::models::user::{NewUser, User};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

#[derive(Default)]
pub struct InMemoryTruckRepository {
    trucks: RwLock<Vec<Truck>>,
}

impl InMemoryTruckRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_plate(mut trucks: Vec<Truck>) -> Vec<Truck> {
    trucks.sort_by(|a, b| a.license_plate.cmp(&b.license_plate));
    trucks
}

#[async_trait]
impl TruckRepository for InMemoryTruckRepository {
    async fn find_all(&self) -> AppResult<Vec<Truck>> {
        Ok(by_plate(self.trucks.read().await.clone()))
    }

    async fn find_active(&self) -> AppResult<Vec<Truck>> {
        let trucks = self.trucks.read().await;
        Ok(by_plate(trucks.iter().filter(|t| t.is_active()).cloned().collect()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Truck>> {
        let trucks = self.trucks.read().await;
        Ok(trucks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Truck>> {
        let trucks = self.trucks.read().await;
        Ok(trucks.iter().filter(|t| ids.contains(&t.id)).cloned().collect())
    }

    async fn find_page(&self, filters: &TruckFilters, page: PageRequest) -> AppResult<Page<Truck>> {
        let trucks = self.trucks.read().await;
        let mut matching: Vec<Truck> = trucks.iter().filter(|t| filters.matches(t)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::from_slice(matching, page))
    }

    async fn license_plate_exists(&self, license_plate: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let trucks = self.trucks.read().await;
        Ok(trucks
            .iter()
            .any(|t| t.license_plate == license_plate && Some(t.id) != exclude))
    }

    async fn create(&self, truck: Truck) -> AppResult<Truck> {
        let mut trucks = self.trucks.write().await;
        if trucks.iter().any(|t| t.license_plate == truck.license_plate) {
            return Err(conflict_error("Truck", "license plate", &truck.license_plate));
        }
        trucks.push(truck.clone());
        Ok(truck)
    }

    async fn update(&self, truck: Truck) -> AppResult<Truck> {
        let mut trucks = self.trucks.write().await;
        if trucks
            .iter()
            .any(|t| t.license_plate == truck.license_plate && t.id != truck.id)
        {
            return Err(conflict_error("Truck", "license plate", &truck.license_plate));
        }
        let slot = trucks
            .iter_mut()
            .find(|t| t.id == truck.id)
            .ok_or_else(|| not_found_error("Truck", &truck.id.to_string()))?;
        *slot = truck.clone();
        Ok(truck)
    }
}

#[derive(Default)]
pub struct InMemoryFinancialEntryRepository {
    entries: RwLock<Vec<FinancialEntry>>,
}

impl InMemoryFinancialEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn matching(&self, filters: &EntryFilters) -> Vec<FinancialEntry> {
        let entries = self.entries.read().await;
        let mut matching: Vec<FinancialEntry> =
            entries.iter().filter(|e| filters.matches(e)).cloned().collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        matching
    }
}

#[async_trait]
impl FinancialEntryRepository for InMemoryFinancialEntryRepository {
    async fn find_by_filters(&self, filters: &EntryFilters) -> AppResult<Vec<FinancialEntry>> {
        Ok(self.matching(filters).await)
    }

    async fn find_page(
        &self,
        filters: &EntryFilters,
        page: PageRequest,
    ) -> AppResult<Page<FinancialEntry>> {
        Ok(Page::from_slice(self.matching(filters).await, page))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FinancialEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, entry: FinancialEntry) -> AppResult<FinancialEntry> {
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: FinancialEntry) -> AppResult<FinancialEntry> {
        let mut entries = self.entries.write().await;
        let slot = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| not_found_error("Financial entry", &entry.id.to_string()))?;
        let updated = FinancialEntry {
            created_at: slot.created_at,
            created_user_id: slot.created_user_id,
            ..entry
        };
        *slot = updated.clone();
        Ok(updated)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(conflict_error("User", "email", &user.email));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            display_name: user.display_name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
            last_login_at: None,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

//! Coordinador de paginación y filtros
//!
//! Mantiene filtros, índice de página (base 0) y tamaño de página de un
//! listado. Cambiar filtros o tamaño vuelve a la primera página; si la
//! página pedida quedó fuera de rango se corrige a la última y se vuelve a
//! pedir una vez.

use async_trait::async_trait;

use crate::models::financial_entry::{EntryFilters, FinancialEntry};
use crate::models::pagination::{ensure_page_size, Page, PageRequest, DEFAULT_PAGE_SIZE};
use crate::models::truck::{Truck, TruckFilters};
use crate::repositories::{FinancialEntryRepository, TruckRepository};
use crate::utils::errors::AppResult;

/// Origen paginado de un listado
#[async_trait]
pub trait PageSource<F: Sync>: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, filters: &F, page: PageRequest) -> AppResult<Page<Self::Item>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    filters: F,
    page_index: u32,
    page_size: u32,
}

impl<F: Default> Default for ListQuery<F> {
    fn default() -> Self {
        Self {
            filters: F::default(),
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl<F> ListQuery<F>
where
    F: PartialEq + Sync,
{
    pub fn new(filters: F, page_size: u32) -> AppResult<Self> {
        Ok(Self {
            filters,
            page_index: 0,
            page_size: ensure_page_size(page_size)?,
        })
    }

    /// Estado equivalente a una petición HTTP (`page` base 1)
    pub fn from_request(filters: F, request: PageRequest) -> Self {
        Self {
            filters,
            page_index: request.page() - 1,
            page_size: request.limit(),
        }
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Devuelve `true` si los filtros cambiaron (y la página volvió a 0)
    pub fn set_filters(&mut self, filters: F) -> bool {
        if self.filters == filters {
            return false;
        }
        self.filters = filters;
        self.page_index = 0;
        true
    }

    pub fn set_page_size(&mut self, page_size: u32) -> AppResult<()> {
        let page_size = ensure_page_size(page_size)?;
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page_index = 0;
        }
        Ok(())
    }

    pub fn go_to_page(&mut self, page_index: u32) {
        self.page_index = page_index;
    }

    pub fn page_request(&self) -> AppResult<PageRequest> {
        PageRequest::new(self.page_index + 1, self.page_size)
    }

    /// Pide la página actual y corrige el índice si quedó más allá del final
    pub async fn fetch<S>(&mut self, source: &S) -> AppResult<Page<S::Item>>
    where
        S: PageSource<F> + ?Sized,
    {
        let page = source.fetch_page(&self.filters, self.page_request()?).await?;

        let last = last_page_index(page.pagination.total, self.page_size);
        if self.page_index > last {
            self.page_index = last;
            return source.fetch_page(&self.filters, self.page_request()?).await;
        }
        Ok(page)
    }
}

/// Último índice válido (base 0); 0 cuando no hay resultados
pub fn last_page_index(total: u64, page_size: u32) -> u32 {
    if total == 0 || page_size == 0 {
        return 0;
    }
    ((total - 1) / page_size as u64) as u32
}

/// Listado de camiones sobre el repositorio
pub struct TruckPages<'a>(pub &'a dyn TruckRepository);

#[async_trait]
impl PageSource<TruckFilters> for TruckPages<'_> {
    type Item = Truck;

    async fn fetch_page(&self, filters: &TruckFilters, page: PageRequest) -> AppResult<Page<Truck>> {
        self.0.find_page(filters, page).await
    }
}

/// Listado de registros financieros sobre el repositorio
pub struct EntryPages<'a>(pub &'a dyn FinancialEntryRepository);

#[async_trait]
impl PageSource<EntryFilters> for EntryPages<'_> {
    type Item = FinancialEntry;

    async fn fetch_page(
        &self,
        filters: &EntryFilters,
        page: PageRequest,
    ) -> AppResult<Page<FinancialEntry>> {
        self.0.find_page(filters, page).await
    }
}

//! Modelos de paginación
//!
//! Contrato remoto 1-based (`page` + `limit`) y la respuesta paginada
//! `{ data, pagination }` que comparten los listados de camiones y registros financieros.

use serde::{Deserialize, Serialize};

use crate::utils::errors::{bad_request_error, AppError, AppResult};

/// Tamaños de página permitidos
pub const ALLOWED_PAGE_SIZES: [u32; 5] = [5, 10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Verifica que el tamaño de página esté entre los permitidos
pub fn ensure_page_size(size: u32) -> AppResult<u32> {
    if ALLOWED_PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(AppError::BadRequest(format!(
            "limit {} is not allowed, expected one of {:?}",
            size, ALLOWED_PAGE_SIZES
        )))
    }
}

/// Query string de paginación tal como llega por HTTP
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationQuery {
    /// Convierte a un `PageRequest` validado
    pub fn into_request(self) -> AppResult<PageRequest> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(bad_request_error("page starts at 1"));
        }
        PageRequest::new(page, self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// Petición de página ya validada (page 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> AppResult<Self> {
        let limit = ensure_page_size(limit)?;
        Ok(Self {
            page: page.max(1),
            limit,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// Metadatos de paginación devueltos al cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit() as u64;
        let total_pages = ((total + limit - 1) / limit) as u32;
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages,
            has_next: request.page() < total_pages,
            has_previous: request.page() > 1,
        }
    }
}

/// Página de resultados
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(request, total),
        }
    }

    /// Recorta una colección ya filtrada en memoria
    pub fn from_slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self::new(data, request, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_page_size() {
        assert!(PageRequest::new(1, 10).is_ok());
        assert!(PageRequest::new(1, 7).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 1000).is_err());
    }

    #[test]
    fn test_query_defaults_and_zero_page() {
        let request = PaginationQuery { page: None, limit: None }.into_request().unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), DEFAULT_PAGE_SIZE);

        let zero = PaginationQuery { page: Some(0), limit: Some(5) }.into_request();
        assert!(zero.is_err());
    }

    #[test]
    fn test_meta_flags() {
        let request = PageRequest::new(2, 10).unwrap();
        let meta = PaginationMeta::new(request, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_previous);

        let empty = PaginationMeta::new(PageRequest::new(1, 10).unwrap(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_previous);
    }

    #[test]
    fn test_from_slice_cuts_requested_window() {
        let items: Vec<u32> = (1..=12).collect();
        let page = Page::from_slice(items, PageRequest::new(3, 5).unwrap());
        assert_eq!(page.data, vec![11, 12]);
        assert_eq!(page.pagination.total, 12);
        assert!(!page.pagination.has_next);
    }
}

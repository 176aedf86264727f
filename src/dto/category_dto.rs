use serde::{Deserialize, Serialize};

use crate::models::category::{Category, CategoryStats};
use crate::models::financial_entry::EntryType;

// Filtro opcional `?type=expense|revenue`
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    pub stats: CategoryStats,
}

use serde::Serialize;

use crate::models::financial_entry::FinancialEntry;

// Registro financiero con la placa del camión para los listados
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntryResponse {
    #[serde(flatten)]
    pub entry: FinancialEntry,
    pub license_plate: Option<String>,
    pub can_edit: bool,
}

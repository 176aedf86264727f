use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::financial_entry_dto::FinancialEntryResponse;
use crate::dto::ApiResponse;
use crate::middleware::auth::SessionContext;
use crate::models::financial_entry::{
    CreateFinancialEntryRequest, EntryFilters, FinancialEntry, UpdateFinancialEntryRequest,
};
use crate::models::pagination::{Page, PageRequest};
use crate::repositories::{FinancialEntryRepository, TruckRepository};
use crate::services::list_query::{EntryPages, ListQuery};
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};

pub struct FinancialEntryController {
    entries: Arc<dyn FinancialEntryRepository>,
    trucks: Arc<dyn TruckRepository>,
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

impl FinancialEntryController {
    pub fn new(entries: Arc<dyn FinancialEntryRepository>, trucks: Arc<dyn TruckRepository>) -> Self {
        Self { entries, trucks }
    }

    pub async fn list(
        &self,
        session: &SessionContext,
        filters: EntryFilters,
        request: PageRequest,
    ) -> AppResult<Page<FinancialEntryResponse>> {
        let mut query = ListQuery::from_request(filters, request);
        let page = query.fetch(&EntryPages(self.entries.as_ref())).await?;

        let mut truck_ids: Vec<Uuid> = page.data.iter().map(|e| e.truck_id).collect();
        truck_ids.sort_unstable();
        truck_ids.dedup();
        let plates: HashMap<Uuid, String> = self
            .trucks
            .find_by_ids(&truck_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.license_plate))
            .collect();

        Ok(page.map(|entry| FinancialEntryResponse {
            license_plate: plates.get(&entry.truck_id).cloned(),
            can_edit: session.can_edit_entry(&entry),
            entry,
        }))
    }

    pub async fn get_by_id(&self, session: &SessionContext, id: Uuid) -> AppResult<FinancialEntryResponse> {
        let entry = self.find(id).await?;
        self.respond(session, entry).await
    }

    pub async fn create(
        &self,
        session: &SessionContext,
        request: CreateFinancialEntryRequest,
    ) -> AppResult<ApiResponse<FinancialEntryResponse>> {
        request.validate()?;

        self.trucks
            .find_by_id(request.truck_id)
            .await?
            .ok_or_else(|| not_found_error("Truck", &request.truck_id.to_string()))?;

        let now = Utc::now();
        let entry = FinancialEntry {
            id: Uuid::new_v4(),
            truck_id: request.truck_id,
            date: request.date,
            entry_type: request.entry_type,
            category: request.category.trim().to_string(),
            amount: request.amount,
            liters_filled: request.liters_filled,
            odometer_reading: request.odometer_reading,
            description: clean_description(request.description),
            created_user_id: session.user_id,
            created_at: now,
            updated_at: now,
        };
        entry.check_consistency()?;

        let entry = self.entries.create(entry).await?;
        info!(
            "💰 Registro financiero {} creado: {} {} ({})",
            entry.id, entry.entry_type, entry.amount, entry.category
        );

        let response = self.respond(session, entry).await?;
        Ok(ApiResponse::success_with_message(response, "Registro financiero creado exitosamente"))
    }

    pub async fn update(
        &self,
        session: &SessionContext,
        id: Uuid,
        request: UpdateFinancialEntryRequest,
    ) -> AppResult<ApiResponse<FinancialEntryResponse>> {
        request.validate()?;

        let mut entry = self.find(id).await?;
        if !session.can_edit_entry(&entry) {
            return Err(forbidden_error(
                "edit financial entry",
                "only its creator or an admin can edit it",
            ));
        }

        if let Some(date) = request.date {
            entry.date = date;
        }
        if let Some(entry_type) = request.entry_type {
            entry.entry_type = entry_type;
        }
        if let Some(category) = request.category {
            entry.category = category.trim().to_string();
        }
        if let Some(amount) = request.amount {
            entry.amount = amount;
        }
        if request.liters_filled.is_some() {
            entry.liters_filled = request.liters_filled;
        }
        if request.odometer_reading.is_some() {
            entry.odometer_reading = request.odometer_reading;
        }
        if let Some(description) = request.description {
            entry.description = clean_description(description);
        }

        // Al dejar de ser combustible se descartan las lecturas heredadas
        if !entry.is_fuel_expense() {
            if request.liters_filled.is_none() {
                entry.liters_filled = None;
            }
            if request.odometer_reading.is_none() {
                entry.odometer_reading = None;
            }
        }
        entry.check_consistency()?;
        entry.updated_at = Utc::now();

        let entry = self.entries.update(entry).await?;
        info!("✏️ Registro financiero {} actualizado", entry.id);

        let response = self.respond(session, entry).await?;
        Ok(ApiResponse::success_with_message(response, "Registro financiero actualizado exitosamente"))
    }

    /// Los registros financieros no se eliminan
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.find(id).await?;
        Err(AppError::NotImplemented(
            "Financial entries cannot be deleted".to_string(),
        ))
    }

    async fn find(&self, id: Uuid) -> AppResult<FinancialEntry> {
        self.entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Financial entry", &id.to_string()))
    }

    async fn respond(&self, session: &SessionContext, entry: FinancialEntry) -> AppResult<FinancialEntryResponse> {
        let license_plate = self
            .trucks
            .find_by_id(entry.truck_id)
            .await?
            .map(|t| t.license_plate);

        Ok(FinancialEntryResponse {
            license_plate,
            can_edit: session.can_edit_entry(&entry),
            entry,
        })
    }
}

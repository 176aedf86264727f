use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::ApiResponse;
use crate::models::pagination::{Page, PageRequest};
use crate::models::truck::{
    CreateTruckRequest, Truck, TruckFilters, TruckStatus, UpdateTruckRequest,
};
use crate::repositories::TruckRepository;
use crate::services::list_query::{ListQuery, TruckPages};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};
use crate::utils::validation::normalize_license_plate;

pub struct TruckController {
    repository: Arc<dyn TruckRepository>,
}

impl TruckController {
    pub fn new(repository: Arc<dyn TruckRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, filters: TruckFilters, request: PageRequest) -> AppResult<Page<Truck>> {
        let mut query = ListQuery::from_request(filters, request);
        query.fetch(&TruckPages(self.repository.as_ref())).await
    }

    pub async fn list_active(&self) -> AppResult<Vec<Truck>> {
        self.repository.find_active().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Truck> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Truck", &id.to_string()))
    }

    pub async fn create(&self, request: CreateTruckRequest) -> AppResult<ApiResponse<Truck>> {
        request.validate()?;

        let license_plate = normalize_license_plate(&request.license_plate);
        if self.repository.license_plate_exists(&license_plate, None).await? {
            return Err(conflict_error("Truck", "license plate", &license_plate));
        }

        let now = Utc::now();
        let truck = self
            .repository
            .create(Truck {
                id: Uuid::new_v4(),
                license_plate,
                model: request.model.trim().to_string(),
                year: request.year,
                status: request.status.unwrap_or(TruckStatus::Active),
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!("🚛 Camión registrado: {} ({})", truck.license_plate, truck.id);
        Ok(ApiResponse::success_with_message(truck, "Camión registrado exitosamente"))
    }

    pub async fn update(&self, id: Uuid, request: UpdateTruckRequest) -> AppResult<ApiResponse<Truck>> {
        request.validate()?;

        let mut truck = self.get_by_id(id).await?;

        if let Some(plate) = request.license_plate.as_deref() {
            let plate = normalize_license_plate(plate);
            if plate != truck.license_plate
                && self.repository.license_plate_exists(&plate, Some(id)).await?
            {
                return Err(conflict_error("Truck", "license plate", &plate));
            }
            truck.license_plate = plate;
        }
        if let Some(model) = request.model.as_deref() {
            truck.model = model.trim().to_string();
        }
        if let Some(year) = request.year {
            truck.year = year;
        }
        if let Some(status) = request.status {
            truck.status = status;
        }
        truck.updated_at = Utc::now();

        let truck = self.repository.update(truck).await?;
        info!("✏️ Camión actualizado: {}", truck.license_plate);
        Ok(ApiResponse::success_with_message(truck, "Camión actualizado exitosamente"))
    }

    pub async fn change_status(&self, id: Uuid, status: TruckStatus) -> AppResult<ApiResponse<Truck>> {
        let mut truck = self.get_by_id(id).await?;
        if truck.status == status {
            return Ok(ApiResponse::success(truck));
        }

        truck.status = status;
        truck.updated_at = Utc::now();
        let truck = self.repository.update(truck).await?;

        info!("🔄 Camión {} ahora {}", truck.license_plate, truck.status.as_str());
        Ok(ApiResponse::success_with_message(truck, "Estado del camión actualizado"))
    }

    /// Los camiones no se borran: se desactivan
    pub async fn deactivate(&self, id: Uuid) -> AppResult<ApiResponse<Truck>> {
        self.change_status(id, TruckStatus::Inactive).await
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{contains_pattern, map_unique_violation, TruckRepository};
use crate::models::pagination::{Page, PageRequest};
use crate::models::truck::{non_blank, Truck, TruckFilters};
use crate::utils::errors::{conflict_error, AppResult};

const TRUCK_COLUMNS: &str = "id, license_plate, model, year, status, created_at, updated_at";

pub struct PgTruckRepository {
    pool: PgPool,
}

impl PgTruckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &TruckFilters) {
    builder.push(" WHERE 1 = 1");

    if let Some(status) = filters.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(year) = filters.year {
        builder.push(" AND year = ").push_bind(year);
    }
    if let Some(model) = non_blank(&filters.model) {
        builder
            .push(" AND model ILIKE ")
            .push_bind(contains_pattern(model))
            .push(" ESCAPE '\\'");
    }
    if let Some(term) = non_blank(&filters.search) {
        let pattern = contains_pattern(term);
        builder
            .push(" AND (license_plate ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR model ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR year::text LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

#[async_trait]
impl TruckRepository for PgTruckRepository {
    async fn find_all(&self) -> AppResult<Vec<Truck>> {
        let trucks = sqlx::query_as::<_, Truck>(&format!(
            "SELECT {} FROM trucks ORDER BY license_plate",
            TRUCK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(trucks)
    }

    async fn find_active(&self) -> AppResult<Vec<Truck>> {
        let trucks = sqlx::query_as::<_, Truck>(&format!(
            "SELECT {} FROM trucks WHERE status = 'active' ORDER BY license_plate",
            TRUCK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(trucks)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Truck>> {
        let truck = sqlx::query_as::<_, Truck>(&format!(
            "SELECT {} FROM trucks WHERE id = $1",
            TRUCK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(truck)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Truck>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let trucks = sqlx::query_as::<_, Truck>(&format!(
            "SELECT {} FROM trucks WHERE id = ANY($1)",
            TRUCK_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(trucks)
    }

    async fn find_page(&self, filters: &TruckFilters, page: PageRequest) -> AppResult<Page<Truck>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM trucks");
        push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM trucks", TRUCK_COLUMNS));
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let trucks = select.build_query_as::<Truck>().fetch_all(&self.pool).await?;

        Ok(Page::new(trucks, page, total.max(0) as u64))
    }

    async fn license_plate_exists(&self, license_plate: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM trucks WHERE license_plate = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(license_plate)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, truck: Truck) -> AppResult<Truck> {
        let plate = truck.license_plate.clone();
        let created = sqlx::query_as::<_, Truck>(&format!(
            r#"
            INSERT INTO trucks (id, license_plate, model, year, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TRUCK_COLUMNS
        ))
        .bind(truck.id)
        .bind(truck.license_plate)
        .bind(truck.model)
        .bind(truck.year)
        .bind(truck.status)
        .bind(truck.created_at)
        .bind(truck.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || conflict_error("Truck", "license plate", &plate)))?;

        Ok(created)
    }

    async fn update(&self, truck: Truck) -> AppResult<Truck> {
        let plate = truck.license_plate.clone();
        let updated = sqlx::query_as::<_, Truck>(&format!(
            r#"
            UPDATE trucks
            SET license_plate = $2, model = $3, year = $4, status = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            TRUCK_COLUMNS
        ))
        .bind(truck.id)
        .bind(truck.license_plate)
        .bind(truck.model)
        .bind(truck.year)
        .bind(truck.status)
        .bind(truck.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || conflict_error("Truck", "license plate", &plate)))?;

        Ok(updated)
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{contains_pattern, FinancialEntryRepository};
use crate::models::financial_entry::{EntryFilters, FinancialEntry};
use crate::models::pagination::{Page, PageRequest};
use crate::models::truck::non_blank;
use crate::utils::errors::AppResult;

const ENTRY_COLUMNS: &str = "id, truck_id, date, entry_type, category, amount, liters_filled, \
     odometer_reading, description, created_user_id, created_at, updated_at";

pub struct PgFinancialEntryRepository {
    pool: PgPool,
}

impl PgFinancialEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &EntryFilters) {
    builder.push(" WHERE 1 = 1");

    if let Some(truck_id) = filters.truck_id {
        builder.push(" AND truck_id = ").push_bind(truck_id);
    }
    if let Some(entry_type) = filters.entry_type {
        builder.push(" AND entry_type = ").push_bind(entry_type);
    }
    if let Some(category) = non_blank(&filters.category) {
        builder.push(" AND category = ").push_bind(category.to_string());
    }
    if let Some(start) = filters.start_date {
        builder.push(" AND date >= ").push_bind(start);
    }
    if let Some(end) = filters.end_date {
        builder.push(" AND date <= ").push_bind(end);
    }
    if let Some(term) = non_blank(&filters.search) {
        let pattern = contains_pattern(term);
        builder
            .push(" AND (description ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR category ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

#[async_trait]
impl FinancialEntryRepository for PgFinancialEntryRepository {
    async fn find_by_filters(&self, filters: &EntryFilters) -> AppResult<Vec<FinancialEntry>> {
        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM financial_entries", ENTRY_COLUMNS));
        push_filters(&mut select, filters);
        select.push(" ORDER BY date DESC, created_at DESC");

        let entries = select
            .build_query_as::<FinancialEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn find_page(
        &self,
        filters: &EntryFilters,
        page: PageRequest,
    ) -> AppResult<Page<FinancialEntry>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM financial_entries");
        push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM financial_entries", ENTRY_COLUMNS));
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY date DESC, created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let entries = select
            .build_query_as::<FinancialEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(entries, page, total.max(0) as u64))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FinancialEntry>> {
        let entry = sqlx::query_as::<_, FinancialEntry>(&format!(
            "SELECT {} FROM financial_entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn create(&self, entry: FinancialEntry) -> AppResult<FinancialEntry> {
        let created = sqlx::query_as::<_, FinancialEntry>(&format!(
            r#"
            INSERT INTO financial_entries (
                id, truck_id, date, entry_type, category, amount, liters_filled,
                odometer_reading, description, created_user_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id)
        .bind(entry.truck_id)
        .bind(entry.date)
        .bind(entry.entry_type)
        .bind(entry.category)
        .bind(entry.amount)
        .bind(entry.liters_filled)
        .bind(entry.odometer_reading)
        .bind(entry.description)
        .bind(entry.created_user_id)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, entry: FinancialEntry) -> AppResult<FinancialEntry> {
        // created_at y created_user_id no cambian nunca
        let updated = sqlx::query_as::<_, FinancialEntry>(&format!(
            r#"
            UPDATE financial_entries
            SET date = $2, entry_type = $3, category = $4, amount = $5, liters_filled = $6,
                odometer_reading = $7, description = $8, updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id)
        .bind(entry.date)
        .bind(entry.entry_type)
        .bind(entry.category)
        .bind(entry.amount)
        .bind(entry.liters_filled)
        .bind(entry.odometer_reading)
        .bind(entry.description)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}

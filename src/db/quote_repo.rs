// src/db/quote_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{finish_update, push_set, update_statement},
        error::AppError,
    },
    models::{
        comparison::ComparisonQuote,
        quote::{
            CreateQuotePayload, Quote, QuoteLineItemPayload, QuotePosition, QuoteStatus,
            UpdateQuotePayload,
        },
    },
};

// Must match QuoteStatus::COMPARABLE
const COMPARABLE_STATUSES: &str = "('Submitted', 'Evaluated', 'Accepted')";

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  READS
    // =========================================================================

    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Quote>, AppError> {
        let quotes = sqlx::query_as::<_, Quote>(
            "SELECT * FROM quotes WHERE tender_id = $1 ORDER BY created_at DESC",
        )
        .bind(tender_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    pub async fn list_by_lot(&self, lot_id: Uuid) -> Result<Vec<Quote>, AppError> {
        let quotes = sqlx::query_as::<_, Quote>(
            "SELECT * FROM quotes WHERE lot_id = $1 ORDER BY created_at DESC",
        )
        .bind(lot_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(quote)
    }

    pub async fn list_positions(&self, quote_id: Uuid) -> Result<Vec<QuotePosition>, AppError> {
        let positions = sqlx::query_as::<_, QuotePosition>(
            r#"
            SELECT qp.*
            FROM quote_positions qp
            JOIN positions p ON p.id = qp.position_id
            WHERE qp.quote_id = $1
            ORDER BY p.number
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(positions)
    }

    /// Submitted/Evaluated/Accepted quotes of a lot with their supplier, cheapest first.
    pub async fn list_comparable(&self, lot_id: Uuid) -> Result<Vec<ComparisonQuote>, AppError> {
        let sql = format!(
            r#"
            SELECT q.*, s.name AS supplier_name, s.inn AS supplier_inn
            FROM quotes q
            JOIN suppliers s ON s.id = q.supplier_id
            WHERE q.lot_id = $1 AND q.status IN {COMPARABLE_STATUSES}
            ORDER BY q.total_amount ASC NULLS LAST, q.created_at
            "#
        );
        let quotes = sqlx::query_as::<_, ComparisonQuote>(&sql)
            .bind(lot_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(quotes)
    }

    pub async fn list_comparable_line_items(
        &self,
        lot_id: Uuid,
    ) -> Result<Vec<QuotePosition>, AppError> {
        let sql = format!(
            r#"
            SELECT qp.*
            FROM quote_positions qp
            JOIN quotes q ON q.id = qp.quote_id
            WHERE q.lot_id = $1 AND q.status IN {COMPARABLE_STATUSES}
            "#
        );
        let items = sqlx::query_as::<_, QuotePosition>(&sql)
            .bind(lot_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    // =========================================================================
    //  WRITES (transaction-aware)
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateQuotePayload,
        total_amount: Option<Decimal>,
        created_by: Uuid,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (
                tender_id, lot_id, supplier_id, status, valid_until, total_amount,
                delivery_time_days, payment_terms, warranty_period_months, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(payload.tender_id)
        .bind(payload.lot_id)
        .bind(payload.supplier_id)
        .bind(payload.status.unwrap_or(QuoteStatus::Draft))
        .bind(payload.valid_until)
        .bind(total_amount)
        .bind(payload.delivery_time_days)
        .bind(&payload.payment_terms)
        .bind(payload.warranty_period_months)
        .bind(&payload.notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(quote)
    }

    pub async fn add_line_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        line: &QuoteLineItemPayload,
    ) -> Result<QuotePosition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total_price = line.total_price()?;
        let item = sqlx::query_as::<_, QuotePosition>(
            r#"
            INSERT INTO quote_positions (
                quote_id, position_id, unit_price, quantity, total_price, delivery_time_days, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(quote_id)
        .bind(line.position_id)
        .bind(line.unit_price)
        .bind(line.quantity)
        .bind(total_price)
        .bind(line.delivery_time_days)
        .bind(&line.notes)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn delete_line_items<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quote_positions WHERE quote_id = $1")
            .bind(quote_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_total<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        total_amount: Option<Decimal>,
    ) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            "UPDATE quotes SET total_amount = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(quote_id)
        .bind(total_amount)
        .fetch_optional(executor)
        .await?;
        Ok(quote)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateQuotePayload,
    ) -> Result<Option<Quote>, AppError> {
        let mut builder = update_statement("quotes");
        push_set(&mut builder, "status", payload.status);
        push_set(&mut builder, "valid_until", payload.valid_until);
        push_set(&mut builder, "delivery_time_days", payload.delivery_time_days);
        push_set(&mut builder, "payment_terms", payload.payment_terms);
        push_set(&mut builder, "warranty_period_months", payload.warranty_period_months);
        push_set(&mut builder, "notes", payload.notes);
        finish_update(&mut builder, id);

        let quote = builder.build_query_as::<Quote>().fetch_optional(&self.pool).await?;
        Ok(quote)
    }

    pub async fn submit(&self, id: Uuid) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET status = $2, submitted_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(QuoteStatus::Submitted)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

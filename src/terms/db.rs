use anyhow::Result;
use sqlx::{PgPool, Row};

use super::types::TermRow;

/// Re-adding an existing term reactivates it rather than erroring.
pub async fn upsert_term(pool: &PgPool, term: &str) -> Result<(bool, i32)> {
    let row = sqlx::query(
        r#"
        INSERT INTO civic.tracked_term (term)
        VALUES ($1)
        ON CONFLICT (term)
        DO UPDATE SET is_active = TRUE
        RETURNING term_id, (xmax = 0) AS inserted
        "#,
    )
    .bind(term)
    .fetch_one(pool)
    .await?;
    Ok((row.get("inserted"), row.get("term_id")))
}

pub async fn deactivate_term(pool: &PgPool, term: &str) -> Result<bool> {
    let done = sqlx::query(
        "UPDATE civic.tracked_term SET is_active = FALSE WHERE term = $1",
    )
    .bind(term)
    .execute(pool)
    .await?;
    Ok(done.rows_affected() > 0)
}

pub async fn list_terms(pool: &PgPool, active: Option<bool>) -> Result<Vec<TermRow>> {
    let rows = sqlx::query_as::<_, TermRow>(
        r#"
        SELECT term_id, term, is_active, added_at
        FROM civic.tracked_term
        WHERE ($1::bool IS NULL OR is_active = $1)
        ORDER BY term_id
        "#,
    )
    .bind(active)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active watchlist terms, for the ingest-time matcher.
pub async fn active_terms(pool: &PgPool) -> Result<Vec<(i32, String)>> {
    let rows = sqlx::query(
        "SELECT term_id, term FROM civic.tracked_term WHERE is_active ORDER BY term_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| (r.get("term_id"), r.get("term")))
        .collect())
}

pub async fn record_match(
    pool: &PgPool,
    term_id: i32,
    entity_kind: &str,
    entity_id: i64,
) -> Result<bool> {
    let done = sqlx::query(
        r#"
        INSERT INTO civic.term_match (term_id, entity_kind, entity_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (term_id, entity_kind, entity_id) DO NOTHING
        "#,
    )
    .bind(term_id)
    .bind(entity_kind)
    .bind(entity_id)
    .execute(pool)
    .await?;
    Ok(done.rows_affected() > 0)
}

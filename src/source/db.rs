use anyhow::Result;
use sqlx::{PgPool, Row};

use super::types::SourceRow;

pub async fn jurisdiction_id(pool: &PgPool, slug: &str) -> Result<Option<i32>> {
    let id = sqlx::query_scalar::<_, i32>(
        "SELECT jurisdiction_id FROM civic.jurisdiction WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

pub async fn upsert_source(
    pool: &PgPool,
    jurisdiction_id: i32,
    url: &str,
    parser: &str,
    schedule: &str,
    active: bool,
) -> Result<(bool, i32)> {
    let row = sqlx::query(
        r#"
        INSERT INTO civic.source (jurisdiction_id, url, parser, schedule, is_active)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (url)
        DO UPDATE SET jurisdiction_id = EXCLUDED.jurisdiction_id,
                      parser = EXCLUDED.parser,
                      schedule = EXCLUDED.schedule,
                      is_active = EXCLUDED.is_active
        RETURNING source_id, (xmax = 0) AS inserted
        "#,
    )
    .bind(jurisdiction_id)
    .bind(url)
    .bind(parser)
    .bind(schedule)
    .bind(active)
    .fetch_one(pool)
    .await?;
    Ok((row.get("inserted"), row.get("source_id")))
}

pub async fn list_sources(pool: &PgPool, active: Option<bool>) -> Result<Vec<SourceRow>> {
    let rows = sqlx::query_as::<_, SourceRow>(
        r#"
        SELECT s.source_id,
               j.slug AS jurisdiction,
               s.url,
               s.parser,
               s.schedule,
               s.is_active,
               s.last_run_at,
               s.last_status
        FROM civic.source s
        JOIN civic.jurisdiction j USING (jurisdiction_id)
        WHERE ($1::bool IS NULL OR s.is_active = $1)
        ORDER BY s.source_id
        "#,
    )
    .bind(active)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

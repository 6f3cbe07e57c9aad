use anyhow::Result;
use sqlx::PgPool;

/// A source row resolved for this run, with its jurisdiction attached.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceTarget {
    pub source_id: i32,
    pub jurisdiction_id: i32,
    pub jurisdiction: String,
    pub url: String,
    pub parser: String,
}

/// Single parameterized query: explicit id or url wins; with neither,
/// default to the active sources.
pub async fn select_sources(
    pool: &PgPool,
    source: Option<i32>,
    source_url: Option<&str>,
) -> Result<Vec<SourceTarget>> {
    let rows = sqlx::query_as::<_, SourceTarget>(
        r#"
        SELECT s.source_id,
               s.jurisdiction_id,
               j.slug AS jurisdiction,
               s.url,
               s.parser
        FROM civic.source s
        JOIN civic.jurisdiction j USING (jurisdiction_id)
        WHERE
          ($1::INT4 IS NULL OR s.source_id = $1::INT4) AND
          ($2::TEXT IS NULL OR s.url = $2::TEXT) AND
          ($1::INT4 IS NOT NULL OR $2::TEXT IS NOT NULL OR s.is_active = TRUE)
        ORDER BY s.source_id
        "#,
    )
    .bind(source)
    .bind(source_url)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn mark_source_run(
    pool: &PgPool,
    source_id: i32,
    status: &str,
    error: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE civic.source
        SET last_run_at = now(), last_status = $2, last_error = $3
        WHERE source_id = $1
        "#,
    )
    .bind(source_id)
    .bind(status)
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}

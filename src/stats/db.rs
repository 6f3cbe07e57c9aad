use anyhow::Result;
use sqlx::PgPool;

use super::types::*;

pub async fn source_rollup(pool: &PgPool) -> Result<Vec<StatsSourceRow>> {
    let rows = sqlx::query_as::<_, StatsSourceRow>(
        r#"
        SELECT s.source_id,
               j.slug AS jurisdiction,
               s.url,
               s.parser,
               s.last_status,
               s.last_run_at,
               (SELECT count(*) FROM civic.legislation l WHERE l.source_id = s.source_id) AS legislation,
               (SELECT count(*) FROM civic.meeting m WHERE m.source_id = s.source_id) AS meetings,
               (SELECT count(*) FROM civic.election e WHERE e.source_id = s.source_id) AS elections
        FROM civic.source s
        JOIN civic.jurisdiction j USING (jurisdiction_id)
        ORDER BY s.source_id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn legislation_by_status(pool: &PgPool) -> Result<Vec<StatusCount>> {
    let rows = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, count(*) AS cnt
        FROM civic.legislation
        GROUP BY status
        ORDER BY cnt DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn meetings_by_kind(pool: &PgPool) -> Result<Vec<KindCount>> {
    let rows = sqlx::query_as::<_, KindCount>(
        r#"
        SELECT meeting_kind AS kind, count(*) AS cnt
        FROM civic.meeting
        GROUP BY meeting_kind
        ORDER BY cnt DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn term_match_counts(pool: &PgPool) -> Result<Vec<TermMatchCount>> {
    let rows = sqlx::query_as::<_, TermMatchCount>(
        r#"
        SELECT t.term,
               count(m.match_id) AS matches,
               max(m.matched_at) AS last_match
        FROM civic.tracked_term t
        LEFT JOIN civic.term_match m USING (term_id)
        WHERE t.is_active
        GROUP BY t.term
        ORDER BY matches DESC, t.term
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn totals(pool: &PgPool) -> Result<StatsTotals> {
    let row = sqlx::query_as::<_, StatsTotals>(
        r#"
        SELECT (SELECT count(*) FROM civic.legislation) AS legislation,
               (SELECT count(*) FROM civic.meeting) AS meetings,
               (SELECT count(*) FROM civic.meeting WHERE starts_at >= now()) AS upcoming_meetings,
               (SELECT count(*) FROM civic.election) AS elections,
               (SELECT count(*) FROM civic.election WHERE election_date >= CURRENT_DATE) AS upcoming_elections
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

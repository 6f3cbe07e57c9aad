use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CalendarMeeting {
    pub meeting_id: i64,
    pub external_id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub agenda_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CalendarElection {
    pub election_id: i64,
    pub external_id: String,
    pub name: String,
    pub election_date: NaiveDate,
    pub registration_deadline: Option<NaiveDate>,
}

pub async fn meetings_between(
    pool: &PgPool,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<CalendarMeeting>> {
    let rows = sqlx::query_as::<_, CalendarMeeting>(
        r#"
        SELECT meeting_id, external_id, title, starts_at, ends_at, location, agenda_url
        FROM civic.meeting
        WHERE starts_at >= $1 AND starts_at < $2
        ORDER BY starts_at, meeting_id
        "#,
    )
    .bind(since)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn elections_between(
    pool: &PgPool,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<CalendarElection>> {
    let rows = sqlx::query_as::<_, CalendarElection>(
        r#"
        SELECT election_id, external_id, name, election_date, registration_deadline
        FROM civic.election
        WHERE election_date >= $1::date AND election_date < $2::date
        ORDER BY election_date, election_id
        "#,
    )
    .bind(since)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

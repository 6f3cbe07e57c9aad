use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, sqlx::FromRow)]
pub struct StatsSourceRow {
    pub source_id: i32,
    pub jurisdiction: String,
    pub url: String,
    pub parser: String,
    pub last_status: Option<String>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub legislation: i64,
    pub meetings: i64,
    pub elections: i64,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub cnt: i64,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct KindCount {
    pub kind: String,
    pub cnt: i64,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct TermMatchCount {
    pub term: String,
    pub matches: i64,
    pub last_match: Option<DateTime<Utc>>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct StatsTotals {
    pub legislation: i64,
    pub meetings: i64,
    pub upcoming_meetings: i64,
    pub elections: i64,
    pub upcoming_elections: i64,
}

#[derive(Serialize)]
pub struct StatsSummary {
    pub sources: Vec<StatsSourceRow>,
    pub legislation_by_status: Vec<StatusCount>,
    pub meetings_by_kind: Vec<KindCount>,
    pub term_matches: Vec<TermMatchCount>,
    pub totals: StatsTotals,
}

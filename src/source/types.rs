use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct SourceAddPlan {
    pub action: &'static str,
    pub url: String,
    pub parser: String,
    pub jurisdiction: String,
    pub schedule: String,
    pub active: bool,
}

#[derive(Serialize)]
pub struct SourceAddResult {
    pub inserted: bool,
    pub source_id: i32,
    pub url: String,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct SourceRow {
    pub source_id: i32,
    pub jurisdiction: String,
    pub url: String,
    pub parser: String,
    pub schedule: String,
    pub is_active: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_status: Option<String>,
}

#[derive(Serialize)]
pub struct SourceList {
    pub sources: Vec<SourceRow>,
}

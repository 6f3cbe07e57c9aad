use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct TermAddPlan {
    pub action: &'static str,
    pub term: String,
}

#[derive(Serialize)]
pub struct TermAddResult {
    pub inserted: bool,
    pub term: String,
    pub term_id: i32,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct TermRow {
    pub term_id: i32,
    pub term: String,
    pub is_active: bool,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct TermList {
    pub terms: Vec<TermRow>,
}

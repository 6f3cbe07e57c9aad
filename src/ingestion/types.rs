use serde::Serialize;

#[derive(Serialize)]
pub struct SourceSample {
    pub source_id: i32,
    pub url: String,
    pub parser: String,
    pub jurisdiction: String,
}

#[derive(Serialize)]
pub struct IngestPlan {
    pub sources: usize,
    pub limit: usize,
    pub ai: bool,
    pub sample_sources: Vec<SourceSample>,
}

#[derive(Serialize)]
pub struct SourceSummary {
    pub source_id: i32,
    pub status: String,
    pub new: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Serialize)]
pub struct IngestTotals {
    pub new: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub term_matches: usize,
    pub ai_tokens: u64,
    pub degraded: bool,
}

#[derive(Serialize)]
pub struct IngestApply {
    pub totals: IngestTotals,
    pub per_source: Vec<SourceSummary>,
}

use tracing::info_span;
use tracing::Span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Ingest;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Source, FetchPage, Parse, FetchDocument, ExtractText, Summarize, WriteRecord, MatchTerms }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Source => "source",
        Phase::FetchPage => "fetch_page",
        Phase::Parse => "parse",
        Phase::FetchDocument => "fetch_document",
        Phase::ExtractText => "extract_text",
        Phase::Summarize => "summarize",
        Phase::WriteRecord => "write_record",
        Phase::MatchTerms => "match_terms",
    }}
    fn span(&self) -> Span { match self {
        Phase::Source => info_span!("source"),
        Phase::FetchPage => info_span!("fetch_page"),
        Phase::Parse => info_span!("parse"),
        Phase::FetchDocument => info_span!("fetch_document"),
        Phase::ExtractText => info_span!("extract_text"),
        Phase::Summarize => info_span!("summarize"),
        Phase::WriteRecord => info_span!("write_record"),
        Phase::MatchTerms => info_span!("match_terms"),
    }}
}

impl OpMarker for Ingest {
    const NAME: &'static str = "ingest";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("ingest") }
}

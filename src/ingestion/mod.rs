use anyhow::Result;
use clap::Args;
use sqlx::PgPool;

use crate::extract::{agenda, pdf};
use crate::fetch::{FetchConfig, Fetcher};
use crate::parsers::{self, ParserKind};
use crate::schema::{LegislationRecord, MeetingRecord, ParsedRecord};
use crate::store::{self, UpsertOutcome};
use crate::summarize::{self, Summarizer};
use crate::telemetry::ops::ingest::Phase as IngestPhase;
use crate::telemetry::{self};
use crate::terms::matcher::TermMatcher;
use crate::terms::{db as terms_db};

pub mod db;
pub mod stats;
pub mod types;

use db::SourceTarget;
use stats::RunStats;

#[derive(Args)]
pub struct IngestCmd {
    #[arg(long)] pub source: Option<i32>,
    #[arg(long)] pub source_url: Option<String>,
    /// Max records per source
    #[arg(long, default_value_t = 200)] pub limit: usize,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
    /// Skip AI summaries/tags for this run even if CIVIC_AI=1
    #[arg(long, default_value_t = false)] pub no_ai: bool,
}

pub async fn run(pool: &PgPool, args: IngestCmd) -> Result<()> {
    let log = telemetry::ingest();
    let run_id = uuid::Uuid::new_v4().to_string();
    let _g = log.root_span_kv([
        ("run_id", run_id),
        ("apply", args.apply.to_string()),
        ("limit", (args.limit as i64).to_string()),
        ("no_ai", args.no_ai.to_string()),
        ("source", format!("{:?}", args.source)),
        ("source_url", format!("{:?}", args.source_url)),
    ]).entered();

    // resolve sources to process
    let sources = db::select_sources(pool, args.source, args.source_url.as_deref()).await?;

    let summarizer = if args.no_ai { Summarizer::disabled() } else { Summarizer::from_env() };

    if !args.apply {
        if telemetry::config::json_mode() {
            use types::{IngestPlan, SourceSample};
            let samples: Vec<SourceSample> = sources.iter().take(args.plan_limit)
                .map(|s| SourceSample {
                    source_id: s.source_id,
                    url: s.url.clone(),
                    parser: s.parser.clone(),
                    jurisdiction: s.jurisdiction.clone(),
                })
                .collect();
            let plan = IngestPlan {
                sources: sources.len(),
                limit: args.limit,
                ai: summarizer.enabled(),
                sample_sources: samples,
            };
            log.plan(&plan)?;
        } else {
            log.info(format!(
                "📝 Ingest plan — sources={} limit={} ai={}",
                sources.len(), args.limit, summarizer.enabled()
            ));
            for s in sources.iter().take(args.plan_limit) {
                log.info(format!(
                    "  source_id={} url={} parser={} jurisdiction={}",
                    s.source_id, s.url, s.parser, s.jurisdiction
                ));
            }
            if sources.len() > args.plan_limit {
                log.info(format!("  ... ({} more)", sources.len() - args.plan_limit));
            }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let fetcher = Fetcher::new(FetchConfig::default())?;
    let matcher = TermMatcher::compile(&terms_db::active_terms(pool).await?);

    let mut totals = RunStats::new();
    let mut per_source: Vec<types::SourceSummary> = Vec::new();

    for src in sources {
        let _src_span = log.span_kv(&IngestPhase::Source, [
            ("source_id", src.source_id.to_string()),
            ("url", src.url.clone()),
        ]).entered();

        let stats = ingest_source(pool, &fetcher, &summarizer, &matcher, &log, &src, args.limit).await;
        db::mark_source_run(pool, src.source_id, stats.status(), stats.error_report().as_deref()).await?;

        log.source_summary(src.source_id, stats.status(), stats.new, stats.updated, stats.skipped, stats.errors);
        per_source.push(types::SourceSummary {
            source_id: src.source_id,
            status: stats.status().to_string(),
            new: stats.new,
            updated: stats.updated,
            skipped: stats.skipped,
            errors: stats.errors,
        });
        totals.absorb(&stats);
    }

    log.totals(totals.new, totals.updated, totals.skipped, totals.errors);

    if telemetry::config::json_mode() {
        use types::{IngestApply, IngestTotals};
        let result = IngestApply {
            totals: IngestTotals {
                new: totals.new,
                updated: totals.updated,
                skipped: totals.skipped,
                errors: totals.errors,
                term_matches: totals.term_matches,
                ai_tokens: totals.ai_tokens,
                degraded: totals.degraded,
            },
            per_source,
        };
        log.result(&result)?;
    }
    Ok(())
}

/// Process one source end to end. Record-level failures are counted, never
/// propagated, so one broken row cannot sink the run.
async fn ingest_source(
    pool: &PgPool,
    fetcher: &Fetcher,
    summarizer: &Summarizer,
    matcher: &TermMatcher,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    src: &SourceTarget,
    limit: usize,
) -> RunStats {
    let mut stats = RunStats::new();

    let kind: ParserKind = match src.parser.parse() {
        Ok(k) => k,
        Err(e) => {
            stats.record_error(format!("source {}: {}", src.source_id, e));
            return stats;
        }
    };

    let records = {
        let html = {
            let _s = log.span_kv(&IngestPhase::FetchPage, [("url", src.url.clone())]).entered();
            fetcher.get_text(&src.url).await
        };
        match html {
            Ok(html) => {
                let _s = log.span(&IngestPhase::Parse).entered();
                let parsed = parsers::run(kind, &html);
                if parsed.is_empty() {
                    // Page structure drifted out from under the selectors;
                    // fall back to sample records and flag the run.
                    log.warn_kv("no records parsed, using fixture fallback", [
                        ("source_id", src.source_id.to_string()),
                    ]);
                    stats.degraded = true;
                    parsers::fixture(kind)
                } else {
                    parsed
                }
            }
            Err(e) => {
                log.warn_kv("page fetch failed, using fixture fallback", [
                    ("source_id", src.source_id.to_string()),
                    ("error", e.to_string()),
                ]);
                stats.record_error(format!("fetch {}: {}", src.url, e));
                stats.degraded = true;
                parsers::fixture(kind)
            }
        }
    };

    for rec in records.into_iter().take(limit) {
        if let Err(e) = ingest_record(pool, fetcher, summarizer, matcher, log, src, rec, &mut stats).await {
            log.warn_kv("record failed", [
                ("source_id", src.source_id.to_string()),
                ("error", e.to_string()),
            ]);
            stats.record_error(e.to_string());
        }
    }

    stats
}

#[allow(clippy::too_many_arguments)]
async fn ingest_record(
    pool: &PgPool,
    fetcher: &Fetcher,
    summarizer: &Summarizer,
    matcher: &TermMatcher,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    src: &SourceTarget,
    rec: ParsedRecord,
    stats: &mut RunStats,
) -> Result<()> {
    match rec {
        ParsedRecord::Meeting(mut m) => {
            if let Some(agenda_url) = m.agenda_url.clone() {
                if let Some(text) = fetch_document_text(fetcher, log, &agenda_url, stats).await {
                    enrich_meeting(summarizer, log, &mut m, &text, stats).await;
                    m.extracted_text = Some(text);
                }
            }

            let outcome = {
                let _s = log.span_kv(&IngestPhase::WriteRecord, [("external_id", m.external_id.clone())]).entered();
                store::upsert_meeting(pool, src.source_id, src.jurisdiction_id, &m).await?
            };
            count_outcome(log, &outcome, &m.external_id, &m.title, stats);

            if let Some(id) = outcome.id() {
                let haystack = match &m.extracted_text {
                    Some(text) => format!("{}\n{}", m.title, text),
                    None => m.title.clone(),
                };
                match_terms(pool, matcher, log, "meeting", id, &haystack, stats).await?;

                if m.is_legislative {
                    if let Some(text) = &m.extracted_text {
                        ingest_agenda_items(pool, log, src, &m, text, stats).await?;
                    }
                }
            }
        }
        ParsedRecord::Legislation(mut l) => {
            if let Some(pdf_url) = l.pdf_url.clone() {
                if let Some(text) = fetch_document_text(fetcher, log, &pdf_url, stats).await {
                    enrich_legislation(summarizer, log, &mut l, &text, stats).await;
                    l.full_text = Some(text);
                }
            }
            if l.tags.is_empty() {
                l.tags = summarize::keywords::extract_tags(&l.title);
            }

            let outcome = {
                let _s = log.span_kv(&IngestPhase::WriteRecord, [("external_id", l.external_id.clone())]).entered();
                store::upsert_legislation(pool, src.source_id, src.jurisdiction_id, &l).await?
            };
            count_outcome(log, &outcome, &l.external_id, &l.title, stats);

            if let Some(id) = outcome.id() {
                let haystack = match &l.full_text {
                    Some(text) => format!("{}\n{}", l.title, text),
                    None => l.title.clone(),
                };
                match_terms(pool, matcher, log, "legislation", id, &haystack, stats).await?;
            }
        }
        ParsedRecord::Election(e) => {
            let outcome = {
                let _s = log.span_kv(&IngestPhase::WriteRecord, [("external_id", e.external_id.clone())]).entered();
                store::upsert_election(pool, src.source_id, src.jurisdiction_id, &e).await?
            };
            count_outcome(log, &outcome, &e.external_id, &e.name, stats);
        }
    }
    Ok(())
}

/// Download a linked document and pull plaintext out of it. Every failure
/// path degrades to None; a meeting without its agenda text is still worth
/// storing.
async fn fetch_document_text(
    fetcher: &Fetcher,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    url: &str,
    stats: &mut RunStats,
) -> Option<String> {
    let bytes = {
        let _s = log.span_kv(&IngestPhase::FetchDocument, [("url", url.to_string())]).entered();
        match fetcher.get_document(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log.warn_kv("document fetch failed", [
                    ("url", url.to_string()),
                    ("error", e.to_string()),
                ]);
                stats.degraded = true;
                return None;
            }
        }
    };

    let _s = log.span_kv(&IngestPhase::ExtractText, [("bytes", bytes.len().to_string())]).entered();
    let text = pdf::extract_text(&bytes);
    if text.is_none() {
        stats.degraded = true;
    }
    text
}

async fn enrich_meeting(
    summarizer: &Summarizer,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    m: &mut MeetingRecord,
    text: &str,
    stats: &mut RunStats,
) {
    if !summarizer.enabled() || m.ai_summary.is_some() {
        return;
    }
    let _s = log.span_kv(&IngestPhase::Summarize, [("external_id", m.external_id.clone())]).entered();
    if let Some(summary) = summarizer.summarize(text).await {
        stats.ai_tokens += u64::from(summary.total_tokens);
        m.ai_summary = Some(summary.text);
    }
}

async fn enrich_legislation(
    summarizer: &Summarizer,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    l: &mut LegislationRecord,
    text: &str,
    stats: &mut RunStats,
) {
    if !summarizer.enabled() {
        return;
    }
    let _s = log.span_kv(&IngestPhase::Summarize, [("external_id", l.external_id.clone())]).entered();
    if l.ai_summary.is_none() {
        if let Some(summary) = summarizer.summarize(text).await {
            stats.ai_tokens += u64::from(summary.total_tokens);
            l.ai_summary = Some(summary.text);
        }
    }
    if l.tags.is_empty() {
        l.tags = summarizer.tag(text).await;
    }
}

/// Legislation references recovered from a legislative body's agenda text
/// become their own rows, keyed off the meeting's external id so repeat
/// runs land on the same rows.
async fn ingest_agenda_items(
    pool: &PgPool,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    src: &SourceTarget,
    m: &MeetingRecord,
    text: &str,
    stats: &mut RunStats,
) -> Result<()> {
    for item in agenda::extract_legislation(text) {
        let tags = summarize::keywords::extract_tags(&item.title);
        let rec = LegislationRecord {
            external_id: format!("{}-{}", item.kind.as_str(), item.number),
            kind: item.kind,
            title: item.title,
            status: item.status,
            introduced_at: Some(m.starts_at.date_naive()),
            passed_at: None,
            effective_at: None,
            document_url: m.agenda_url.clone(),
            pdf_url: None,
            full_text: None,
            ai_summary: None,
            tags,
        };

        let outcome = {
            let _s = log.span_kv(&IngestPhase::WriteRecord, [("external_id", rec.external_id.clone())]).entered();
            store::upsert_legislation(pool, src.source_id, src.jurisdiction_id, &rec).await?
        };
        count_outcome(log, &outcome, &rec.external_id, &rec.title, stats);
    }
    Ok(())
}

async fn match_terms(
    pool: &PgPool,
    matcher: &TermMatcher,
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    entity_kind: &str,
    entity_id: i64,
    text: &str,
    stats: &mut RunStats,
) -> Result<()> {
    if matcher.is_empty() {
        return Ok(());
    }
    let _s = log.span_kv(&IngestPhase::MatchTerms, [("entity_id", entity_id.to_string())]).entered();
    for term_id in matcher.matches(text) {
        if terms_db::record_match(pool, term_id, entity_kind, entity_id).await? {
            stats.term_matches += 1;
            log.info_kv("🔔 term match", [
                ("term", matcher.term_for(term_id).unwrap_or("?").to_string()),
                ("entity", format!("{entity_kind}/{entity_id}")),
            ]);
        }
    }
    Ok(())
}

fn count_outcome(
    log: &telemetry::ctx::LogCtx<telemetry::ops::ingest::Ingest>,
    outcome: &UpsertOutcome,
    external_id: &str,
    title: &str,
    stats: &mut RunStats,
) {
    match outcome {
        UpsertOutcome::Inserted(_) => {
            stats.new += 1;
            log.info_kv("➕ insert", [
                ("external_id", external_id.to_string()),
                ("title", title.to_string()),
            ]);
        }
        UpsertOutcome::Updated(_) => {
            stats.updated += 1;
            log.info_kv("♻️ update", [
                ("external_id", external_id.to_string()),
                ("title", title.to_string()),
            ]);
        }
        UpsertOutcome::Unchanged => {
            stats.skipped += 1;
            log.info_kv("↩️ skip", [("external_id", external_id.to_string())]);
        }
    }
}

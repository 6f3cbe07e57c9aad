use anyhow::Result;
use sqlx::PgPool;

use crate::stats::db;
use crate::stats::types::*;
use crate::telemetry::ops::stats::Phase as StatsPhase;
use crate::telemetry::{self};

pub async fn summary(pool: &PgPool) -> Result<()> {
    let log = telemetry::stats();
    let _s = log.span(&StatsPhase::Collect).entered();

    let sources = db::source_rollup(pool).await?;
    log.info("🏛️ Sources:");
    for s in &sources {
        log.info(format!(
            "  #{}  {}  parser={}  last_status={}  legislation={} meetings={} elections={}",
            s.source_id,
            s.jurisdiction,
            s.parser,
            s.last_status.as_deref().unwrap_or("-"),
            s.legislation,
            s.meetings,
            s.elections
        ));
    }

    let legislation_by_status = db::legislation_by_status(pool).await?;
    log.info("📜 Legislation by status:");
    for r in &legislation_by_status {
        log.info(format!("  {:12} {}", r.status, r.cnt));
    }

    let meetings_by_kind = db::meetings_by_kind(pool).await?;
    log.info("🪑 Meetings by kind:");
    for r in &meetings_by_kind {
        log.info(format!("  {:12} {}", r.kind, r.cnt));
    }

    let term_matches = db::term_match_counts(pool).await?;
    if !term_matches.is_empty() {
        log.info("🔔 Tracked terms:");
        for t in &term_matches {
            log.info(format!(
                "  {:24} matches={} last={:?}",
                t.term, t.matches, t.last_match
            ));
        }
    }

    let totals = db::totals(pool).await?;
    log.info(format!(
        "📊 Totals — legislation={} meetings={} (upcoming={}) elections={} (upcoming={})",
        totals.legislation,
        totals.meetings,
        totals.upcoming_meetings,
        totals.elections,
        totals.upcoming_elections
    ));

    if telemetry::config::json_mode() {
        let result = StatsSummary {
            sources,
            legislation_by_status,
            meetings_by_kind,
            term_matches,
            totals,
        };
        log.result(&result)?;
    }

    Ok(())
}

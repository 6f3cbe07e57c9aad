use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sqlx::PgPool;

use crate::telemetry::ops::terms::Phase as TermsPhase;
use crate::telemetry::{self};

pub mod db;
pub mod matcher;
pub mod types;

/// civic terms add/rm/ls — the tracked-term watchlist
#[derive(Args)]
pub struct TermsCmd {
    #[command(subcommand)]
    pub cmd: TermsSub,
}

#[derive(Subcommand)]
pub enum TermsSub {
    // track a term (plan-only by default; use --apply to write)
    Add {
        term: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    // stop tracking a term (keeps its match history)
    Rm {
        term: String,
    },
    // list tracked terms
    Ls {
        /// Filter by active status: true/false. Omit to show all.
        #[arg(long)]
        active: Option<bool>,
    },
}

pub async fn run(pool: &PgPool, args: TermsCmd) -> Result<()> {
    let log = telemetry::terms();
    let _g = log.root_span().entered();
    match args.cmd {
        TermsSub::Add { term, apply } => add_term(pool, term, apply).await?,
        TermsSub::Rm { term } => rm_term(pool, term).await?,
        TermsSub::Ls { active } => ls_terms(pool, active).await?,
    }
    Ok(())
}

async fn add_term(pool: &PgPool, term: String, apply: bool) -> Result<()> {
    let log = telemetry::terms();
    let _g = log
        .root_span_kv([
            ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
            ("term", term.clone()),
        ])
        .entered();

    let term = term.trim().to_string();
    if term.is_empty() || term.chars().count() > 80 {
        bail!("term must be 1-80 characters: {:?}", term);
    }

    if !apply {
        let _s = log.span(&TermsPhase::Plan).entered();
        log.info(format!("📝 Terms plan — track {:?}", term));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = types::TermAddPlan { action: "add", term };
            log.plan(&plan)?;
        }
        return Ok(());
    }

    let _s = log.span(&TermsPhase::Add).entered();
    let (inserted, term_id) = db::upsert_term(pool, &term).await?;
    if inserted {
        log.info(format!("➕ Tracking {:?}", term));
    } else {
        log.info(format!("♻️ Already tracked, reactivated {:?}", term));
    }
    if telemetry::config::json_mode() {
        let result = types::TermAddResult { inserted, term, term_id };
        log.result(&result)?;
    }
    Ok(())
}

async fn rm_term(pool: &PgPool, term: String) -> Result<()> {
    let log = telemetry::terms();
    let _g = log.root_span_kv([("term", term.clone())]).entered();
    let _s = log.span(&TermsPhase::Remove).entered();

    let removed = db::deactivate_term(pool, &term).await?;
    if removed {
        log.info(format!("➖ No longer tracking {:?}", term));
    } else {
        log.warn(format!("Term not found: {:?}", term));
    }
    if telemetry::config::json_mode() {
        log.result(&serde_json::json!({ "removed": removed, "term": term }))?;
    }
    Ok(())
}

async fn ls_terms(pool: &PgPool, active: Option<bool>) -> Result<()> {
    let log = telemetry::terms();
    let _g = log.root_span_kv([("active", format!("{:?}", active))]).entered();
    let _s = log.span(&TermsPhase::List).entered();

    let terms = db::list_terms(pool, active).await?;
    log.info("🔍 Tracked terms:");
    for row in &terms {
        log.info(format!(
            "[{}] {:?} active={} added_at={:?}",
            row.term_id, row.term, row.is_active, row.added_at
        ));
    }
    if telemetry::config::json_mode() {
        let list = types::TermList { terms };
        log.result(&list)?;
    }
    Ok(())
}

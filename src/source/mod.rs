use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sqlx::PgPool;
use url::Url;

use crate::parsers::ParserKind;
use crate::telemetry::ops::source::Phase as SourcePhase;
use crate::telemetry::{self};

pub mod db;
pub mod types;

/// civic source add/ls — registered scrape targets
#[derive(Args)]
pub struct SourceCmd {
    #[command(subcommand)]
    pub cmd: SourceSub,
}

#[derive(Subcommand)]
pub enum SourceSub {
    // register a source page (plan-only by default; use --apply to write)
    Add {
        url: String,
        /// Parser key: austin, legistar, texas-lege, travis-elections
        #[arg(long)]
        parser: String,
        /// Jurisdiction slug, e.g. austin, travis-county, texas
        #[arg(long)]
        jurisdiction: String,
        #[arg(long, default_value = "daily")]
        schedule: String,
        #[arg(long, default_value_t = true)]
        active: bool,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    // list sources
    Ls {
        /// Filter by active status: true/false. Omit to show all.
        #[arg(long)]
        active: Option<bool>,
    },
}

pub async fn run(pool: &PgPool, args: SourceCmd) -> Result<()> {
    let log = telemetry::source();
    let _g = log.root_span().entered();
    match args.cmd {
        SourceSub::Add { url, parser, jurisdiction, schedule, active, apply } => {
            add_source(pool, url, parser, jurisdiction, schedule, active, apply).await?
        }
        SourceSub::Ls { active } => ls_sources(pool, active).await?,
    }
    Ok(())
}

async fn add_source(
    pool: &PgPool,
    url: String,
    parser: String,
    jurisdiction: String,
    schedule: String,
    active: bool,
    apply: bool,
) -> Result<()> {
    let log = telemetry::source();
    let _g = log
        .root_span_kv([
            ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
            ("url", url.clone()),
            ("parser", parser.clone()),
            ("jurisdiction", jurisdiction.clone()),
        ])
        .entered();

    // Validate before any DB I/O so mistakes fail fast with a clear message.
    if Url::parse(&url).is_err() {
        bail!("Invalid URL: {}", url);
    }
    let parser_kind: ParserKind = parser.parse()?;
    if !matches!(schedule.as_str(), "hourly" | "daily" | "weekly") {
        bail!("schedule must be hourly, daily, or weekly: {}", schedule);
    }

    if !apply {
        let _s = log.span(&SourcePhase::Plan).entered();
        log.info(format!(
            "📝 Source plan — add url={} parser={} jurisdiction={} schedule={} active={}",
            url, parser_kind, jurisdiction, schedule, active
        ));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = types::SourceAddPlan {
                action: "add",
                url,
                parser: parser_kind.to_string(),
                jurisdiction,
                schedule,
                active,
            };
            log.plan(&plan)?;
        }
        return Ok(());
    }

    let _s = log.span(&SourcePhase::Add).entered();
    let Some(jid) = db::jurisdiction_id(pool, &jurisdiction).await? else {
        bail!("unknown jurisdiction slug: {} (run `civic init` to seed the tree)", jurisdiction);
    };
    let (inserted, source_id) =
        db::upsert_source(pool, jid, &url, parser_kind.as_str(), &schedule, active).await?;
    if inserted {
        log.info(format!("➕ Source {} added", source_id));
    } else {
        log.info(format!("♻️ Source {} updated", source_id));
    }
    if telemetry::config::json_mode() {
        let result = types::SourceAddResult { inserted, source_id, url };
        log.result(&result)?;
    }
    Ok(())
}

async fn ls_sources(pool: &PgPool, active: Option<bool>) -> Result<()> {
    let log = telemetry::source();
    let _g = log.root_span_kv([("active", format!("{:?}", active))]).entered();
    let _s = log.span(&SourcePhase::List).entered();

    let sources = db::list_sources(pool, active).await?;
    log.info("🏛️ Sources:");
    for row in &sources {
        log.info(format!(
            "[{}] {} parser={} jurisdiction={} active={} last_status={:?}",
            row.source_id, row.url, row.parser, row.jurisdiction, row.is_active, row.last_status
        ));
    }
    if telemetry::config::json_mode() {
        let list = types::SourceList { sources };
        log.result(&list)?;
    }
    Ok(())
}

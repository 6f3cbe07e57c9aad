use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;

use crate::telemetry::ops::calendar::Phase as CalendarPhase;
use crate::telemetry::{self};
use crate::util::time::{parse_since_str, parse_until_str};

pub mod db;
pub mod ics;

/// civic calendar — export upcoming meetings/elections as an .ics feed
#[derive(Args)]
pub struct CalendarCmd {
    /// Window start: 7d, 2025-02-06, or RFC 3339 (default: now)
    #[arg(long)]
    pub since: Option<String>,
    /// Window end: 30d, 2025-03-06, or RFC 3339 (default: 90d)
    #[arg(long)]
    pub until: Option<String>,
    /// Write the calendar here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Serialize)]
struct CalendarResult {
    meetings: usize,
    elections: usize,
    out: Option<String>,
}

pub async fn run(pool: &PgPool, args: CalendarCmd) -> Result<()> {
    let log = telemetry::calendar();
    let now = Utc::now();
    let since = match &args.since {
        Some(s) => parse_since_str(s, now)?,
        None => now,
    };
    let until = match &args.until {
        Some(s) => parse_until_str(s, now)?,
        None => parse_until_str("90d", now)?,
    };
    let _g = log
        .root_span_kv([
            ("since", since.to_rfc3339()),
            ("until", until.to_rfc3339()),
            ("out", format!("{:?}", args.out)),
        ])
        .entered();

    let (meetings, elections) = {
        let _s = log.span(&CalendarPhase::Select).entered();
        (
            db::meetings_between(pool, since, until).await?,
            db::elections_between(pool, since, until).await?,
        )
    };

    let body = {
        let _s = log.span(&CalendarPhase::Render).entered();
        ics::render(&meetings, &elections, now)
    };

    log.info(format!(
        "📅 Calendar — {} meetings, {} elections",
        meetings.len(),
        elections.len()
    ));

    match &args.out {
        Some(path) => {
            std::fs::write(path, &body)
                .with_context(|| format!("writing calendar to {}", path.display()))?;
            log.info(format!("   Wrote {}", path.display()));
        }
        None if !telemetry::config::json_mode() => {
            // Calendar body is the stdout payload in text mode.
            print!("{body}");
        }
        None => {}
    }

    if telemetry::config::json_mode() {
        let result = CalendarResult {
            meetings: meetings.len(),
            elections: elections.len(),
            out: args.out.map(|p| p.display().to_string()),
        };
        log.result(&result)?;
    }
    Ok(())
}

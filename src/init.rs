use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;

use crate::telemetry::ops::init::Phase as InitPhase;
use crate::telemetry::{self};

/// civic init — apply pending migrations (idempotent)
#[derive(Args)]
pub struct InitCmd {}

#[derive(Serialize)]
struct InitResult {
    migrated: bool,
}

pub async fn run(pool: &PgPool, _args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span().entered();

    {
        let _s = log.span(&InitPhase::Migrate).entered();
        sqlx::migrate!().run(pool).await?;
    }

    log.info("🗄️ Database initialized (schema + seed jurisdictions)");
    if telemetry::config::json_mode() {
        log.result(&InitResult { migrated: true })?;
    }
    Ok(())
}

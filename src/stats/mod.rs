use anyhow::Result;
use clap::Args;
use sqlx::PgPool;

pub mod db;
pub mod summary;
pub mod types;

#[derive(Args, Debug)]
pub struct StatsCmd {}

pub async fn run(pool: &PgPool, _args: StatsCmd) -> Result<()> {
    let log = crate::telemetry::stats();
    let _g = log.root_span().entered();
    summary::summary(pool).await
}

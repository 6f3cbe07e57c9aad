use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;

mod calendar;
mod extract;
mod fetch;
mod ingestion;
mod init;
mod llm;
mod parsers;
mod schema;
mod source;
mod stats;
mod store;
mod summarize;
mod telemetry;
mod terms;
mod util;

#[derive(Parser)]
#[command(name = "civic", about = "Civic ingestion pipeline CLI")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init(init::InitCmd),
    Source(source::SourceCmd),
    Ingest(ingestion::IngestCmd),
    Terms(terms::TermsCmd),
    Stats(stats::StatsCmd),
    Calendar(calendar::CalendarCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and CIVIC_LOG_FORMAT
    telemetry::config::init_tracing();

    let dsn = cli
        .dsn
        .or_else(|| env::var("DATABASE_URL").ok())
        .expect("Please provide --dsn or set DATABASE_URL in .env");

    let pool = PgPool::connect(&dsn).await?;

    match cli.command {
        Commands::Init(args) => init::run(&pool, args).await?,
        Commands::Source(args) => source::run(&pool, args).await?,
        Commands::Ingest(args) => ingestion::run(&pool, args).await?,
        Commands::Terms(args) => terms::run(&pool, args).await?,
        Commands::Stats(args) => stats::run(&pool, args).await?,
        Commands::Calendar(args) => calendar::run(&pool, args).await?,
    }

    Ok(())
}

mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vocab_review::{Clock, ManualClock, ReviewConfig, ReviewService, SqliteStore, SystemClock};

use app::App;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReviewConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ReviewConfig::default(),
    };
    if let Some(db) = cli.db.clone() {
        config.database_path = db;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    debug!("vocab-review v{} starting", env!("CARGO_PKG_VERSION"));

    let store = SqliteStore::open(&config.database_path).with_context(|| {
        format!("opening database {}", config.database_path.display())
    })?;
    let clock: Arc<dyn Clock> = match cli.now {
        Some(at) => Arc::new(ManualClock::new(at)),
        None => Arc::new(SystemClock),
    };

    let app = App::new(
        ReviewService::with_clock(store, config, clock),
        cli.user,
        cli.json,
    );
    app.run(cli.command, io::stdin().lock(), &mut io::stdout().lock())
}

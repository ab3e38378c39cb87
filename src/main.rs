use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use tracing::{error, info};

use news_digest::config::DEFAULT_CONFIG_PATH;
use news_digest::{run_digest, Config, Delivery, FeedFetcher, Result, RunSummary};

fn main() -> ExitCode {
    let path = std::env::args().nth(1);

    // Load configuration; an explicit path must exist
    let config = match Config::load_with_env(path.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            let shown = path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
            eprintln!("Failed to load {shown}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = news_digest::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        news_digest::logging::init_console_only(&config.logging.level);
    }

    // Credentials are checked before any network activity
    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&config)) {
        Ok(summary) => {
            info!(
                "Digest complete: {} item(s) in {} chunk(s)",
                summary.total_items(),
                summary.chunks_sent
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Digest failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<RunSummary> {
    let fetcher = FeedFetcher::new(&config.fetch)?;
    let delivery = Delivery::from_config(&config.telegram)?;
    if delivery.is_dry_run() {
        info!("Dry run: messages will be logged, not posted");
    }

    run_digest(config, &fetcher, &delivery, Utc::now().date_naive()).await
}

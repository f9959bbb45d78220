mod cycle;
mod logging;

use anyhow::Context;
use clap::Parser;
use rentnotice_core::NotificationConfig;
use rentnotice_notify::Notifier;
use rentnotice_store::RecordStore;

/// Email a renter the rent accrued since their last notice.
#[derive(Parser, Debug)]
#[command(name = "rentnotice", version)]
struct Cli {
    /// Renter to bill; their record is `<EMAIL>.json` in the working directory.
    #[arg(short, long)]
    email: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init(&logging::log_path());
    tracing::info!("rentnotice v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let result = run(&cli).await;
    if let Err(e) = &result {
        tracing::error!(renter = %cli.email, error = %format!("{e:#}"), "run failed");
    }
    result
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = NotificationConfig::from_env().context("reading notification config")?;
    tracing::info!(%config, "loaded config");

    let store = RecordStore::current_dir();
    let notifier = Notifier::smtp(&config)?;
    let now = chrono::Utc::now().timestamp();

    cycle::run_cycle(&store, &notifier, &config, &cli.email, now).await?;
    tracing::info!("done");
    Ok(())
}

//! `drip-bot` — process entry point.
//!
//! Wires the pieces together: config, token, catalog, durable state,
//! scheduler engine, Telegram dispatcher. Startup is strict — a missing
//! or corrupt state document aborts before anything is served.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use teloxide::Bot;
use tracing::info;

use drip_core::clock;
use drip_core::config::{read_token, DripConfig};
use drip_scheduler::{RandomPicker, SchedulerEngine};
use drip_store::{Catalog, ScheduleState};
use drip_telegram::{RegistrationContext, TelegramTransport};

#[derive(Debug, Parser)]
#[command(name = "drip-bot", about = "Per-recipient drip-content delivery bot")]
struct Cli {
    /// Path to drip.toml (defaults to ./drip.toml; DRIP_* env still applies).
    #[arg(short, long)]
    config: Option<String>,

    /// Append logs to this file instead of stderr.
    #[arg(short = 'l', long)]
    log_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_path.as_deref())?;

    let config = DripConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let zone = config.zone().context("resolving timestamp offset")?;
    let token = read_token(&config.token_path).context("reading bot token")?;

    let catalog = Catalog::load(&config.catalog_path).context("loading content catalog")?;
    let state =
        ScheduleState::load(&config.state_dir, zone).context("loading schedule state")?;
    info!(
        recipients = state.len(),
        items = catalog.len(),
        "state loaded"
    );

    let first_contact = config
        .first_contact(zone)
        .context("parsing first_contact_at")?
        .unwrap_or_else(|| clock::min_time(zone));

    let state = Arc::new(tokio::sync::Mutex::new(state));
    let catalog = Arc::new(catalog);
    let bot = Bot::new(token);

    let transport = Arc::new(TelegramTransport::new(
        bot.clone(),
        Duration::from_secs(config.send_timeout_secs),
    ));
    let engine = SchedulerEngine::new(
        &config,
        zone,
        Arc::clone(&state),
        Arc::clone(&catalog),
        transport,
        Box::new(RandomPicker),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(engine.run(shutdown_rx));

    let ctx = Arc::new(RegistrationContext {
        state,
        greeting: config.greeting.clone(),
        first_contact,
    });
    drip_telegram::run_dispatcher(bot, ctx).await;

    // dispatcher only returns on shutdown; stop the engine too
    let _ = shutdown_tx.send(true);
    Ok(())
}

fn init_tracing(log_path: Option<&str>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            "drip_bot=info,drip_scheduler=info,drip_store=info,drip_telegram=info".into()
        });

    match log_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

mod compare;
mod config;
mod farm;
mod report;
mod snapshot;
mod store;

use clap::{Parser, ValueEnum};
use config::Config;
use farm::FarmClient;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use store::SnapshotStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "farm-status")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "./config.yaml")]
    config: String,
    #[arg(long)]
    server: Option<String>,
    #[arg(long)]
    state_file: Option<String>,
    #[arg(long, value_enum, default_value = "html")]
    format: Format,
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let mut cfg = match Config::load_from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(2);
        }
    };
    if let Some(server) = cli.server {
        cfg.server = server;
    }
    if let Some(state_file) = cli.state_file {
        cfg.state_file = state_file;
    }
    if let Err(err) = cfg.validate() {
        error!(error = %err, "invalid configuration");
        std::process::exit(2);
    }

    let token = match cfg.resolve_token() {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "failed to resolve scheduler token");
            std::process::exit(2);
        }
    };

    info!(server = %cfg.server, state_file = %cfg.state_file, "taking farm snapshot");

    let http = Client::builder()
        .user_agent("farm-status/0.1.0")
        .build()
        .unwrap_or_else(|_| Client::new());
    let client = FarmClient::new(
        http,
        cfg.server.clone(),
        token,
        Duration::from_millis(cfg.request_timeout_ms),
    );

    // Independent round trips; queue depths may degrade while inventory is
    // still required.
    let (inventory, queue_depths) =
        tokio::join!(client.fetch_inventory(), client.fetch_queue_depths());

    let inventory = match inventory {
        Ok(inventory) => inventory,
        Err(err) => {
            error!(error = %err, "failed to fetch farm inventory, no snapshot taken");
            std::process::exit(1);
        }
    };
    let queue_depths: HashMap<String, u64> = queue_depths.unwrap_or_default();

    let current = snapshot::build(&inventory, &queue_depths, now_unix());
    info!(device_types = current.entries.len(), "snapshot built");

    let store = SnapshotStore::new(&cfg.state_file);
    let previous = store.load_previous();
    if previous.is_none() {
        warn!("no previous snapshot, trends start from this run");
    }
    let comparison = compare::compare(&current, previous.as_ref());

    let rendered = match cli.format {
        Format::Html => report::render_html(&current, &comparison),
        Format::Text => report::render_text(&current, &comparison),
    };
    print!("{rendered}");

    // The report is already out; a failed write only costs the next run its
    // baseline, but it must not pass silently.
    if let Err(err) = store.save(&current) {
        error!(error = %err, "failed to persist snapshot, next run will have no baseline");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

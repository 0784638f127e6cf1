use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use equipwatch::config::AppConfig;
use equipwatch::error::AppError;
use equipwatch::poller::TrafficPoller;
use equipwatch::query::{TrafficQuery, TrafficQueryEngine};
use equipwatch::registry::EquipmentRegistry;
use equipwatch::status::DeviceStatus;
use equipwatch::store::FileTrafficStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered equipment with reachability status
    Status,
    /// Poll a device (or all devices) and append samples to the traffic log
    Poll {
        /// Equipment id; polls every registered device when omitted
        id: Option<i32>,
    },
    /// Show a device's SNMP identity (sysName, sysUpTime)
    Info { id: i32 },
    /// Print a chart-ready traffic series for a device
    Traffic {
        id: i32,
        /// Inclusive start of the time range (RFC 3339)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Inclusive end of the time range (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        /// Leave the inbound series out of the result
        #[arg(long)]
        hide_in: bool,
        /// Leave the outbound series out of the result
        #[arg(long)]
        hide_out: bool,
    },
}

#[derive(Serialize)]
struct StatusRow {
    id: i32,
    name: String,
    address: String,
    status: DeviceStatus,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "equipwatch.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stderr so command output on stdout stays machine-readable
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    init_logging(&config.log_dir);
    info!("Starting equipwatch");

    let store = Arc::new(FileTrafficStore::new(&config.traffic_log_file));
    let poller = TrafficPoller::new(
        EquipmentRegistry::new(&config.equipment_file),
        store.clone(),
        config.snmp.clone(),
        config.ping.clone(),
    );

    match args.command {
        Command::Status => {
            let rows: Vec<StatusRow> = poller
                .status_all()
                .await?
                .into_iter()
                .map(|(device, status)| StatusRow {
                    id: device.id,
                    name: device.name,
                    address: device.address,
                    status,
                })
                .collect();
            print_json(&rows)?;
        }
        Command::Poll { id } => {
            let samples = match id {
                Some(id) => vec![poller.poll_device(id).await?],
                None => poller.poll_all().await?,
            };
            print_json(&samples)?;
        }
        Command::Info { id } => {
            let info = poller.device_info(id).await?;
            print_json(&info)?;
        }
        Command::Traffic {
            id,
            start,
            end,
            hide_in,
            hide_out,
        } => {
            let engine = TrafficQueryEngine::new(store);
            let query = TrafficQuery {
                start,
                end,
                show_in: !hide_in,
                show_out: !hide_out,
            };
            let series = engine.query_series(id, &query).await?;
            print_json(&series)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize result");
            Err(e.into())
        }
    }
}

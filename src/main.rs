use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use mollie_gateway::application::engine::ReconciliationEngine;
use mollie_gateway::application::gateway::MollieGateway;
use mollie_gateway::config::GatewayConfig;
use mollie_gateway::infrastructure::in_memory::FixtureProvider;
use mollie_gateway::interfaces::csv::notification_reader::NotificationReader;
use mollie_gateway::interfaces::csv::state_writer::StateWriter;
use mollie_gateway::interfaces::json;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply provider status notifications to orders and print the resulting states
    Reconcile {
        /// Notifications CSV file (payment, status, refunded_currency, refunded_value)
        notifications: PathBuf,

        /// JSON file with the orders (and their payments) to load before reconciling
        #[arg(long)]
        orders: Option<PathBuf>,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Print the payment methods from a provider methods response
    Methods {
        /// Methods JSON file, either the provider's list envelope or a bare array
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GatewayConfig::default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.default_log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Reconcile {
            notifications,
            orders,
            db_path,
        } => reconcile(config.with_db_path(db_path), notifications, orders).await,
        Command::Methods { input } => methods(input).await,
    }
}

async fn reconcile(
    config: GatewayConfig,
    notifications: PathBuf,
    orders: Option<PathBuf>,
) -> Result<()> {
    let store = config.storage.open().into_diagnostic()?;
    let gateway = MollieGateway::new(Box::new(FixtureProvider::default()));
    let engine = ReconciliationEngine::new(store, gateway);

    if let Some(path) = orders {
        let file = File::open(path).into_diagnostic()?;
        for order in json::load_orders(file).into_diagnostic()? {
            engine.register_order(order).await.into_diagnostic()?;
        }
    }

    let file = File::open(notifications).into_diagnostic()?;
    let reader = NotificationReader::new(file);
    for notification in reader.notifications() {
        match notification {
            Ok(notification) => {
                if let Err(e) = engine.process_notification(notification).await {
                    eprintln!("Error reconciling notification: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading notification: {}", e);
            }
        }
    }

    let orders = engine.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = StateWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}

async fn methods(input: PathBuf) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let methods = json::load_methods(file).into_diagnostic()?;
    let gateway = MollieGateway::new(Box::new(FixtureProvider::new(methods)));

    let methods = gateway.available_methods().await.into_diagnostic()?;
    json::write_methods(io::stdout().lock(), &methods).into_diagnostic()?;

    Ok(())
}

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use crate::adapters::SqliteTransactionRepository;
use crate::config::Config;
use crate::handlers::transactions::{clamp_limit, DEFAULT_LIST_LIMIT};
use crate::ports::TransactionRepository;

#[derive(Parser)]
#[command(name = "fraud-ledger")]
#[command(about = "Fraud Ledger - transaction risk scoring service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Transaction inspection commands
    #[command(subcommand)]
    Tx(TxCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Print one stored transaction as JSON
    Show {
        /// Transaction id
        #[arg(value_name = "TX_ID")]
        tx_id: i64,
    },

    /// Print the most recent transactions as JSON, newest first
    List {
        /// Number of transactions, clamped to 1..=200
        #[arg(short, long, default_value_t = DEFAULT_LIST_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn handle_tx_show(pool: &SqlitePool, tx_id: i64) -> anyhow::Result<()> {
    let repo = SqliteTransactionRepository::new(pool.clone());

    match repo.get_by_id(tx_id).await? {
        Some(tx) => {
            println!("{}", serde_json::to_string_pretty(&tx)?);
            Ok(())
        }
        None => {
            tracing::warn!("Transaction {} not found", tx_id);
            anyhow::bail!("Transaction {} not found", tx_id)
        }
    }
}

pub async fn handle_tx_list(pool: &SqlitePool, limit: i64) -> anyhow::Result<()> {
    let repo = SqliteTransactionRepository::new(pool.clone());
    let transactions = repo.list_recent(clamp_limit(limit)).await?;

    println!("{}", serde_json::to_string_pretty(&transactions)?);
    tracing::info!(count = transactions.len(), "Listed transactions");

    Ok(())
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    tracing::info!("Database migrations completed");
    println!("✓ Database migrations completed");

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Database URL: {}", config.database_url);
    println!("  Database Max Connections: {}", config.database_max_connections);
    println!("  Log Format: {:?}", config.log_format);

    config.validate()?;

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

//! Binary entry point for the ledger and escrow service.

use std::net::SocketAddr;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use escrow_ledger::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use escrow_ledger::server::{ServerConfig, create_server};

#[derive(Parser, Debug)]
#[command(name = "escrow-ledger", about = "Ledger and escrow service")]
struct Cli {
    /// Socket address the HTTP server binds to.
    #[arg(long, env = "LEDGER_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// PostgreSQL connection string. Omit to run with the in-memory store.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "LEDGER_DB_POOL_SIZE", default_value_t = 10)]
    db_pool_size: u32,
}

fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init();
    if let Err(err) = result {
        warn!("tracing already initialised: {err}");
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ServerConfig::new(cli.bind_addr);
    if let Some(database_url) = &cli.database_url {
        run_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        let pool_config = PoolConfig::new(database_url).with_max_size(cli.db_pool_size);
        let pool = DbPool::new(pool_config)
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr();
    let (server, health) = create_server(config)?;
    health.mark_ready();
    info!(%bind_addr, "ledger service listening");
    server.await
}

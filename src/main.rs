//! teller server entry point.
//!
//! Binds the TCP listener, optionally writes the bound port to the
//! configured port file, and serves sessions until killed.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use teller::config::ServerConfig;
use teller::domain::{Ledger, TransactionBus};
use teller::server::listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load()?;
    tracing::info!(addr = %config.listen_addr, "starting teller");

    let bus = TransactionBus::new(config.bus_capacity);
    let ledger = Arc::new(Ledger::new(config.initial_deposit, bus));

    let tcp_listener = listener::bind(&config).await?;
    listener::serve(tcp_listener, ledger).await?;

    Ok(())
}

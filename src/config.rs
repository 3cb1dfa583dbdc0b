//! Server configuration from environment variables and CLI arguments.
//!
//! Follows 12-factor style: settings come from environment variables (or
//! a `.env` file via `dotenvy`), with two positional CLI overrides for
//! test-harness compatibility: `teller [port [port-file]]`. Passing port
//! `0` selects an ephemeral port; the bound port is then written to the
//! port file so a harness can discover it.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Top-level server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the TCP listener to. A port of `0` lets the
    /// operating system pick an ephemeral port.
    pub listen_addr: SocketAddr,

    /// Path the bound port number is written to after binding, if set.
    pub port_file: Option<PathBuf>,

    /// XTS credited to every account when it is first opened.
    pub initial_deposit: i64,

    /// Capacity of the transaction bus broadcast channel.
    pub bus_capacity: usize,
}

impl ServerConfig {
    /// Loads configuration from the environment, then applies positional
    /// CLI overrides (`teller [port [port-file]]`).
    ///
    /// # Errors
    ///
    /// Returns an error if `BANK_LISTEN_ADDR` or the port argument cannot
    /// be parsed.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::from_env()?;

        let mut args = std::env::args().skip(1);
        if let Some(port) = args.next() {
            let port: u16 = port
                .parse()
                .with_context(|| format!("port argument '{port}' is not a valid port"))?;
            config.listen_addr.set_port(port);
        }
        if let Some(path) = args.next() {
            config.port_file = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Loads configuration from environment variables only.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `BANK_LISTEN_ADDR` is set but cannot be parsed
    /// as a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("BANK_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:0".to_string())
            .parse()
            .context("BANK_LISTEN_ADDR is not a valid socket address")?;

        let port_file = std::env::var("BANK_PORT_FILE").ok().map(PathBuf::from);
        let initial_deposit = parse_env("BANK_INITIAL_DEPOSIT", 100);
        let bus_capacity = parse_env("BANK_BUS_CAPACITY", 1024);

        Ok(Self {
            listen_addr,
            port_file,
            initial_deposit,
            bus_capacity,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

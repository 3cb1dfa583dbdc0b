//! TCP listener: binding, port hand-off, and the accept loop.

use std::sync::Arc;

use tokio::net::TcpListener;

use super::session;
use crate::config::ServerConfig;
use crate::domain::Ledger;

/// Binds the configured listen address and, if a port file is configured,
/// writes the bound port number to it so an external harness can find an
/// ephemerally chosen port.
///
/// # Errors
///
/// Returns an error if binding fails or the port file cannot be written.
pub async fn bind(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    use anyhow::Context;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    let local_addr = listener.local_addr().context("listener has no local address")?;

    if let Some(path) = &config.port_file {
        tokio::fs::write(path, local_addr.port().to_string())
            .await
            .with_context(|| format!("failed to write port file {}", path.display()))?;
        tracing::info!(path = %path.display(), port = local_addr.port(), "wrote port file");
    }

    tracing::info!(addr = %local_addr, "server listening");
    Ok(listener)
}

/// Accepts connections forever, spawning one session task per client.
///
/// The ledger (which owns the transaction bus) is shared by reference
/// with every session for the lifetime of the process.
///
/// # Errors
///
/// Returns the first `accept` error; per-session I/O errors are logged
/// and do not stop the listener.
pub async fn serve(listener: TcpListener, ledger: Arc<Ledger>) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!(%peer, "client connected");
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            if let Err(err) = session::run(stream, ledger).await {
                tracing::debug!(%peer, %err, "session ended with transport error");
            }
        });
    }
}

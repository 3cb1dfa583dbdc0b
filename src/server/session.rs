//! Per-connection session state machine.
//!
//! A session owns its TCP stream exclusively. It reassembles `\n`-terminated
//! lines from arbitrarily chunked input, walks AwaitingName → Authenticated,
//! and then answers one command per line. After a `monitor` command the
//! session keeps serving commands while also forwarding bus events for its
//! account, multiplexed onto the same writer so lines never interleave
//! partially.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::broadcast;

use super::command::{self, Reply};
use crate::domain::{Ledger, TransferEvent};

/// Runs one client session to completion.
///
/// Returns when the peer disconnects or on the first transport error.
/// Nothing is ever sent to a peer that is already gone; dropping the
/// broadcast receiver on return is all the subscription teardown needed.
///
/// # Errors
///
/// Propagates I/O errors from the underlying stream, including invalid
/// UTF-8 on the wire. The caller logs and forgets them; the protocol has
/// no way to report a transport failure to its victim.
pub async fn run(stream: TcpStream, ledger: Arc<Ledger>) -> io::Result<()> {
    let peer = stream.peer_addr()?;
    let (read_half, mut writer) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut monitor_rx: Option<broadcast::Receiver<TransferEvent>> = None;

    send(&mut writer, "What is your name?\n").await?;

    // AwaitingName: the first usable line is the account name.
    let account = loop {
        match lines.next_line().await? {
            None => return Ok(()),
            Some(line) => {
                let name = line.trim();
                if name.is_empty() {
                    continue;
                }
                break ledger.open(name).await;
            }
        }
    };
    send(&mut writer, &format!("Hi {}\n", account.name())).await?;
    tracing::info!(%peer, name = account.name(), "session authenticated");

    // Authenticated: commands and, once monitoring, interleaved bus pushes.
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match command::execute(&line, &account, &ledger).await {
                    Reply::Text(text) => send(&mut writer, &text).await?,
                    Reply::Monitor { snapshot, rx } => {
                        send(&mut writer, &snapshot).await?;
                        // A repeated `monitor` replaces the subscription.
                        monitor_rx = Some(rx);
                    }
                }
            }
            event = next_event(&mut monitor_rx) => match event {
                Ok(event) => {
                    if event.account == account.name() {
                        send(&mut writer, &event.record.tab_line()).await?;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(dropped)) => {
                    tracing::warn!(
                        %peer,
                        account = account.name(),
                        dropped,
                        "monitor fell behind the transaction bus; oldest events dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    monitor_rx = None;
                }
            }
        }
    }

    tracing::debug!(%peer, name = account.name(), "peer disconnected");
    Ok(())
}

/// Waits for the next bus event, or forever when the session is not
/// monitoring. Pending-forever keeps the `select!` arm inert without a
/// branch precondition.
async fn next_event(
    rx: &mut Option<broadcast::Receiver<TransferEvent>>,
) -> Result<TransferEvent, broadcast::error::RecvError> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Writes and flushes one response; every protocol line is terminated
/// before the next command is read.
async fn send(writer: &mut OwnedWriteHalf, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}

//! Command parsing and execution for authenticated sessions.
//!
//! A complete input line is parsed into a [`Command`], executed against
//! the shared [`Ledger`], and rendered into the exact protocol response.
//! Anything that fails to parse, including bad integers and missing
//! fields, is answered with `Unknown command: '<line>'`.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::{Account, AccountSnapshot, Ledger, TransferEvent};
use crate::error::TellerError;

/// Header line of the `transactions` and `monitor` snapshot blocks.
pub const SNAPSHOT_HEADER: &str = "CPTY\tBAL\tCOMM\n";

/// A successfully parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `transfer <to> <amount> <comment...>` — the comment is the verbatim
    /// remainder of the line and may be empty or start with whitespace.
    Transfer {
        /// Receiving account name.
        to: &'a str,
        /// Positive whole-XTS amount.
        amount: i64,
        /// Verbatim rest of the line after the amount.
        comment: &'a str,
    },
    /// `balance` — read the current balance.
    Balance,
    /// `transactions <n>` — snapshot of the last `n` records.
    Transactions {
        /// Window size; non-positive yields an empty listing.
        count: i64,
    },
    /// `monitor <n>` — snapshot plus a live subscription.
    Monitor {
        /// Window size for the initial snapshot.
        count: i64,
    },
}

impl<'a> Command<'a> {
    /// Parses one complete line (without its terminator).
    ///
    /// Returns `None` for unknown verbs and for malformed arguments;
    /// the caller answers both identically.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut parts = line.splitn(2, ' ');
        let verb = parts.next()?;
        let rest = parts.next();

        match (verb, rest) {
            ("balance", None) => Some(Self::Balance),
            ("transfer", Some(rest)) => {
                let mut fields = rest.splitn(3, ' ');
                let to = fields.next()?;
                let amount: i64 = fields.next()?.parse().ok()?;
                if to.is_empty() || amount <= 0 {
                    return None;
                }
                // Everything after the single space following the amount,
                // whitespace and all.
                let comment = fields.next().unwrap_or("");
                Some(Self::Transfer {
                    to,
                    amount,
                    comment,
                })
            }
            ("transactions", Some(rest)) => {
                Some(Self::Transactions { count: rest.parse().ok()? })
            }
            ("monitor", Some(rest)) => Some(Self::Monitor { count: rest.parse().ok()? }),
            _ => None,
        }
    }
}

/// Result of executing one command line.
#[derive(Debug)]
pub enum Reply {
    /// Response text to write and flush; the session then reads the next
    /// line as usual.
    Text(String),
    /// Snapshot text to write, plus the live subscription the session
    /// must start forwarding from.
    Monitor {
        /// Initial snapshot block, including the balance footer.
        snapshot: String,
        /// Receiver of future committed transfers.
        rx: broadcast::Receiver<TransferEvent>,
    },
}

/// Executes one input line on behalf of an authenticated account.
pub async fn execute(line: &str, account: &Arc<Account>, ledger: &Ledger) -> Reply {
    match Command::parse(line) {
        None => Reply::Text(format!("Unknown command: '{line}'\n")),
        Some(Command::Balance) => Reply::Text(format!("{}\n", account.balance().await)),
        Some(Command::Transfer {
            to,
            amount,
            comment,
        }) => match ledger.transfer(account, to, amount, comment).await {
            Ok(()) => Reply::Text("OK\n".to_string()),
            Err(
                err @ (TellerError::InsufficientFunds { .. } | TellerError::UnknownAccount(_)),
            ) => Reply::Text(format!("{err}\n")),
            // Non-positive amounts never parse, so this is unreachable from
            // the wire; answer like any other malformed line.
            Err(TellerError::InvalidAmount(_)) => {
                Reply::Text(format!("Unknown command: '{line}'\n"))
            }
        },
        Some(Command::Transactions { count }) => {
            Reply::Text(render_snapshot(&account.snapshot(count).await))
        }
        Some(Command::Monitor { count }) => {
            let (snapshot, rx) = ledger.monitor(account, count).await;
            Reply::Monitor {
                snapshot: render_snapshot(&snapshot),
                rx,
            }
        }
    }
}

/// Renders a snapshot block: header, one tab-separated line per record,
/// and the balance footer.
#[must_use]
pub fn render_snapshot(snapshot: &AccountSnapshot) -> String {
    let mut out = String::from(SNAPSHOT_HEADER);
    for record in &snapshot.records {
        out.push_str(&record.tab_line());
    }
    out.push_str(&format!("===== BALANCE: {} XTS =====\n", snapshot.balance));
    out
}

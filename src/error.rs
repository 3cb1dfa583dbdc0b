//! Business-rule errors with protocol line mapping.
//!
//! [`TellerError`] is the central error type for ledger operations. The
//! `Display` implementation of each client-facing variant is the exact
//! one-line protocol message sent to the client (without the trailing
//! newline), so the command processor can render errors directly.

/// Ledger operation errors.
///
/// | Variant | Protocol line |
/// |---|---|
/// | `InsufficientFunds` | `Not enough funds: <avail> XTS available, <req> XTS requested` |
/// | `UnknownAccount` | `Unknown account: '<name>'` |
///
/// `InvalidAmount` is a caller bug (the command parser rejects
/// non-positive amounts before they reach the ledger) and never crosses
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TellerError {
    /// The sender's balance cannot cover the requested amount. Carries
    /// the balance observed at the instant of the atomic check.
    #[error("Not enough funds: {available} XTS available, {requested} XTS requested")]
    InsufficientFunds {
        /// Sender balance at the moment of the failed transfer.
        available: i64,
        /// Amount the transfer asked for.
        requested: i64,
    },

    /// The transfer counterparty does not name an existing account.
    /// Accounts are never created implicitly by a transfer.
    #[error("Unknown account: '{0}'")]
    UnknownAccount(String),

    /// Transfer amount was zero or negative.
    #[error("invalid transfer amount: {0}")]
    InvalidAmount(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_renders_protocol_line() {
        let err = TellerError::InsufficientFunds {
            available: 10,
            requested: 90,
        };
        assert_eq!(
            err.to_string(),
            "Not enough funds: 10 XTS available, 90 XTS requested"
        );
    }

    #[test]
    fn unknown_account_renders_protocol_line() {
        let err = TellerError::UnknownAccount("Mallory".to_string());
        assert_eq!(err.to_string(), "Unknown account: 'Mallory'");
    }
}

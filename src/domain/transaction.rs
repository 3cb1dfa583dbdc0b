//! Transaction records appended to account logs.
//!
//! Every committed transfer appends one [`TransactionRecord`] to each
//! affected account; opening an account appends the initial-deposit record.
//! Records are immutable once appended and never deleted.

/// Counterparty sentinel used for the account-opening deposit.
pub const OPENING_COUNTERPARTY: &str = "-";

/// A single signed entry in an account's append-only transaction log.
///
/// Created exactly once at commit time of a transfer or of the account
/// opening; immutable thereafter. The account balance always equals the
/// sum of the deltas of all records in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Name of the other account involved, or `"-"` for the opening deposit.
    pub counterparty: String,
    /// Signed amount applied to this account's balance by this entry.
    /// Negative for the sender's debit, positive for the receiver's credit
    /// or the initial deposit.
    pub delta: i64,
    /// Free-form comment, the verbatim remainder of the command line.
    /// May be empty and may carry leading or trailing whitespace.
    pub comment: String,
}

impl TransactionRecord {
    /// Builds the opening-deposit record for a freshly created account.
    #[must_use]
    pub fn opening(name: &str, deposit: i64) -> Self {
        Self {
            counterparty: OPENING_COUNTERPARTY.to_string(),
            delta: deposit,
            comment: format!("Initial deposit for {name}"),
        }
    }

    /// Renders the record as one tab-separated protocol line:
    /// `<counterparty>\t<delta>\t<comment>\n`.
    ///
    /// Deltas render as plain signed integers, no `+` sign for credits.
    #[must_use]
    pub fn tab_line(&self) -> String {
        format!("{}\t{}\t{}\n", self.counterparty, self.delta, self.comment)
    }
}

//! Events emitted on the transaction bus when a transfer commits.

use super::TransactionRecord;

/// One side of a committed transfer, as seen by the affected account.
///
/// A successful transfer publishes two events in commit order, the
/// sender's debit first, then the receiver's credit. Both carry the same
/// global commit sequence number. Monitoring sessions filter events by
/// [`account`](Self::account) and forward the matching record verbatim.
#[derive(Debug, Clone)]
pub struct TransferEvent {
    /// Name of the account whose log received `record`.
    pub account: String,
    /// The record appended to that account's log.
    pub record: TransactionRecord,
    /// Global commit sequence number of the transfer.
    pub seq: u64,
}

//! Account state: a balance plus an append-only transaction log.

use tokio::sync::{Mutex, MutexGuard};

use super::TransactionRecord;

/// Point-in-time consistent view of an account: a window of the most
/// recent transactions together with the balance at the same instant.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    /// The selected suffix of the transaction log, oldest first.
    pub records: Vec<TransactionRecord>,
    /// Balance at the instant the window was taken.
    pub balance: i64,
}

/// A named balance-holding entity with an append-only transaction log.
///
/// The mutable state lives behind a per-account [`Mutex`] so unrelated
/// accounts never contend. [`super::Ledger`] acquires the locks of both
/// sides of a transfer in name order, which makes the two-sided update
/// appear atomic to every concurrent reader and rules out circular waits.
#[derive(Debug)]
pub struct Account {
    name: String,
    state: Mutex<AccountState>,
}

/// Lock-protected mutable part of an [`Account`].
#[derive(Debug)]
pub(crate) struct AccountState {
    pub(crate) balance: i64,
    pub(crate) log: Vec<TransactionRecord>,
}

impl AccountState {
    /// Applies a record: adjusts the balance and appends to the log.
    pub(crate) fn apply(&mut self, record: TransactionRecord) {
        self.balance = self.balance.saturating_add(record.delta);
        self.log.push(record);
    }

    /// Takes a consistent window of the last `count` records.
    ///
    /// `count <= 0` yields an empty window; a `count` larger than the log
    /// yields the whole log.
    pub(crate) fn snapshot(&self, count: i64) -> AccountSnapshot {
        let window = if count <= 0 {
            0
        } else {
            usize::try_from(count).unwrap_or(usize::MAX).min(self.log.len())
        };
        let skip = self.log.len() - window;
        AccountSnapshot {
            records: self.log.iter().skip(skip).cloned().collect(),
            balance: self.balance,
        }
    }
}

impl Account {
    /// Creates an account holding the initial deposit and its opening record.
    pub(crate) fn new(name: &str, deposit: i64) -> Self {
        let opening = TransactionRecord::opening(name, deposit);
        Self {
            name: name.to_string(),
            state: Mutex::new(AccountState {
                balance: deposit,
                log: vec![opening],
            }),
        }
    }

    /// The account's unique, case-sensitive name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a point-in-time consistent read of the balance.
    pub async fn balance(&self) -> i64 {
        self.state.lock().await.balance
    }

    /// Returns the last `count` transactions plus the balance, taken
    /// under a single lock acquisition.
    pub async fn snapshot(&self, count: i64) -> AccountSnapshot {
        self.state.lock().await.snapshot(count)
    }

    /// Locks the mutable state. Transfer code must respect the global
    /// name-order lock discipline when holding two accounts at once.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, AccountState> {
        self.state.lock().await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn record(delta: i64, comment: &str) -> TransactionRecord {
        TransactionRecord {
            counterparty: "Bob".to_string(),
            delta,
            comment: comment.to_string(),
        }
    }

    #[tokio::test]
    async fn new_account_has_opening_record() {
        let account = Account::new("Alice", 100);
        assert_eq!(account.name(), "Alice");
        assert_eq!(account.balance().await, 100);

        let snap = account.snapshot(10).await;
        assert_eq!(snap.records.len(), 1);
        assert_eq!(snap.records.first(), Some(&TransactionRecord::opening("Alice", 100)));
    }

    #[tokio::test]
    async fn apply_keeps_balance_and_log_in_step() {
        let account = Account::new("Alice", 100);
        {
            let mut state = account.lock().await;
            state.apply(record(-90, "out"));
            state.apply(record(40, "in"));
        }
        assert_eq!(account.balance().await, 50);

        let snap = account.snapshot(10).await;
        let sum: i64 = snap.records.iter().map(|r| r.delta).sum();
        assert_eq!(snap.balance, sum);
    }

    #[tokio::test]
    async fn snapshot_window_is_a_suffix_oldest_first() {
        let account = Account::new("Alice", 100);
        {
            let mut state = account.lock().await;
            state.apply(record(-10, "a"));
            state.apply(record(-20, "b"));
        }

        let snap = account.snapshot(2).await;
        assert_eq!(snap.records.len(), 2);
        assert_eq!(snap.records.first().map(|r| r.comment.as_str()), Some("a"));
        assert_eq!(snap.records.last().map(|r| r.comment.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn snapshot_clamps_count_to_log_length() {
        let account = Account::new("Alice", 100);
        let snap = account.snapshot(1000).await;
        assert_eq!(snap.records.len(), 1);
    }

    #[tokio::test]
    async fn non_positive_count_yields_empty_window() {
        let account = Account::new("Alice", 100);
        assert!(account.snapshot(0).await.records.is_empty());
        assert!(account.snapshot(-3).await.records.is_empty());
    }
}

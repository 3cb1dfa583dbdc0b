//! Concurrent account storage with per-account fine-grained locking.
//!
//! [`Ledger`] stores all accounts in a `HashMap` behind a
//! [`tokio::sync::RwLock`]; each account's balance and log are protected
//! by their own [`tokio::sync::Mutex`]. The outer lock is held only for
//! map lookups and inserts, so operations on unrelated accounts never
//! serialize against each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, broadcast};

use super::account::{Account, AccountSnapshot};
use super::{TransactionBus, TransactionRecord, TransferEvent};
use crate::error::TellerError;

/// Central store for all accounts plus the transaction bus.
///
/// # Concurrency
///
/// - Reads of different accounts, and of the same account, are concurrent.
/// - Transfers over disjoint account pairs proceed concurrently.
/// - A transfer locks both affected accounts in lexicographic name order,
///   so two transfers running in opposite directions between the same two
///   accounts can never deadlock.
/// - Bus publication happens while the account locks are held, which makes
///   the event stream order identical to the commit order every reader of
///   the logs observes.
#[derive(Debug)]
pub struct Ledger {
    accounts: RwLock<HashMap<String, Arc<Account>>>,
    bus: TransactionBus,
    commit_seq: AtomicU64,
    initial_deposit: i64,
}

impl Ledger {
    /// Creates an empty ledger. `initial_deposit` is credited to every
    /// account on first open; committed transfers are published on `bus`.
    #[must_use]
    pub fn new(initial_deposit: i64, bus: TransactionBus) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            bus,
            commit_seq: AtomicU64::new(0),
            initial_deposit,
        }
    }

    /// Returns a reference to the inner [`TransactionBus`].
    #[must_use]
    pub fn bus(&self) -> &TransactionBus {
        &self.bus
    }

    /// Opens the account with the given name, idempotently.
    ///
    /// The first call for a name creates the account with the configured
    /// initial deposit and its opening record; every later call returns
    /// the existing account unchanged. Safe under concurrent first-use
    /// races: exactly one creation occurs.
    pub async fn open(&self, name: &str) -> Arc<Account> {
        if let Some(existing) = self.accounts.read().await.get(name) {
            return Arc::clone(existing);
        }

        let mut map = self.accounts.write().await;
        // Another connection may have claimed the name between the locks.
        if let Some(existing) = map.get(name) {
            return Arc::clone(existing);
        }
        let account = Arc::new(Account::new(name, self.initial_deposit));
        map.insert(name.to_string(), Arc::clone(&account));
        tracing::info!(name, deposit = self.initial_deposit, "account opened");
        account
    }

    /// Looks up an existing account by name.
    pub async fn get(&self, name: &str) -> Option<Arc<Account>> {
        self.accounts.read().await.get(name).cloned()
    }

    /// Returns the number of open accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns `true` if no account has been opened yet.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// Atomically moves `amount` XTS from `from` to the account named
    /// `to_name`, appending one record to each side and publishing both
    /// on the bus in commit order (debit first).
    ///
    /// The balance check uses the sender balance at the instant of the
    /// update, and no observer of either account can see only one side
    /// applied.
    ///
    /// # Errors
    ///
    /// - [`TellerError::UnknownAccount`] if `to_name` does not exist;
    ///   accounts are never created implicitly.
    /// - [`TellerError::InsufficientFunds`] if the sender balance cannot
    ///   cover `amount`; neither account is touched.
    /// - [`TellerError::InvalidAmount`] if `amount` is not positive.
    pub async fn transfer(
        &self,
        from: &Arc<Account>,
        to_name: &str,
        amount: i64,
        comment: &str,
    ) -> Result<(), TellerError> {
        if amount <= 0 {
            return Err(TellerError::InvalidAmount(amount));
        }
        let to = self
            .get(to_name)
            .await
            .ok_or_else(|| TellerError::UnknownAccount(to_name.to_string()))?;

        let debit = TransactionRecord {
            counterparty: to.name().to_string(),
            delta: -amount,
            comment: comment.to_string(),
        };
        let credit = TransactionRecord {
            counterparty: from.name().to_string(),
            delta: amount,
            comment: comment.to_string(),
        };

        if Arc::ptr_eq(from, &to) {
            // Self-transfer: one lock, both records, net balance unchanged.
            let mut state = from.lock().await;
            if state.balance < amount {
                return Err(TellerError::InsufficientFunds {
                    available: state.balance,
                    requested: amount,
                });
            }
            state.apply(debit.clone());
            state.apply(credit.clone());
            let seq = self.commit_seq.fetch_add(1, Ordering::Relaxed);
            self.publish(from.name(), debit, seq);
            self.publish(from.name(), credit, seq);
            return Ok(());
        }

        // Lock both sides in name order regardless of transfer direction.
        let (mut from_state, mut to_state) = if from.name() < to.name() {
            let f = from.lock().await;
            let t = to.lock().await;
            (f, t)
        } else {
            let t = to.lock().await;
            let f = from.lock().await;
            (f, t)
        };

        if from_state.balance < amount {
            return Err(TellerError::InsufficientFunds {
                available: from_state.balance,
                requested: amount,
            });
        }

        from_state.apply(debit.clone());
        to_state.apply(credit.clone());

        // Publish under the locks so the bus order matches commit order.
        let seq = self.commit_seq.fetch_add(1, Ordering::Relaxed);
        self.publish(from.name(), debit, seq);
        self.publish(to.name(), credit, seq);

        tracing::debug!(
            from = from.name(),
            to = to.name(),
            amount,
            seq,
            "transfer committed"
        );
        Ok(())
    }

    /// Takes a monitor snapshot and subscribes in one atomic step.
    ///
    /// Holding the account lock across the subscription guarantees the
    /// stream never replays a record already in the snapshot and never
    /// misses one committed after it.
    pub async fn monitor(
        &self,
        account: &Account,
        count: i64,
    ) -> (AccountSnapshot, broadcast::Receiver<TransferEvent>) {
        let state = account.lock().await;
        let rx = self.bus.subscribe();
        (state.snapshot(count), rx)
    }

    fn publish(&self, account: &str, record: TransactionRecord, seq: u64) {
        let _ = self.bus.publish(TransferEvent {
            account: account.to_string(),
            record,
            seq,
        });
    }
}

//! Domain layer: accounts, the ledger, and the transaction event system.
//!
//! This module contains the server-side model of the bank: transaction
//! records, per-account state, the concurrent ledger store, and the
//! broadcast bus that carries committed transfers to monitoring sessions.

pub mod account;
pub mod ledger;
pub mod transaction;
pub mod transaction_bus;
pub mod transfer_event;

pub use account::{Account, AccountSnapshot};
pub use ledger::Ledger;
pub use transaction::{OPENING_COUNTERPARTY, TransactionRecord};
pub use transaction_bus::TransactionBus;
pub use transfer_event::TransferEvent;

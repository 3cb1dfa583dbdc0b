//! # teller
//!
//! Concurrent TCP ledger server for the XTS toy currency.
//!
//! Named clients connect over a newline-delimited text protocol, hold
//! balances in a shared in-memory ledger, transfer funds to one another,
//! inspect transaction history, and subscribe to a live feed of incoming
//! transactions (`monitor`).
//!
//! ## Architecture
//!
//! ```text
//! Clients (TCP, line protocol)
//!     │
//!     ├── Listener (server/listener) — one spawned task per connection
//!     ├── Session (server/session)   — line reassembly, state machine
//!     ├── Command processor (server/command)
//!     │
//!     ├── Ledger (domain/ledger)     — per-account locks, atomic transfers
//!     └── TransactionBus (domain/)   — broadcast of committed transfers
//! ```
//!
//! The ledger is the only cross-session shared mutable state. Transfers
//! lock the two affected accounts in name order and publish both sides on
//! the bus while the locks are held, so log readers and monitor streams
//! observe a single consistent commit order.

pub mod config;
pub mod domain;
pub mod error;
pub mod server;

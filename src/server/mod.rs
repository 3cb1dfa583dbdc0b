//! Network layer: the TCP listener, per-connection sessions, and the
//! command processor.
//!
//! The protocol is newline-delimited UTF-8 text. Each connection gets one
//! spawned task; the only cross-session shared state is the ledger.

pub mod command;
pub mod listener;
pub mod session;

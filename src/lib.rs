//! Per-user point ledger: charge, use, and balance lookup over two
//! in-memory stores (latest balance per user, append-only transaction
//! history).
//!
//! The domain logic lives in [`commands`]; stores are abstracted behind
//! [`ports`] with in-memory implementations under [`adapters`].

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod ports;

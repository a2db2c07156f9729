//! `stockyard-ledger` — the stock-consistency engine.
//!
//! Single source of truth for availability per (product, warehouse). All
//! mutation goes through atomic operations that serialize on the specific keys
//! they touch; quantity is never observable below zero.

pub mod ledger;

pub use ledger::{StockLedger, StockLevel, StockLine, TransferOutcome};

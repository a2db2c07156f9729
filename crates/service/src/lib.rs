//! `stockyard-service` — the application layer.
//!
//! Wires the catalog directories, the stock ledger, and the order/return
//! domain into the operations the surrounding request-handling code calls.
//! Every operation is atomic: on failure partway through, no partial write is
//! observable.

pub mod artifact;
pub mod service;
pub mod views;


pub use artifact::{ArtifactEncoder, InlineArtifactEncoder, order_locator};
pub use service::{OrderLineRequest, Stockyard};
pub use views::{
    OrderItemView, OrderView, ReturnItemView, ReturnView, StockView, TransferView,
};

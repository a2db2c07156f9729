//! `stockyard-orders` — order and return domain rules.
//!
//! Pure domain: the order aggregate, its status state machine, and return
//! validation. Stock movement lives in `stockyard-ledger`; this crate only
//! decides what is allowed.

pub mod order;
pub mod returns;

pub use order::{ClientInfo, Order, OrderId, OrderItem, OrderStatus};
pub use returns::{Return, ReturnId, ReturnItem, ReturnRequestLine};

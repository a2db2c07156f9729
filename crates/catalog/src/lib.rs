//! `stockyard-catalog` — reference directories for products and warehouses.
//!
//! These are the simple leaves of the system: entity definitions plus
//! in-process registries. Stock quantities live in `stockyard-ledger`, never
//! here.

pub mod product;
pub mod warehouse;

pub use product::{Product, ProductDirectory, ProductId};
pub use warehouse::{Warehouse, WarehouseDirectory, WarehouseId};

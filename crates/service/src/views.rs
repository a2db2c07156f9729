//! View types returned to the calling layer.
//!
//! Views are plain serializable data. Product names are resolved at view-build
//! time; prices inside `OrderItemView` are the snapshots taken at
//! order-creation time, never the current catalog price.

use serde::{Deserialize, Serialize};

use stockyard_catalog::{ProductDirectory, ProductId, WarehouseId};
use stockyard_core::Money;
use stockyard_orders::{Order, OrderId, OrderStatus, Return};

/// One order line as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
}

/// Full order as shown to the caller. `total_price` is computed from the
/// persisted line items on every build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: String,
    pub warehouse_id: WarehouseId,
    pub client_name: String,
    pub destination_address: String,
    pub comment: Option<String>,
    pub cancellation_reason: Option<String>,
    pub qr_code: Option<String>,
    pub total_price: Money,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    pub(crate) fn build(order: &Order, products: &ProductDirectory) -> Self {
        let items = order
            .items()
            .iter()
            .map(|item| OrderItemView {
                product_id: item.product_id(),
                name: resolve_name(products, item.product_id()),
                quantity: item.quantity(),
                price: item.price(),
            })
            .collect();

        Self {
            id: order.id_typed(),
            status: order.status(),
            created_at: order.created_at().to_rfc3339(),
            warehouse_id: order.warehouse_id(),
            client_name: order.client().client_name.clone(),
            destination_address: order.client().destination_address.clone(),
            comment: order.client().comment.clone(),
            cancellation_reason: order.cancellation_reason().map(str::to_string),
            qr_code: order.qr_code().map(str::to_string),
            total_price: order.total_price(),
            items,
        }
    }
}

/// One returned line as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItemView {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
}

/// Return aggregate as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnView {
    pub order_id: OrderId,
    pub reason: String,
    pub created_at: String,
    pub items: Vec<ReturnItemView>,
}

impl ReturnView {
    pub(crate) fn build(ret: &Return, products: &ProductDirectory) -> Self {
        let items = ret
            .items()
            .iter()
            .map(|item| ReturnItemView {
                product_id: item.product_id(),
                name: resolve_name(products, item.product_id()),
                quantity: item.quantity(),
            })
            .collect();

        Self {
            order_id: ret.order_id(),
            reason: ret.reason().to_string(),
            created_at: ret.created_at().to_rfc3339(),
            items,
        }
    }
}

/// Snapshot of one stock row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockView {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
}

/// Remaining quantities on both sides of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferView {
    pub from_qty: i64,
    pub to_qty: i64,
}

/// Products can be deleted after orders referencing them were created; views
/// keep working by falling back to the id.
fn resolve_name(products: &ProductDirectory, product_id: ProductId) -> String {
    products
        .get(product_id)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|_| format!("product {product_id}"))
}

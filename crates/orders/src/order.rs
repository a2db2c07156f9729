use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockyard_catalog::{ProductId, WarehouseId};
use stockyard_core::{AggregateId, DomainError, DomainResult, Entity, Money, impl_id_newtype};

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl_id_newtype!(OrderId, "OrderId");

/// Order status lifecycle.
///
/// Forward-only: `new → processing → shipped → completed`, with cancellation
/// allowed from `new`/`processing`/`completed` and `returned` reachable only
/// through the return workflow. `cancelled` and `returned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Processing,
    Shipped,
    Completed,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Position along the fulfilment chain; terminal states have none.
    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::New => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Completed => Some(3),
            OrderStatus::Cancelled | OrderStatus::Returned => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Whether a caller-driven status update to `next` is legal.
    ///
    /// Monotonic along the chain (forward moves only, skips allowed);
    /// `cancelled`/`returned` are not reachable this way.
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }

    /// Whether cancellation is legal from this status. `shipped` orders are
    /// in transit and cannot be cancelled.
    pub fn can_cancel(self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::Processing | OrderStatus::Completed
        )
    }

    /// Whether a return may be opened against an order in this status.
    pub fn can_return(self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::Processing | OrderStatus::Completed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "returned" => Ok(OrderStatus::Returned),
            other => Err(DomainError::invalid_argument(format!(
                "unknown order status: {other:?}"
            ))),
        }
    }
}

/// Who the order is for and where it goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_name: String,
    pub destination_address: String,
    pub comment: Option<String>,
}

/// One order line: product, quantity, and the unit price snapshotted at
/// order-creation time. The snapshot is immutable; later catalog price
/// changes never reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    product_id: ProductId,
    quantity: u32,
    price: Money,
}

impl OrderItem {
    pub fn new(product_id: ProductId, quantity: u32, price: Money) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }
        if price.is_negative() {
            return Err(DomainError::invalid_argument("price cannot be negative"));
        }
        Ok(Self {
            product_id,
            quantity,
            price,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    status: OrderStatus,
    warehouse_id: WarehouseId,
    client: ClientInfo,
    cancellation_reason: Option<String>,
    created_at: DateTime<Utc>,
    /// Opaque reference to the scannable-code artifact, if one was encoded.
    qr_code: Option<String>,
    items: Vec<OrderItem>,
}

impl Order {
    pub fn new(
        id: OrderId,
        warehouse_id: WarehouseId,
        client: ClientInfo,
        items: Vec<OrderItem>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::invalid_argument(
                "order must have at least one line item",
            ));
        }
        Ok(Self {
            id,
            status: OrderStatus::New,
            warehouse_id,
            client,
            cancellation_reason: None,
            created_at,
            qr_code: None,
            items,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn qr_code(&self) -> Option<&str> {
        self.qr_code.as_deref()
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Derived, never stored: sum of line totals.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Sum of ordered quantities across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Ordered quantity of one product, summed over its lines.
    pub fn quantity_of(&self, product_id: ProductId) -> u64 {
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| u64::from(i.quantity))
            .sum()
    }

    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Attach the encoded artifact reference (set once at creation).
    pub fn attach_qr_code(&mut self, reference: impl Into<String>) {
        self.qr_code = Some(reference.into());
    }

    /// Caller-driven status update. Terminal states are unreachable here and
    /// inescapable once entered.
    pub fn advance_status(&mut self, next: OrderStatus) -> DomainResult<()> {
        if next == OrderStatus::Cancelled {
            return Err(DomainError::invalid_argument(
                "use cancellation (with a reason) instead of a status update",
            ));
        }
        if next == OrderStatus::Returned {
            return Err(DomainError::invalid_state(
                "status 'returned' is set by the return workflow only",
            ));
        }
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "order is {} and cannot change status",
                self.status
            )));
        }
        if !self.status.can_advance_to(next) {
            return Err(DomainError::invalid_argument(format!(
                "illegal status transition {} -> {next}",
                self.status
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Cancel the order, recording the reason. Status-only: reserved stock is
    /// NOT released back to the ledger.
    pub fn cancel(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::invalid_state("order is already cancelled"));
        }
        if !self.status.can_cancel() {
            return Err(DomainError::invalid_state(format!(
                "order in status {} cannot be cancelled",
                self.status
            )));
        }
        self.status = OrderStatus::Cancelled;
        self.cancellation_reason = Some(reason.into());
        Ok(())
    }

    /// Transition to `returned`; called by the return workflow after a full
    /// return has been credited.
    pub fn mark_returned(&mut self) -> DomainResult<()> {
        if !self.status.can_return() {
            return Err(DomainError::invalid_state(format!(
                "order in status {} cannot be returned",
                self.status
            )));
        }
        self.status = OrderStatus::Returned;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &OrderId {
        &self.id
    }
}

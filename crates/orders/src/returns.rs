use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockyard_catalog::ProductId;
use stockyard_core::{AggregateId, DomainError, DomainResult, Entity, impl_id_newtype};

use crate::order::{Order, OrderId};

/// Return identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnId(pub AggregateId);

impl_id_newtype!(ReturnId, "ReturnId");

/// Requested return line, as submitted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequestLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// One returned line after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    product_id: ProductId,
    quantity: u32,
}

impl ReturnItem {
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A return against an order. At most one exists per order; that uniqueness
/// is enforced by the store, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Return {
    id: ReturnId,
    order_id: OrderId,
    reason: String,
    created_at: DateTime<Utc>,
    items: Vec<ReturnItem>,
}

impl Return {
    /// Validate a return request against the order and build the aggregate.
    ///
    /// Rules:
    /// - the order must be in a returnable status;
    /// - every requested product must be part of the order;
    /// - quantities are positive and, summed per product, never exceed the
    ///   ordered quantity.
    ///
    /// Returns the aggregate plus whether it covers the full order (the
    /// caller then moves the order to `returned`).
    pub fn against(
        id: ReturnId,
        order: &Order,
        reason: Option<String>,
        lines: &[ReturnRequestLine],
        created_at: DateTime<Utc>,
    ) -> DomainResult<(Self, bool)> {
        if !order.status().can_return() {
            return Err(DomainError::invalid_state(format!(
                "order in status {} cannot be returned",
                order.status()
            )));
        }
        if lines.is_empty() {
            return Err(DomainError::invalid_argument(
                "return must have at least one line",
            ));
        }

        // Aggregate per product so split lines are checked against the order
        // as one quantity.
        let mut requested: BTreeMap<ProductId, u64> = BTreeMap::new();
        for line in lines {
            if line.quantity == 0 {
                return Err(DomainError::invalid_argument("quantity must be positive"));
            }
            *requested.entry(line.product_id).or_insert(0) += u64::from(line.quantity);
        }

        for (product_id, qty) in &requested {
            if !order.contains_product(*product_id) {
                return Err(DomainError::invalid_argument(format!(
                    "product {product_id} is not part of the order"
                )));
            }
            let ordered = order.quantity_of(*product_id);
            if *qty > ordered {
                return Err(DomainError::invalid_argument(format!(
                    "cannot return {qty} of product {product_id}: only {ordered} ordered"
                )));
            }
        }

        let total_requested: u64 = requested.values().sum();
        let full = total_requested == order.total_quantity();

        // Per-line quantities fit u32, but the per-product sum may not.
        let items = requested
            .into_iter()
            .map(|(product_id, qty)| {
                let quantity = u32::try_from(qty).map_err(|_| {
                    DomainError::invalid_argument(format!(
                        "cannot return {qty} of product {product_id} in one request"
                    ))
                })?;
                Ok(ReturnItem {
                    product_id,
                    quantity,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok((
            Self {
                id,
                order_id: order.id_typed(),
                reason: reason.unwrap_or_default(),
                created_at,
                items,
            },
            full,
        ))
    }

    pub fn id_typed(&self) -> ReturnId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[ReturnItem] {
        &self.items
    }

    /// Sum of returned quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

impl Entity for Return {
    type Id = ReturnId;

    fn id(&self) -> &ReturnId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{ClientInfo, OrderItem, OrderStatus};
    use stockyard_catalog::WarehouseId;
    use stockyard_core::Money;

    fn order_with(items: Vec<OrderItem>) -> Order {
        Order::new(
            OrderId::generate(),
            WarehouseId::generate(),
            ClientInfo::default(),
            items,
            Utc::now(),
        )
        .unwrap()
    }

    fn item(product_id: ProductId, qty: u32) -> OrderItem {
        OrderItem::new(product_id, qty, Money::from_minor(100)).unwrap()
    }

    #[test]
    fn full_return_is_detected() {
        let p = ProductId::generate();
        let order = order_with(vec![item(p, 3)]);

        let (ret, full) = Return::against(
            ReturnId::generate(),
            &order,
            Some("damaged".to_string()),
            &[ReturnRequestLine { product_id: p, quantity: 3 }],
            Utc::now(),
        )
        .unwrap();

        assert!(full);
        assert_eq!(ret.total_quantity(), 3);
        assert_eq!(ret.reason(), "damaged");
        assert_eq!(ret.order_id(), order.id_typed());
    }

    #[test]
    fn partial_return_is_not_full() {
        let (p, q) = (ProductId::generate(), ProductId::generate());
        let order = order_with(vec![item(p, 3), item(q, 2)]);

        let (_, full) = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[ReturnRequestLine { product_id: p, quantity: 3 }],
            Utc::now(),
        )
        .unwrap();

        assert!(!full);
    }

    #[test]
    fn foreign_product_is_rejected() {
        let order = order_with(vec![item(ProductId::generate(), 3)]);

        let err = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[ReturnRequestLine {
                product_id: ProductId::generate(),
                quantity: 1,
            }],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn over_return_is_rejected() {
        let p = ProductId::generate();
        let order = order_with(vec![item(p, 2)]);

        let err = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[ReturnRequestLine { product_id: p, quantity: 3 }],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn split_lines_are_summed_against_the_order() {
        let p = ProductId::generate();
        let order = order_with(vec![item(p, 4)]);

        // 3 + 2 > 4 even though each line alone fits.
        let err = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[
                ReturnRequestLine { product_id: p, quantity: 3 },
                ReturnRequestLine { product_id: p, quantity: 2 },
            ],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let (ret, full) = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[
                ReturnRequestLine { product_id: p, quantity: 3 },
                ReturnRequestLine { product_id: p, quantity: 1 },
            ],
            Utc::now(),
        )
        .unwrap();
        assert!(full);
        assert_eq!(ret.items().len(), 1);
        assert_eq!(ret.items()[0].quantity(), 4);
    }

    #[test]
    fn aggregated_quantity_past_u32_is_rejected_not_wrapped() {
        let p = ProductId::generate();
        let order = order_with(vec![item(p, u32::MAX), item(p, u32::MAX)]);

        // Each line fits u32; the per-product sum does not.
        let half = 1u32 << 31;
        let err = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[
                ReturnRequestLine { product_id: p, quantity: half },
                ReturnRequestLine { product_id: p, quantity: half },
            ],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let p = ProductId::generate();
        let order = order_with(vec![item(p, 2)]);

        let err = Return::against(
            ReturnId::generate(),
            &order,
            None,
            &[ReturnRequestLine { product_id: p, quantity: 0 }],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn cancelled_and_shipped_orders_are_not_returnable() {
        let p = ProductId::generate();

        let mut cancelled = order_with(vec![item(p, 1)]);
        cancelled.cancel("n/a").unwrap();
        assert!(matches!(
            Return::against(
                ReturnId::generate(),
                &cancelled,
                None,
                &[ReturnRequestLine { product_id: p, quantity: 1 }],
                Utc::now(),
            ),
            Err(DomainError::InvalidState(_))
        ));

        let mut shipped = order_with(vec![item(p, 1)]);
        shipped.advance_status(OrderStatus::Shipped).unwrap();
        assert!(matches!(
            Return::against(
                ReturnId::generate(),
                &shipped,
                None,
                &[ReturnRequestLine { product_id: p, quantity: 1 }],
                Utc::now(),
            ),
            Err(DomainError::InvalidState(_))
        ));
    }
}

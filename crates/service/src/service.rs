//! The application service: catalog, ledger, and order/return workflows
//! behind one façade.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use stockyard_catalog::{
    Product, ProductDirectory, ProductId, Warehouse, WarehouseDirectory, WarehouseId,
};
use stockyard_core::{DomainError, DomainResult, Money};
use stockyard_ledger::{StockLedger, StockLine};
use stockyard_orders::{
    ClientInfo, Order, OrderId, OrderItem, OrderStatus, Return, ReturnId, ReturnRequestLine,
};

use crate::artifact::{ArtifactEncoder, InlineArtifactEncoder, order_locator};
use crate::views::{OrderView, ReturnView, StockView, TransferView};

/// One requested order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Warehouse/order management façade.
///
/// Holds the reference directories, the stock ledger, and the order/return
/// tables. Operations run to completion or fail without leaving partial
/// writes: every fallible step happens before the first visible mutation,
/// and multi-row stock movement goes through the ledger's all-or-nothing
/// primitives.
pub struct Stockyard {
    products: Arc<ProductDirectory>,
    warehouses: Arc<WarehouseDirectory>,
    ledger: Arc<StockLedger>,
    orders: RwLock<HashMap<OrderId, Order>>,
    returns: RwLock<HashMap<OrderId, Return>>,
    encoder: Box<dyn ArtifactEncoder>,
}

impl Stockyard {
    pub fn new() -> Self {
        Self::with_encoder(Box::new(InlineArtifactEncoder))
    }

    pub fn with_encoder(encoder: Box<dyn ArtifactEncoder>) -> Self {
        Self {
            products: Arc::new(ProductDirectory::new()),
            warehouses: Arc::new(WarehouseDirectory::new()),
            ledger: Arc::new(StockLedger::new()),
            orders: RwLock::new(HashMap::new()),
            returns: RwLock::new(HashMap::new()),
            encoder,
        }
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn create_product(
        &self,
        name: &str,
        product_type: &str,
        description: Option<String>,
        price: Money,
    ) -> DomainResult<Product> {
        let product = Product::new(ProductId::generate(), name, product_type, description, price)?;
        self.products.insert(product.clone())?;
        tracing::info!(product_id = %product.id_typed(), name, "product created");
        Ok(product)
    }

    pub fn get_product(&self, product_id: ProductId) -> DomainResult<Product> {
        self.products.get(product_id)
    }

    pub fn list_products(&self) -> Vec<Product> {
        self.products.list()
    }

    pub fn update_product_price(&self, product_id: ProductId, price: Money) -> DomainResult<()> {
        self.products.update_price(product_id, price)
    }

    /// Delete a product from the catalog. Refused while any warehouse still
    /// holds stock of it; zero-quantity rows are dropped along the way.
    pub fn delete_product(&self, product_id: ProductId) -> DomainResult<()> {
        self.products.get(product_id)?;
        self.ledger.remove_product(product_id)?;
        self.products.remove(product_id)?;
        tracing::info!(%product_id, "product deleted");
        Ok(())
    }

    pub fn create_warehouse(&self, name: &str, address: Option<String>) -> DomainResult<Warehouse> {
        let warehouse = Warehouse::new(WarehouseId::generate(), name, address)?;
        self.warehouses.insert(warehouse.clone())?;
        tracing::info!(warehouse_id = %warehouse.id_typed(), name, "warehouse created");
        Ok(warehouse)
    }

    pub fn get_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Warehouse> {
        self.warehouses.get(warehouse_id)
    }

    pub fn list_warehouses(&self) -> Vec<Warehouse> {
        self.warehouses.list()
    }

    pub fn delete_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<()> {
        self.warehouses.remove(warehouse_id)?;
        tracing::info!(%warehouse_id, "warehouse deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stock
    // ------------------------------------------------------------------

    /// Explicit stocking operation: put received goods on the shelf.
    pub fn receive_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
    ) -> DomainResult<StockView> {
        self.products.get(product_id)?;
        self.warehouses.get(warehouse_id)?;
        let quantity = self.ledger.receive(product_id, warehouse_id, quantity)?;
        Ok(StockView {
            product_id,
            warehouse_id,
            quantity,
        })
    }

    /// Take goods off the shelf outside of any order.
    pub fn withdraw_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
    ) -> DomainResult<StockView> {
        let quantity = self.ledger.reserve(product_id, warehouse_id, quantity)?;
        Ok(StockView {
            product_id,
            warehouse_id,
            quantity,
        })
    }

    /// Administrative correction by a signed delta.
    pub fn adjust_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
    ) -> DomainResult<StockView> {
        let quantity = self.ledger.adjust(product_id, warehouse_id, delta)?;
        Ok(StockView {
            product_id,
            warehouse_id,
            quantity,
        })
    }

    /// Move stock between warehouses as one atomic unit.
    pub fn transfer_stock(
        &self,
        product_id: ProductId,
        from_warehouse_id: WarehouseId,
        to_warehouse_id: WarehouseId,
        quantity: u32,
    ) -> DomainResult<TransferView> {
        self.warehouses.get(from_warehouse_id)?;
        self.warehouses.get(to_warehouse_id)?;
        let outcome =
            self.ledger
                .transfer(product_id, from_warehouse_id, to_warehouse_id, quantity)?;
        Ok(TransferView {
            from_qty: outcome.from_qty,
            to_qty: outcome.to_qty,
        })
    }

    /// Quantity of a product at one warehouse (0 for a never-stocked pair).
    pub fn stock_level(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<StockView> {
        self.products.get(product_id)?;
        self.warehouses.get(warehouse_id)?;
        let quantity = match self.ledger.quantity(product_id, warehouse_id) {
            Ok(q) => q,
            Err(DomainError::NotFound(_)) => 0,
            Err(e) => return Err(e),
        };
        Ok(StockView {
            product_id,
            warehouse_id,
            quantity,
        })
    }

    /// Total quantity of a product across all warehouses.
    pub fn total_stock(&self, product_id: ProductId) -> DomainResult<i64> {
        self.products.get(product_id)?;
        self.ledger.total_quantity(product_id)
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Create an order: snapshot prices, encode the locator artifact, reserve
    /// stock for every line, persist. All-or-nothing; a failed line leaves
    /// ledger and order tables untouched.
    pub fn create_order(
        &self,
        warehouse_id: WarehouseId,
        client: ClientInfo,
        lines: &[OrderLineRequest],
    ) -> DomainResult<OrderView> {
        self.warehouses.get(warehouse_id)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self.products.get(line.product_id)?;
            items.push(OrderItem::new(line.product_id, line.quantity, product.price())?);
        }

        let order_id = OrderId::generate();
        let mut order = Order::new(order_id, warehouse_id, client, items, Utc::now())?;

        // Encode before the first visible write so an encoder failure aborts
        // the whole create.
        let artifact = self.encoder.encode(&order_locator(order_id))?;
        order.attach_qr_code(artifact);

        let stock_lines: Vec<StockLine> = lines
            .iter()
            .map(|line| StockLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();
        self.ledger
            .reserve_all(warehouse_id, &stock_lines)
            .inspect_err(|e| {
                if e.is_transient() {
                    tracing::warn!(%order_id, %warehouse_id, "stock rows contended; safe to retry");
                }
            })?;

        let view = OrderView::build(&order, &self.products);
        self.orders_write().insert(order_id, order);
        tracing::info!(
            %order_id, %warehouse_id,
            lines = lines.len(), total = %view.total_price,
            "order created"
        );
        Ok(view)
    }

    pub fn get_order(&self, order_id: OrderId) -> DomainResult<OrderView> {
        let orders = self.orders_read();
        let order = orders
            .get(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        Ok(OrderView::build(order, &self.products))
    }

    /// All orders, oldest first.
    pub fn list_orders(&self) -> Vec<OrderView> {
        let orders = self.orders_read();
        let mut all: Vec<&Order> = orders.values().collect();
        all.sort_by_key(|o| o.id_typed());
        all.iter()
            .map(|o| OrderView::build(o, &self.products))
            .collect()
    }

    /// Caller-driven status update. Informational only: never touches stock.
    pub fn update_order_status(&self, order_id: OrderId, status: &str) -> DomainResult<OrderView> {
        let next: OrderStatus = status.parse()?;
        let mut orders = self.orders_write();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        order.advance_status(next)?;
        tracing::info!(%order_id, status = %next, "order status updated");
        Ok(OrderView::build(order, &self.products))
    }

    /// Cancel an order, recording the reason. Status-only: reserved stock is
    /// NOT released back to the ledger; restocking a cancelled order is a
    /// separate administrative action.
    pub fn cancel_order(&self, order_id: OrderId, reason: &str) -> DomainResult<OrderView> {
        let mut orders = self.orders_write();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        order.cancel(reason)?;
        tracing::info!(%order_id, reason, "order cancelled");
        Ok(OrderView::build(order, &self.products))
    }

    // ------------------------------------------------------------------
    // Returns
    // ------------------------------------------------------------------

    /// Open a return against an order, credit stock back, and mark the order
    /// `returned` when the full ordered quantity has come back.
    pub fn create_return(
        &self,
        order_id: OrderId,
        reason: Option<String>,
        lines: &[ReturnRequestLine],
    ) -> DomainResult<ReturnView> {
        // Held across the whole operation: the order's status and the
        // one-return-per-order rule must be decided under the same lock the
        // mutation happens under.
        let mut orders = self.orders_write();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;

        if self.returns_read().contains_key(&order_id) {
            return Err(DomainError::conflict(format!(
                "order {order_id} already has a return"
            )));
        }

        let (ret, full) = Return::against(ReturnId::generate(), order, reason, lines, Utc::now())?;

        let stock_lines: Vec<StockLine> = ret
            .items()
            .iter()
            .map(|item| StockLine {
                product_id: item.product_id(),
                quantity: item.quantity(),
            })
            .collect();
        self.ledger.release_all(order.warehouse_id(), &stock_lines)?;

        if full {
            order.mark_returned()?;
        }

        let view = ReturnView::build(&ret, &self.products);
        self.returns_write().insert(order_id, ret);
        tracing::info!(%order_id, full, lines = lines.len(), "return created");
        Ok(view)
    }

    pub fn get_return(&self, order_id: OrderId) -> DomainResult<ReturnView> {
        let returns = self.returns_read();
        let ret = returns
            .get(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("return for order {order_id}")))?;
        Ok(ReturnView::build(ret, &self.products))
    }

    fn orders_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<OrderId, Order>> {
        self.orders.read().unwrap_or_else(|e| e.into_inner())
    }

    fn orders_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Order>> {
        self.orders.write().unwrap_or_else(|e| e.into_inner())
    }

    fn returns_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<OrderId, Return>> {
        self.returns.read().unwrap_or_else(|e| e.into_inner())
    }

    fn returns_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Return>> {
        self.returns.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Stockyard {
    fn default() -> Self {
        Self::new()
    }
}

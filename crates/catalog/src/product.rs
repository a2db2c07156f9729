use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use stockyard_core::{AggregateId, DomainError, DomainResult, Entity, Money, impl_id_newtype};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl_id_newtype!(ProductId, "ProductId");

/// Catalog entry: a sellable product.
///
/// `price` here is the *current* list price. Order items snapshot it at
/// creation time and never read it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    product_type: String,
    description: Option<String>,
    price: Money,
}

impl Product {
    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        product_type: impl Into<String>,
        description: Option<String>,
        price: Money,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument("product name cannot be empty"));
        }
        if price.is_negative() {
            return Err(DomainError::invalid_argument("price cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            product_type: product_type.into(),
            description,
            price,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    /// Replace the list price. Does not touch any already-created order item.
    pub fn set_price(&mut self, price: Money) -> DomainResult<()> {
        if price.is_negative() {
            return Err(DomainError::invalid_argument("price cannot be negative"));
        }
        self.price = price;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// In-process product registry.
#[derive(Debug, Default)]
pub struct ProductDirectory {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl ProductDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) -> DomainResult<ProductId> {
        let id = product.id_typed();
        let mut map = self.write();
        if map.contains_key(&id) {
            return Err(DomainError::conflict(format!("product {id} already exists")));
        }
        map.insert(id, product);
        Ok(id)
    }

    pub fn get(&self, id: ProductId) -> DomainResult<Product> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    /// All products, ordered by id for deterministic listings.
    pub fn list(&self) -> Vec<Product> {
        let map = self.read();
        let mut all: Vec<Product> = map.values().cloned().collect();
        all.sort_by_key(|p| p.id_typed());
        all
    }

    pub fn remove(&self, id: ProductId) -> DomainResult<Product> {
        self.write()
            .remove(&id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    pub fn update_price(&self, id: ProductId, price: Money) -> DomainResult<()> {
        let mut map = self.write();
        let product = map
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        product.set_price(price)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ProductId, Product>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ProductId, Product>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

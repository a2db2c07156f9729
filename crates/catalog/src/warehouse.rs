use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use stockyard_core::{AggregateId, DomainError, DomainResult, Entity, impl_id_newtype};

/// Warehouse identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(pub AggregateId);

impl_id_newtype!(WarehouseId, "WarehouseId");

/// A physical storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    address: Option<String>,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        name: impl Into<String>,
        address: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "warehouse name cannot be empty",
            ));
        }
        Ok(Self { id, name, address })
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &WarehouseId {
        &self.id
    }
}

/// In-process warehouse registry.
#[derive(Debug, Default)]
pub struct WarehouseDirectory {
    inner: RwLock<HashMap<WarehouseId, Warehouse>>,
}

impl WarehouseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, warehouse: Warehouse) -> DomainResult<WarehouseId> {
        let id = warehouse.id_typed();
        let mut map = self.write();
        if map.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "warehouse {id} already exists"
            )));
        }
        map.insert(id, warehouse);
        Ok(id)
    }

    pub fn get(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))
    }

    pub fn contains(&self, id: WarehouseId) -> bool {
        self.read().contains_key(&id)
    }

    /// All warehouses, ordered by id for deterministic listings.
    pub fn list(&self) -> Vec<Warehouse> {
        let map = self.read();
        let mut all: Vec<Warehouse> = map.values().cloned().collect();
        all.sort_by_key(|w| w.id_typed());
        all
    }

    pub fn remove(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.write()
            .remove(&id)
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<WarehouseId, Warehouse>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<WarehouseId, Warehouse>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

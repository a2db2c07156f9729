use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};
use std::time::Duration;

use stockyard_catalog::{ProductId, WarehouseId};
use stockyard_core::{DomainError, DomainResult};

/// Stock row key: one counter per (product, warehouse) pair.
type StockKey = (ProductId, WarehouseId);

/// Bounded lock acquisition: try, back off, give up with `LockTimeout`.
const LOCK_ATTEMPTS: u32 = 50;
const LOCK_BACKOFF: Duration = Duration::from_millis(2);

/// One line of a multi-line reservation or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Snapshot of one stock row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
}

/// Result of an inter-warehouse transfer: remaining quantities on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub from_qty: i64,
    pub to_qty: i64,
}

/// The stock ledger: per-(product, warehouse) quantity counters.
///
/// Each counter sits behind its own mutex, so operations on disjoint keys
/// never contend. Multi-key operations (`transfer`, `reserve_all`,
/// `release_all`) lock their keys in canonical order and validate every line
/// before applying any, so partial application is never observable and
/// quantity never drops below zero.
///
/// Rows are created only by `receive` and by a transfer destination. Every
/// other operation fails with `NotFound` for a pair that was never stocked.
#[derive(Debug, Default)]
pub struct StockLedger {
    slots: RwLock<HashMap<StockKey, Arc<Mutex<i64>>>>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit stocking: create the row at `qty` if absent, else increment.
    pub fn receive(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        qty: u32,
    ) -> DomainResult<i64> {
        ensure_positive(qty)?;
        let slot = self.slot_or_insert((product_id, warehouse_id));
        let mut quantity = self.lock_bounded(&slot)?;
        *quantity += i64::from(qty);
        tracing::debug!(%product_id, %warehouse_id, qty, total = *quantity, "stock received");
        Ok(*quantity)
    }

    /// Decrement to back a reservation. Fails with `InsufficientStock` if the
    /// row holds less than `qty`; never drives the counter negative.
    pub fn reserve(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        qty: u32,
    ) -> DomainResult<i64> {
        ensure_positive(qty)?;
        let slot = self.existing_slot(product_id, warehouse_id)?;
        let mut quantity = self.lock_bounded(&slot)?;
        let requested = i64::from(qty);
        if *quantity < requested {
            return Err(DomainError::insufficient_stock(requested, *quantity));
        }
        *quantity -= requested;
        Ok(*quantity)
    }

    /// Increment to reverse a reservation (returns). The row must already
    /// exist; only a transfer destination auto-creates one.
    pub fn release(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        qty: u32,
    ) -> DomainResult<i64> {
        ensure_positive(qty)?;
        let slot = self.existing_slot(product_id, warehouse_id)?;
        let mut quantity = self.lock_bounded(&slot)?;
        *quantity += i64::from(qty);
        Ok(*quantity)
    }

    /// Administrative correction by a signed delta. Subject to the same
    /// non-negativity guarantee as every other mutation.
    pub fn adjust(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
    ) -> DomainResult<i64> {
        if delta == 0 {
            return Err(DomainError::invalid_argument("delta cannot be zero"));
        }
        let slot = self.existing_slot(product_id, warehouse_id)?;
        let mut quantity = self.lock_bounded(&slot)?;
        let next = *quantity + delta;
        if next < 0 {
            return Err(DomainError::insufficient_stock(-delta, *quantity));
        }
        *quantity = next;
        tracing::debug!(%product_id, %warehouse_id, delta, total = next, "stock adjusted");
        Ok(next)
    }

    /// Move `qty` between warehouses as one atomic unit. The destination row
    /// is created if absent; the source must cover the full quantity.
    pub fn transfer(
        &self,
        product_id: ProductId,
        from: WarehouseId,
        to: WarehouseId,
        qty: u32,
    ) -> DomainResult<TransferOutcome> {
        ensure_positive(qty)?;
        if from == to {
            return Err(DomainError::invalid_argument(
                "source and destination warehouse must differ",
            ));
        }

        let src = self.existing_slot(product_id, from)?;
        let (dst, dst_created) = self.slot_or_insert_tracking((product_id, to));

        // Canonical lock order by warehouse id so two opposed transfers
        // cannot deadlock.
        let (first, second) = if from < to { (&src, &dst) } else { (&dst, &src) };
        let guard_a = self.lock_bounded(first);
        let outcome = guard_a.and_then(|mut a| {
            let mut b = self.lock_bounded(second)?;
            let (src_qty, dst_qty) = if from < to {
                (&mut *a, &mut *b)
            } else {
                (&mut *b, &mut *a)
            };

            let requested = i64::from(qty);
            if *src_qty < requested {
                return Err(DomainError::insufficient_stock(requested, *src_qty));
            }
            *src_qty -= requested;
            *dst_qty += requested;
            Ok(TransferOutcome {
                from_qty: *src_qty,
                to_qty: *dst_qty,
            })
        });

        match outcome {
            Ok(outcome) => {
                tracing::debug!(
                    %product_id, %from, %to, qty,
                    from_qty = outcome.from_qty, to_qty = outcome.to_qty,
                    "stock transferred"
                );
                Ok(outcome)
            }
            Err(e) => {
                // A failed transfer must not leave behind a destination row
                // it created itself.
                if dst_created {
                    self.remove_if_empty((product_id, to));
                }
                Err(e)
            }
        }
    }

    /// All-or-nothing reservation of several lines at one warehouse.
    ///
    /// Lines are aggregated per product, locked in canonical key order, and
    /// validated in full before the first decrement. On any failure nothing
    /// has been applied.
    pub fn reserve_all(&self, warehouse_id: WarehouseId, lines: &[StockLine]) -> DomainResult<()> {
        self.apply_all(warehouse_id, lines, true)
    }

    /// All-or-nothing release of several lines at one warehouse (returns).
    pub fn release_all(&self, warehouse_id: WarehouseId, lines: &[StockLine]) -> DomainResult<()> {
        self.apply_all(warehouse_id, lines, false)
    }

    /// Current quantity for one row; `NotFound` if the pair was never stocked.
    pub fn quantity(&self, product_id: ProductId, warehouse_id: WarehouseId) -> DomainResult<i64> {
        let slot = self.existing_slot(product_id, warehouse_id)?;
        let quantity = self.lock_bounded(&slot)?;
        Ok(*quantity)
    }

    /// Total quantity of a product across all warehouses (0 if unstocked).
    pub fn total_quantity(&self, product_id: ProductId) -> DomainResult<i64> {
        let mut total = 0;
        for level in self.levels_for(product_id)? {
            total += level.quantity;
        }
        Ok(total)
    }

    /// Per-warehouse snapshot for one product, in canonical warehouse order.
    pub fn levels_for(&self, product_id: ProductId) -> DomainResult<Vec<StockLevel>> {
        let slots: BTreeMap<WarehouseId, Arc<Mutex<i64>>> = {
            let map = self.read_slots();
            map.iter()
                .filter(|((p, _), _)| *p == product_id)
                .map(|((_, w), slot)| (*w, Arc::clone(slot)))
                .collect()
        };

        let mut levels = Vec::with_capacity(slots.len());
        for (warehouse_id, slot) in slots {
            let quantity = self.lock_bounded(&slot)?;
            levels.push(StockLevel {
                product_id,
                warehouse_id,
                quantity: *quantity,
            });
        }
        Ok(levels)
    }

    /// Drop every row of a product. Fails with `Conflict` while any warehouse
    /// still holds stock of it (catalog deletion guard).
    pub fn remove_product(&self, product_id: ProductId) -> DomainResult<()> {
        let mut map = self.write_slots();
        let keys: Vec<StockKey> = map
            .keys()
            .filter(|(p, _)| *p == product_id)
            .copied()
            .collect();

        for key in &keys {
            if let Some(slot) = map.get(key) {
                let slot = Arc::clone(slot);
                let quantity = self.lock_bounded(&slot)?;
                if *quantity != 0 {
                    return Err(DomainError::conflict(format!(
                        "product {product_id} still has {} units in stock",
                        *quantity
                    )));
                }
            }
        }
        for key in keys {
            map.remove(&key);
        }
        Ok(())
    }

    fn apply_all(
        &self,
        warehouse_id: WarehouseId,
        lines: &[StockLine],
        subtract: bool,
    ) -> DomainResult<()> {
        if lines.is_empty() {
            return Err(DomainError::invalid_argument("no stock lines given"));
        }

        // Aggregate per product so each key is locked exactly once; BTreeMap
        // iteration doubles as the canonical lock order.
        let mut wanted: BTreeMap<ProductId, i64> = BTreeMap::new();
        for line in lines {
            ensure_positive(line.quantity)?;
            *wanted.entry(line.product_id).or_insert(0) += i64::from(line.quantity);
        }

        let mut slots = Vec::with_capacity(wanted.len());
        {
            let map = self.read_slots();
            for product_id in wanted.keys() {
                let slot = map.get(&(*product_id, warehouse_id)).ok_or_else(|| {
                    DomainError::not_found(format!(
                        "stock for product {product_id} at warehouse {warehouse_id}"
                    ))
                })?;
                slots.push(Arc::clone(slot));
            }
        }

        let mut guards: Vec<MutexGuard<'_, i64>> = Vec::with_capacity(slots.len());
        for slot in &slots {
            guards.push(self.lock_bounded(slot)?);
        }

        if subtract {
            for (guard, (_, requested)) in guards.iter().zip(wanted.iter()) {
                if **guard < *requested {
                    return Err(DomainError::insufficient_stock(*requested, **guard));
                }
            }
        }

        for (guard, (_, requested)) in guards.iter_mut().zip(wanted.iter()) {
            if subtract {
                **guard -= *requested;
            } else {
                **guard += *requested;
            }
        }
        Ok(())
    }

    fn existing_slot(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Arc<Mutex<i64>>> {
        self.read_slots()
            .get(&(product_id, warehouse_id))
            .map(Arc::clone)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "stock for product {product_id} at warehouse {warehouse_id}"
                ))
            })
    }

    fn slot_or_insert(&self, key: StockKey) -> Arc<Mutex<i64>> {
        self.slot_or_insert_tracking(key).0
    }

    fn slot_or_insert_tracking(&self, key: StockKey) -> (Arc<Mutex<i64>>, bool) {
        if let Some(slot) = self.read_slots().get(&key) {
            return (Arc::clone(slot), false);
        }
        let mut map = self.write_slots();
        let created = !map.contains_key(&key);
        let slot = map
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(0)))
            .clone();
        (slot, created)
    }

    fn remove_if_empty(&self, key: StockKey) {
        let mut map = self.write_slots();
        let empty = map
            .get(&key)
            .and_then(|slot| slot.try_lock().ok().map(|q| *q == 0))
            .unwrap_or(false);
        if empty {
            map.remove(&key);
        }
    }

    fn lock_bounded<'a>(&self, slot: &'a Mutex<i64>) -> DomainResult<MutexGuard<'a, i64>> {
        for _ in 0..LOCK_ATTEMPTS {
            match slot.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_BACKOFF),
                // A panicked holder cannot have left a torn counter: every
                // mutation validates before it assigns.
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
            }
        }
        Err(DomainError::LockTimeout)
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, HashMap<StockKey, Arc<Mutex<i64>>>> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slots(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<StockKey, Arc<Mutex<i64>>>> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn ensure_positive(qty: u32) -> DomainResult<()> {
    if qty == 0 {
        return Err(DomainError::invalid_argument("quantity must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn test_product_id() -> ProductId {
        ProductId::generate()
    }

    fn test_warehouse_id() -> WarehouseId {
        WarehouseId::generate()
    }

    #[test]
    fn receive_creates_then_accumulates() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());

        assert_eq!(ledger.receive(p, w, 5).unwrap(), 5);
        assert_eq!(ledger.receive(p, w, 3).unwrap(), 8);
        assert_eq!(ledger.quantity(p, w).unwrap(), 8);
    }

    #[test]
    fn reserve_decrements_and_rejects_shortfall() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 5).unwrap();

        assert_eq!(ledger.reserve(p, w, 3).unwrap(), 2);

        let err = ledger.reserve(p, w, 3).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 3,
                available: 2
            }
        );
        // Failed reserve left the counter untouched.
        assert_eq!(ledger.quantity(p, w).unwrap(), 2);
    }

    #[test]
    fn reserve_unstocked_pair_is_not_found() {
        let ledger = StockLedger::new();
        let err = ledger
            .reserve(test_product_id(), test_warehouse_id(), 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn release_requires_existing_row() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());

        assert!(matches!(
            ledger.release(p, w, 1),
            Err(DomainError::NotFound(_))
        ));

        ledger.receive(p, w, 2).unwrap();
        assert_eq!(ledger.release(p, w, 3).unwrap(), 5);
    }

    #[test]
    fn zero_quantity_is_invalid_everywhere() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 1).unwrap();

        assert!(matches!(
            ledger.receive(p, w, 0),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.reserve(p, w, 0),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.adjust(p, w, 0),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn adjust_never_goes_negative() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 4).unwrap();

        assert_eq!(ledger.adjust(p, w, -3).unwrap(), 1);
        assert!(matches!(
            ledger.adjust(p, w, -2),
            Err(DomainError::InsufficientStock { .. })
        ));
        assert_eq!(ledger.quantity(p, w).unwrap(), 1);
        assert_eq!(ledger.adjust(p, w, 10).unwrap(), 11);
    }

    #[test]
    fn transfer_moves_stock_and_creates_destination() {
        let ledger = StockLedger::new();
        let p = test_product_id();
        let (from, to) = (test_warehouse_id(), test_warehouse_id());
        ledger.receive(p, from, 10).unwrap();

        let outcome = ledger.transfer(p, from, to, 4).unwrap();
        assert_eq!(outcome, TransferOutcome { from_qty: 6, to_qty: 4 });
        assert_eq!(ledger.quantity(p, to).unwrap(), 4);
    }

    #[test]
    fn transfer_to_same_warehouse_is_invalid() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 10).unwrap();

        assert!(matches!(
            ledger.transfer(p, w, w, 1),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn failed_transfer_leaves_no_destination_row() {
        let ledger = StockLedger::new();
        let p = test_product_id();
        let (from, to) = (test_warehouse_id(), test_warehouse_id());
        ledger.receive(p, from, 2).unwrap();

        assert!(matches!(
            ledger.transfer(p, from, to, 5),
            Err(DomainError::InsufficientStock { .. })
        ));
        assert_eq!(ledger.quantity(p, from).unwrap(), 2);
        assert!(matches!(
            ledger.quantity(p, to),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn reserve_all_is_all_or_nothing() {
        let ledger = StockLedger::new();
        let w = test_warehouse_id();
        let (a, b) = (test_product_id(), test_product_id());
        ledger.receive(a, w, 10).unwrap();
        ledger.receive(b, w, 1).unwrap();

        let err = ledger
            .reserve_all(
                w,
                &[
                    StockLine { product_id: a, quantity: 5 },
                    StockLine { product_id: b, quantity: 2 },
                ],
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));

        // Nothing was decremented, including the line that could have been.
        assert_eq!(ledger.quantity(a, w).unwrap(), 10);
        assert_eq!(ledger.quantity(b, w).unwrap(), 1);
    }

    #[test]
    fn reserve_all_aggregates_duplicate_products() {
        let ledger = StockLedger::new();
        let w = test_warehouse_id();
        let p = test_product_id();
        ledger.receive(p, w, 5).unwrap();

        // Two lines of 3 each exceed the 5 on hand once aggregated.
        let err = ledger
            .reserve_all(
                w,
                &[
                    StockLine { product_id: p, quantity: 3 },
                    StockLine { product_id: p, quantity: 3 },
                ],
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(ledger.quantity(p, w).unwrap(), 5);

        ledger
            .reserve_all(
                w,
                &[
                    StockLine { product_id: p, quantity: 2 },
                    StockLine { product_id: p, quantity: 3 },
                ],
            )
            .unwrap();
        assert_eq!(ledger.quantity(p, w).unwrap(), 0);
    }

    #[test]
    fn release_all_credits_every_line() {
        let ledger = StockLedger::new();
        let w = test_warehouse_id();
        let (a, b) = (test_product_id(), test_product_id());
        ledger.receive(a, w, 2).unwrap();
        ledger.receive(b, w, 1).unwrap();
        ledger.reserve(b, w, 1).unwrap();

        ledger
            .release_all(
                w,
                &[
                    StockLine { product_id: a, quantity: 3 },
                    StockLine { product_id: b, quantity: 1 },
                ],
            )
            .unwrap();
        assert_eq!(ledger.quantity(a, w).unwrap(), 5);
        assert_eq!(ledger.quantity(b, w).unwrap(), 1);
    }

    #[test]
    fn total_quantity_sums_across_warehouses() {
        let ledger = StockLedger::new();
        let p = test_product_id();
        let (w1, w2) = (test_warehouse_id(), test_warehouse_id());
        ledger.receive(p, w1, 3).unwrap();
        ledger.receive(p, w2, 4).unwrap();

        assert_eq!(ledger.total_quantity(p).unwrap(), 7);
        assert_eq!(ledger.levels_for(p).unwrap().len(), 2);
        assert_eq!(ledger.total_quantity(test_product_id()).unwrap(), 0);
    }

    #[test]
    fn remove_product_refuses_while_stocked() {
        let ledger = StockLedger::new();
        let p = test_product_id();
        let w = test_warehouse_id();
        ledger.receive(p, w, 2).unwrap();

        assert!(matches!(
            ledger.remove_product(p),
            Err(DomainError::Conflict(_))
        ));

        ledger.reserve(p, w, 2).unwrap();
        ledger.remove_product(p).unwrap();
        assert!(matches!(
            ledger.quantity(p, w),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn concurrent_reserves_exhaust_stock_exactly() {
        let ledger = Arc::new(StockLedger::new());
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 5).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.reserve(p, w, 1).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        // Exactly enough reserves succeed to drain the row to zero.
        assert_eq!(successes, 5);
        assert_eq!(ledger.quantity(p, w).unwrap(), 0);
    }

    #[test]
    fn concurrent_mixed_traffic_never_goes_negative() {
        let ledger = Arc::new(StockLedger::new());
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 20).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for _ in 0..50 {
                        if i % 2 == 0 {
                            let _ = ledger.reserve(p, w, 3);
                        } else {
                            let _ = ledger.release(p, w, 2);
                        }
                        assert!(ledger.quantity(p, w).unwrap() >= 0);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(ledger.quantity(p, w).unwrap() >= 0);
    }

    #[test]
    fn contended_row_times_out_with_a_transient_error() {
        let ledger = StockLedger::new();
        let (p, w) = (test_product_id(), test_warehouse_id());
        ledger.receive(p, w, 5).unwrap();

        // Hold the row's mutex so every try_lock attempt fails.
        let slot = ledger.existing_slot(p, w).unwrap();
        let _held = slot.lock().unwrap();

        let err = ledger.reserve(p, w, 1).unwrap_err();
        assert_eq!(err, DomainError::LockTimeout);
        assert!(err.is_transient());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Op {
            Receive(u32),
            Reserve(u32),
            Release(u32),
            Adjust(i64),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1u32..100).prop_map(Op::Receive),
                (1u32..100).prop_map(Op::Reserve),
                (1u32..100).prop_map(Op::Release),
                (-100i64..100).prop_map(Op::Adjust),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of ledger operations can make a row's
            /// quantity observable below zero.
            #[test]
            fn quantity_never_negative(ops in prop::collection::vec(op_strategy(), 1..40)) {
                let ledger = StockLedger::new();
                let (p, w) = (ProductId::generate(), WarehouseId::generate());
                ledger.receive(p, w, 1).unwrap();

                for op in ops {
                    let _ = match op {
                        Op::Receive(q) => ledger.receive(p, w, q),
                        Op::Reserve(q) => ledger.reserve(p, w, q),
                        Op::Release(q) => ledger.release(p, w, q),
                        Op::Adjust(d) => ledger.adjust(p, w, d),
                    };
                    prop_assert!(ledger.quantity(p, w).unwrap() >= 0);
                }
            }

            /// Property: a failing multi-line reservation changes nothing.
            #[test]
            fn failed_reserve_all_is_a_no_op(
                stocked in 0u32..50,
                want_a in 1u32..60,
                want_b in 1u32..60,
            ) {
                let ledger = StockLedger::new();
                let w = WarehouseId::generate();
                let (a, b) = (ProductId::generate(), ProductId::generate());
                ledger.receive(a, w, stocked.max(1)).unwrap();
                ledger.receive(b, w, stocked.max(1)).unwrap();

                let before_a = ledger.quantity(a, w).unwrap();
                let before_b = ledger.quantity(b, w).unwrap();

                let lines = [
                    StockLine { product_id: a, quantity: want_a },
                    StockLine { product_id: b, quantity: want_b },
                ];
                if ledger.reserve_all(w, &lines).is_err() {
                    prop_assert_eq!(ledger.quantity(a, w).unwrap(), before_a);
                    prop_assert_eq!(ledger.quantity(b, w).unwrap(), before_b);
                } else {
                    prop_assert_eq!(
                        ledger.quantity(a, w).unwrap(),
                        before_a - i64::from(want_a)
                    );
                    prop_assert_eq!(
                        ledger.quantity(b, w).unwrap(),
                        before_b - i64::from(want_b)
                    );
                }
            }
        }
    }
}

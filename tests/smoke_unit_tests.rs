//! Smoke Screen Unit tests for stock ledger components
//!
//! These test are unit tests that span the codebase, testing behavior in
//! isolation from the end-to-end scenarios. They are intended as a smoke-screen
//! and generally test the happy-path.

use chrono::{Datelike, NaiveDate, Timelike, Utc};
use stock_ledger::{
    item::{InventoryItem, InventoryState, ItemDescriptor, name_key},
    movement::{InwardDetails, MovementKind, ReturnDetails, StockMovement, TimeStamp},
    persist::{MemoryPort, Persistence, SnapshotPort, SyncState},
    report,
    store::{Action, Dispatched, InventoryStore, reduce},
    utils::new_uuid_to_bech32,
};

fn descriptor(id: &str, name: &str) -> ItemDescriptor {
    ItemDescriptor {
        id: id.into(),
        name: name.into(),
        unit: "pcs".into(),
        purchase_price: 2100.0,
        description: "11 kV porcelain bushing".into(),
        opening_stock_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        reorder_level: 6.0,
    }
}

fn inward(id: &str, quantity: f64) -> StockMovement {
    StockMovement::new(
        id.into(),
        TimeStamp::new(),
        quantity,
        MovementKind::Inward(InwardDetails {
            purchaser_name: "Shah Traders".into(),
            bill_no: "B-7".into(),
            bill_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            purchase_price: 2100.0,
        }),
    )
}

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Test that new_uuid_to_bech32 generates valid bech32-encoded strings
    /// with the correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let encoded = new_uuid_to_bech32("item_").unwrap();
        assert!(encoded.starts_with("item_1"));
        assert!(encoded.len() > 10);
    }

    /// Empty prefixes are not valid bech32
    #[test]
    fn handles_empty_hrp() {
        assert!(new_uuid_to_bech32("").is_err());
    }
}

// MOVEMENT MODULE TESTS
#[cfg(test)]
mod movement_tests {
    use super::*;

    /// Test that TimeStamp::new() creates a timestamp close to current time
    #[test]
    fn timestamp_new_creates_current_time() {
        let ts = TimeStamp::new();
        let diff = (Utc::now() - ts.to_datetime_utc()).num_seconds().abs();
        assert!(diff < 1);
    }

    /// Test that TimeStamp can be created with specific date/time values
    #[test]
    fn timestamp_new_with_creates_specific_time() {
        let dt = TimeStamp::new_with(2024, 6, 15, 10, 30, 0).unwrap().to_datetime_utc();

        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 6);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    /// Impossible dates give None rather than panicking
    #[test]
    fn timestamp_new_with_rejects_invalid_dates() {
        assert!(TimeStamp::new_with(2024, 2, 30, 0, 0, 0).is_none());
    }

    /// Timestamps serialize as RFC 3339 strings
    #[test]
    fn timestamp_json_is_rfc3339() {
        let ts = TimeStamp::new_with(2024, 6, 15, 10, 30, 0).unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-06-15T10:30:00Z\"");
    }
}

// ITEM MODULE TESTS
#[cfg(test)]
mod item_tests {
    use super::*;

    /// Name keys ignore case and surrounding whitespace
    #[test]
    fn name_key_normalises() {
        assert_eq!(name_key("  HT Bushing "), "ht bushing");
    }

    /// Lookup by id and by name
    #[test]
    fn state_lookups() {
        let state = InventoryState::new(vec![InventoryItem::empty(descriptor("b1", "HT Bushing"))]);

        assert!(state.get_by_id("b1").is_some());
        assert!(state.get_by_id("B1").is_none());
        assert_eq!(state.find_by_name("ht bushing").map(|i| i.id.as_str()), Some("b1"));
    }

    /// Snapshot JSON uses camelCase field names
    #[test]
    fn item_json_field_names() {
        let json = serde_json::to_value(InventoryItem::empty(descriptor("b1", "HT Bushing"))).unwrap();

        for field in [
            "id",
            "name",
            "unit",
            "purchasePrice",
            "description",
            "openingStockDate",
            "reorderLevel",
            "currentStock",
            "history",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }
}

// STORE MODULE TESTS
#[cfg(test)]
mod store_tests {
    use super::*;
    use std::sync::Arc;

    /// The reducer hands back a fresh state for a real change
    #[test]
    fn reduce_returns_new_state_on_change() {
        let state = Arc::new(InventoryState::default());
        let next = reduce(
            &state,
            Action::AddInwardEntry {
                item: descriptor("b1", "HT Bushing"),
                movement: inward("m1", 4.0),
            },
        )
        .unwrap();

        assert!(!Arc::ptr_eq(&state, &next));
        assert_eq!(next.items[0].current_stock, 4.0);
    }

    /// Lookups without a dispatch in between agree
    #[test]
    fn get_item_by_id_is_idempotent() {
        let mut store = InventoryStore::load_with_seed(MemoryPort::new(), Vec::new);
        store
            .dispatch(Action::AddInwardEntry {
                item: descriptor("b1", "HT Bushing"),
                movement: inward("m1", 4.0),
            })
            .unwrap();

        let first = store.get_item_by_id("b1").cloned();
        let second = store.get_item_by_id("b1").cloned();
        assert_eq!(first, second);
        assert!(first.is_some());
        assert!(store.get_item_by_id("missing").is_none());
    }

    /// A return against a missing id reports it
    #[test]
    fn return_on_unknown_id_is_reported() {
        let mut store = InventoryStore::load_with_seed(MemoryPort::new(), Vec::new);
        let outcome = store
            .dispatch(Action::AddReturnEntry {
                item_id: "missing".into(),
                movement: StockMovement::new(
                    "m1".into(),
                    TimeStamp::new(),
                    1.0,
                    MovementKind::Return(ReturnDetails {
                        returned_by: "Crew".into(),
                        reason: "Unused".into(),
                    }),
                ),
            })
            .unwrap();

        assert_eq!(
            outcome,
            Dispatched::UnknownItem {
                item_id: "missing".into()
            }
        );
    }

    /// Every applied dispatch is written through to the port
    #[test]
    fn dispatch_saves_every_change() {
        let port = MemoryPort::new();
        let mut store = InventoryStore::load_with_seed(port.clone(), Vec::new);
        store
            .dispatch(Action::AddInwardEntry {
                item: descriptor("b1", "HT Bushing"),
                movement: inward("m1", 4.0),
            })
            .unwrap();

        let saved = port.read().unwrap().unwrap();
        assert_eq!(saved, *store.state());
        assert_eq!(store.sync_state(), SyncState::Synced);
    }
}

// PERSISTENCE MODULE TESTS
#[cfg(test)]
mod persist_tests {
    use super::*;

    /// Loading from an empty port uses whatever seed is supplied
    #[test]
    fn load_uses_supplied_seed() {
        let mut persistence = Persistence::new(MemoryPort::new());
        let state = persistence.load(|| vec![InventoryItem::empty(descriptor("b1", "HT Bushing"))]);

        assert_eq!(state.items.len(), 1);
    }

    /// A snapshot with the wrong shape is treated as unreadable
    #[test]
    fn wrong_shape_is_a_read_error() {
        let port = MemoryPort::with_raw(r#"{"items": [{"id": 7}]}"#);
        assert!(port.read().is_err());
    }
}

// REPORT MODULE TESTS
#[cfg(test)]
mod report_tests {
    use super::*;

    /// Dashboard summary over the seed list
    #[test]
    fn seed_is_all_low_stock() {
        let items = stock_ledger::seed::seed_items();
        let summary = report::summarize(&items);

        assert_eq!(summary.item_types, items.len());
        assert_eq!(summary.low_stock, items.len());
        assert_eq!(summary.units_on_hand, 0.0);
    }
}

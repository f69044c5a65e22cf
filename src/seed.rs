//! Items the ledger starts with when no snapshot has been stored.
use super::item::{InventoryItem, ItemDescriptor};
use chrono::NaiveDate;

fn seed_item(
    id: &str,
    name: &str,
    unit: &str,
    purchase_price: f64,
    description: &str,
    reorder_level: f64,
) -> InventoryItem {
    InventoryItem::empty(ItemDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        purchase_price,
        description: description.to_string(),
        opening_stock_date: opening_date(),
        reorder_level,
    })
}

fn opening_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

pub fn seed_items() -> Vec<InventoryItem> {
    vec![
        seed_item("item-1", "Transformer Oil", "litres", 95.0, "Mineral insulating oil, IS 335", 200.0),
        seed_item("item-2", "Copper Winding Wire", "kg", 780.0, "Enamelled copper, 14 SWG", 50.0),
        seed_item("item-3", "Insulation Paper", "rolls", 1250.0, "Kraft insulation paper", 10.0),
        seed_item("item-4", "HT Bushing", "pcs", 2100.0, "11 kV porcelain bushing", 6.0),
        seed_item("item-5", "Cement", "bags", 350.0, "OPC 53 grade", 20.0),
    ]
}

use super::movement::StockMovement;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a caller knows about an item when it first arrives. Only used when
/// the name is new; for a known name the existing record wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub purchase_price: f64,
    pub description: String,
    pub opening_stock_date: NaiveDate,
    pub reorder_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub purchase_price: f64,
    pub description: String,
    pub opening_stock_date: NaiveDate,
    pub reorder_level: f64,
    pub current_stock: f64,
    pub history: Vec<StockMovement>, // newest first
}

/// The whole persisted state: `{ "items": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    pub items: Vec<InventoryItem>,
}

/// Key used for case-insensitive item identity.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl InventoryItem {
    /// An item with no stock and no history, as found in the seed list.
    pub fn empty(descriptor: ItemDescriptor) -> Self {
        let ItemDescriptor {
            id,
            name,
            unit,
            purchase_price,
            description,
            opening_stock_date,
            reorder_level,
        } = descriptor;

        Self {
            id,
            name: name.trim().to_string(),
            unit,
            purchase_price,
            description,
            opening_stock_date,
            reorder_level,
            current_stock: 0.0,
            history: vec![],
        }
    }
    /// A new item whose only history is the movement that introduced it.
    pub fn from_first_movement(descriptor: ItemDescriptor, movement: StockMovement) -> Self {
        let mut item = Self::empty(descriptor);
        item.record(movement);
        item
    }
    /// Prepends the movement and moves the balance in its direction.
    pub fn record(&mut self, movement: StockMovement) {
        self.current_stock += movement.signed_quantity();
        self.history.insert(0, movement);
    }
    pub fn matches_name(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.reorder_level
    }
    /// Balance derived from history alone, oldest movement first.
    pub fn recomputed_stock(&self) -> f64 {
        self.history
            .iter()
            .rev()
            .map(StockMovement::signed_quantity)
            .sum()
    }
}

impl InventoryState {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }
    pub fn get_by_id(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }
    pub fn find_by_name(&self, name: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.matches_name(name))
    }
    pub(crate) fn position_by_id(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
    pub(crate) fn position_by_name(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.matches_name(name))
    }
}

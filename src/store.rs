//! The inventory store: a pure reducer over the item list, plus the owner
//! that swaps in each new state and hands it to persistence.
use super::error::StoreError;
use super::item::{InventoryItem, InventoryState, ItemDescriptor};
use super::movement::{MovementKind, StockMovement};
use super::persist::{Persistence, SnapshotPort, SyncState};
use super::seed::seed_items;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Adds stock by name, creating the item if the name is new.
    AddInwardEntry {
        item: ItemDescriptor,
        movement: StockMovement,
    },
    /// Issues stock from an existing item.
    AddOutwardEntry {
        item_id: String,
        movement: StockMovement,
    },
    /// Takes previously issued stock back into an existing item.
    AddReturnEntry {
        item_id: String,
        movement: StockMovement,
    },
}

fn check_amount(field: &str, value: f64) -> Result<(), StoreError> {
    // serde_json writes NaN and infinity as null, which would not load again
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::InvalidArgument(format!(
            "{field} must be a finite, non-negative number, got {value}"
        )));
    }
    Ok(())
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::AddInwardEntry { .. } => "ADD_INWARD_ENTRY",
            Action::AddOutwardEntry { .. } => "ADD_OUTWARD_ENTRY",
            Action::AddReturnEntry { .. } => "ADD_RETURN_ENTRY",
        }
    }
    pub fn movement(&self) -> &StockMovement {
        match self {
            Action::AddInwardEntry { movement, .. }
            | Action::AddOutwardEntry { movement, .. }
            | Action::AddReturnEntry { movement, .. } => movement,
        }
    }
    fn kind_matches(&self) -> bool {
        matches!(
            (self, &self.movement().kind),
            (Action::AddInwardEntry { .. }, MovementKind::Inward(_))
                | (Action::AddOutwardEntry { .. }, MovementKind::Outward(_))
                | (Action::AddReturnEntry { .. }, MovementKind::Return(_))
        )
    }
    fn validate(&self) -> Result<(), StoreError> {
        let movement = self.movement();

        if !movement.quantity.is_finite() || movement.quantity <= 0.0 {
            return Err(StoreError::InvalidArgument(format!(
                "quantity must be a positive number, got {}",
                movement.quantity
            )));
        }
        if movement.id.is_empty() {
            return Err(StoreError::InvalidArgument("movement id is empty".into()));
        }
        if !self.kind_matches() {
            return Err(StoreError::InvalidArgument(format!(
                "{} got a movement of type '{}'",
                self.label(),
                movement.kind.label()
            )));
        }

        match self {
            Action::AddInwardEntry { item, .. } => {
                if item.name.trim().is_empty() {
                    return Err(StoreError::InvalidArgument("item name is empty".into()));
                }
                if item.id.is_empty() {
                    return Err(StoreError::InvalidArgument("item id is empty".into()));
                }
                check_amount("purchase price", item.purchase_price)?;
                check_amount("reorder level", item.reorder_level)?;
                if let MovementKind::Inward(details) = &movement.kind {
                    check_amount("bill purchase price", details.purchase_price)?;
                }
            }
            Action::AddOutwardEntry { item_id, .. } | Action::AddReturnEntry { item_id, .. } => {
                if item_id.is_empty() {
                    return Err(StoreError::InvalidArgument("item id is empty".into()));
                }
            }
        }
        Ok(())
    }
}

/// Applies one action and returns the next state. When nothing changes
/// (an id that matches no item) the same `Arc` comes back.
pub fn reduce(
    state: &Arc<InventoryState>,
    action: Action,
) -> Result<Arc<InventoryState>, StoreError> {
    Ok(match apply(state, action)? {
        Some((next, _)) => Arc::new(next),
        None => Arc::clone(state),
    })
}

// The changed state plus the index of the item that moved, or `None` when
// the action addressed no item.
fn apply(
    state: &InventoryState,
    action: Action,
) -> Result<Option<(InventoryState, usize)>, StoreError> {
    action.validate()?;

    match action {
        Action::AddInwardEntry { item, movement } => {
            let mut next = state.clone();
            let idx = match next.position_by_name(&item.name) {
                // only stock and history move, the stored item keeps its fields
                Some(idx) => {
                    next.items[idx].record(movement);
                    idx
                }
                None => {
                    if let Some(owner) = next.get_by_id(&item.id) {
                        return Err(StoreError::InvalidArgument(format!(
                            "item id '{}' already belongs to '{}'",
                            item.id, owner.name
                        )));
                    }
                    next.items.push(InventoryItem::from_first_movement(item, movement));
                    next.items.len() - 1
                }
            };
            Ok(Some((next, idx)))
        }
        Action::AddOutwardEntry { item_id, movement }
        | Action::AddReturnEntry { item_id, movement } => {
            let Some(idx) = state.position_by_id(&item_id) else {
                return Ok(None);
            };
            let mut next = state.clone();
            next.items[idx].record(movement);
            Ok(Some((next, idx)))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Applied { item_id: String, current_stock: f64 },
    /// No item had this id; state and storage are untouched.
    UnknownItem { item_id: String },
}

pub struct InventoryStore<P: SnapshotPort> {
    state: Arc<InventoryState>,
    persistence: Persistence<P>,
}

impl<P: SnapshotPort> InventoryStore<P> {
    /// Load from `port`, seeding the built-in item list if nothing usable is stored.
    pub fn load(port: P) -> Self {
        Self::load_with_seed(port, seed_items)
    }

    pub fn load_with_seed(port: P, seed: impl FnOnce() -> Vec<InventoryItem>) -> Self {
        let mut persistence = Persistence::new(port);
        let state = persistence.load(seed);
        Self {
            state: Arc::new(state),
            persistence,
        }
    }

    /// Apply an action, then save the whole state if it changed.
    pub fn dispatch(&mut self, action: Action) -> Result<Dispatched, StoreError> {
        let label = action.label();
        // only outward and return address an item by id, so only they can miss
        let addressed_id = match &action {
            Action::AddInwardEntry { item, .. } => item.id.clone(),
            Action::AddOutwardEntry { item_id, .. } | Action::AddReturnEntry { item_id, .. } => {
                item_id.clone()
            }
        };

        let Some((next, idx)) = apply(&self.state, action)? else {
            let item_id = addressed_id;
            warn!(action = label, item_id = %item_id, "no item with this id, action ignored");
            return Ok(Dispatched::UnknownItem { item_id });
        };

        let item = &next.items[idx];
        let (item_id, current_stock) = (item.id.clone(), item.current_stock);

        self.state = Arc::new(next);
        self.persistence.save(&self.state);

        debug!(action = label, item_id = %item_id, current_stock, "applied stock movement");
        Ok(Dispatched::Applied {
            item_id,
            current_stock,
        })
    }

    pub fn get_item_by_id(&self, id: &str) -> Option<&InventoryItem> {
        self.state.get_by_id(id)
    }
    pub fn find_item_by_name(&self, name: &str) -> Option<&InventoryItem> {
        self.state.find_by_name(name)
    }
    pub fn items(&self) -> &[InventoryItem] {
        &self.state.items
    }
    /// A handle on the current state value. A later dispatch replaces the
    /// store's state but leaves this one as it was.
    pub fn state(&self) -> Arc<InventoryState> {
        Arc::clone(&self.state)
    }
    pub fn sync_state(&self) -> SyncState {
        self.persistence.sync_state()
    }
    pub fn failed_saves(&self) -> u64 {
        self.persistence.failed_saves()
    }
    pub fn into_port(self) -> P {
        self.persistence.into_port()
    }
}

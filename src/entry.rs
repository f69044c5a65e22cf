//! Form-side builders for stock entries.
//!
//! These sit in front of the store and do the checks a shopkeeper's form
//! would: a name is present, the quantity parses to something positive, an
//! issue doesn't exceed what is on the shelf. A finished builder yields an
//! [`Action`] ready for dispatch.
use super::error::EntryError;
use super::item::{InventoryItem, InventoryState, ItemDescriptor};
use super::movement::{InwardDetails, MovementKind, OutwardDetails, ReturnDetails, StockMovement, TimeStamp};
use super::store::Action;
use super::utils::{new_item_id, new_movement_id};
use chrono::{NaiveDate, Utc};

fn checked_quantity(quantity: Option<f64>) -> Result<f64, EntryError> {
    match quantity {
        Some(q) if q.is_finite() && q > 0.0 => Ok(q),
        other => Err(EntryError::InvalidQuantity(other)),
    }
}

fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn existing_item<'a>(state: &'a InventoryState, item_id: &str) -> Result<&'a InventoryItem, EntryError> {
    state
        .get_by_id(item_id)
        .ok_or_else(|| EntryError::UnknownItem(item_id.to_string()))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// Purchase of stock, new or existing item
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InwardEntry {
    name: String,
    unit: String,
    purchase_price: f64,
    description: String,
    opening_stock_date: Option<NaiveDate>,
    reorder_level: f64,
    purchaser_name: String,
    bill_no: String,
    bill_date: Option<NaiveDate>,
    quantity: Option<f64>,
    date: Option<TimeStamp>,
}

impl InwardEntry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = name.trim().to_string();
        self
    }
    pub fn set_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }
    pub fn set_purchase_price(mut self, price: f64) -> Self {
        self.purchase_price = price;
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn set_opening_stock_date(mut self, date: NaiveDate) -> Self {
        self.opening_stock_date = Some(date);
        self
    }
    pub fn set_reorder_level(mut self, level: f64) -> Self {
        self.reorder_level = level;
        self
    }
    pub fn set_purchaser_name(mut self, purchaser: &str) -> Self {
        self.purchaser_name = purchaser.to_string();
        self
    }
    pub fn set_bill_no(mut self, bill_no: &str) -> Self {
        self.bill_no = bill_no.to_string();
        self
    }
    pub fn set_bill_date(mut self, date: NaiveDate) -> Self {
        self.bill_date = Some(date);
        self
    }
    pub fn set_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }
    pub fn set_date(mut self, date: TimeStamp) -> Self {
        self.date = Some(date);
        self
    }
    /// Checks the form and builds the action. A name that already exists
    /// (ignoring case) reuses that item's id.
    pub fn validate_and_finalise(&self, state: &InventoryState) -> anyhow::Result<Action> {
        let quantity = checked_quantity(self.quantity)?;
        if self.name.is_empty() {
            return Err(EntryError::MissingName.into());
        }
        if !is_amount(self.purchase_price) {
            return Err(EntryError::InvalidPrice(self.purchase_price).into());
        }
        if !is_amount(self.reorder_level) {
            return Err(EntryError::InvalidReorderLevel(self.reorder_level).into());
        }

        let id = match state.find_by_name(&self.name) {
            Some(item) => item.id.clone(),
            None => new_item_id()?,
        };

        let item = ItemDescriptor {
            id,
            name: self.name.clone(),
            unit: self.unit.clone(),
            purchase_price: self.purchase_price,
            description: self.description.clone(),
            opening_stock_date: self.opening_stock_date.unwrap_or_else(today),
            reorder_level: self.reorder_level,
        };
        let movement = StockMovement::new(
            new_movement_id()?,
            self.date.clone().unwrap_or_default(),
            quantity,
            MovementKind::Inward(InwardDetails {
                purchaser_name: self.purchaser_name.clone(),
                bill_no: self.bill_no.clone(),
                bill_date: self.bill_date.unwrap_or_else(today),
                purchase_price: self.purchase_price,
            }),
        );

        Ok(Action::AddInwardEntry { item, movement })
    }
}

// Issue of stock to a site or agency
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutwardEntry {
    item_id: String,
    quantity: Option<f64>,
    given_to: String,
    site_name: String,
    tender_no: Option<String>,
    date: Option<TimeStamp>,
}

impl OutwardEntry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_item_id(mut self, item_id: &str) -> Self {
        self.item_id = item_id.to_string();
        self
    }
    pub fn set_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }
    pub fn set_given_to(mut self, given_to: &str) -> Self {
        self.given_to = given_to.to_string();
        self
    }
    pub fn set_site_name(mut self, site_name: &str) -> Self {
        self.site_name = site_name.to_string();
        self
    }
    pub fn set_tender_no(mut self, tender_no: &str) -> Self {
        // a blank tender number on the form means there isn't one
        self.tender_no = Some(tender_no.trim().to_string()).filter(|t| !t.is_empty());
        self
    }
    pub fn set_date(mut self, date: TimeStamp) -> Self {
        self.date = Some(date);
        self
    }
    pub fn validate_and_finalise(&self, state: &InventoryState) -> anyhow::Result<Action> {
        let item = existing_item(state, &self.item_id)?;
        let quantity = checked_quantity(self.quantity)?;

        if quantity > item.current_stock {
            return Err(EntryError::InsufficientStock {
                requested: quantity,
                available: item.current_stock,
                unit: item.unit.clone(),
            }
            .into());
        }

        let movement = StockMovement::new(
            new_movement_id()?,
            self.date.clone().unwrap_or_default(),
            quantity,
            MovementKind::Outward(OutwardDetails {
                given_to: self.given_to.clone(),
                site_name: self.site_name.clone(),
                tender_no: self.tender_no.clone(),
            }),
        );

        Ok(Action::AddOutwardEntry {
            item_id: item.id.clone(),
            movement,
        })
    }
}

// Stock coming back from a site
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReturnEntry {
    item_id: String,
    quantity: Option<f64>,
    returned_by: String,
    reason: String,
    date: Option<TimeStamp>,
}

impl ReturnEntry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_item_id(mut self, item_id: &str) -> Self {
        self.item_id = item_id.to_string();
        self
    }
    pub fn set_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }
    pub fn set_returned_by(mut self, returned_by: &str) -> Self {
        self.returned_by = returned_by.to_string();
        self
    }
    pub fn set_reason(mut self, reason: &str) -> Self {
        self.reason = reason.to_string();
        self
    }
    pub fn set_date(mut self, date: TimeStamp) -> Self {
        self.date = Some(date);
        self
    }
    pub fn validate_and_finalise(&self, state: &InventoryState) -> anyhow::Result<Action> {
        let item = existing_item(state, &self.item_id)?;
        let quantity = checked_quantity(self.quantity)?;

        let movement = StockMovement::new(
            new_movement_id()?,
            self.date.clone().unwrap_or_default(),
            quantity,
            MovementKind::Return(ReturnDetails {
                returned_by: self.returned_by.clone(),
                reason: self.reason.clone(),
            }),
        );

        Ok(Action::AddReturnEntry {
            item_id: item.id.clone(),
            movement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked_state() -> InventoryState {
        let item = InventoryItem::from_first_movement(
            ItemDescriptor {
                id: "item-cement".into(),
                name: "Cement".into(),
                unit: "bags".into(),
                purchase_price: 350.0,
                description: "OPC 53 grade".into(),
                opening_stock_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                reorder_level: 20.0,
            },
            StockMovement::new(
                "mov-1".into(),
                TimeStamp::new(),
                100.0,
                MovementKind::Inward(InwardDetails {
                    purchaser_name: "Shah Traders".into(),
                    bill_no: "B-1".into(),
                    bill_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    purchase_price: 350.0,
                }),
            ),
        );
        InventoryState::new(vec![item])
    }

    fn entry_error(err: anyhow::Error) -> EntryError {
        err.downcast::<EntryError>().unwrap()
    }

    #[test]
    fn inward_for_known_name_reuses_id() {
        let action = InwardEntry::new()
            .set_name("  cement ")
            .set_quantity(50.0)
            .validate_and_finalise(&stocked_state())
            .unwrap();

        match action {
            Action::AddInwardEntry { item, movement } => {
                assert_eq!(item.id, "item-cement");
                assert_eq!(item.name, "cement");
                assert_eq!(movement.quantity, 50.0);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn inward_for_new_name_generates_id() {
        let action = InwardEntry::new()
            .set_name("Transformer Oil")
            .set_unit("litres")
            .set_purchase_price(95.0)
            .set_quantity(200.0)
            .validate_and_finalise(&stocked_state())
            .unwrap();

        let Action::AddInwardEntry { item, movement } = action else {
            panic!("expected an inward action");
        };
        assert!(item.id.starts_with("item_1"));
        assert!(movement.id.starts_with("mov_1"));
        match movement.kind {
            MovementKind::Inward(details) => assert_eq!(details.purchase_price, 95.0),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn inward_requires_name_and_quantity() {
        let state = stocked_state();

        let err = InwardEntry::new().set_name("Cement").validate_and_finalise(&state).unwrap_err();
        assert_eq!(entry_error(err), EntryError::InvalidQuantity(None));

        let err = InwardEntry::new().set_name("   ").set_quantity(1.0).validate_and_finalise(&state).unwrap_err();
        assert_eq!(entry_error(err), EntryError::MissingName);

        let err = InwardEntry::new().set_name("Cement").set_quantity(-2.0).validate_and_finalise(&state).unwrap_err();
        assert_eq!(entry_error(err), EntryError::InvalidQuantity(Some(-2.0)));
    }

    #[test]
    fn inward_rejects_prices_and_levels_that_cannot_be_stored() {
        let state = stocked_state();
        let entry = || InwardEntry::new().set_name("Transformer Oil").set_quantity(5.0);

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.5] {
            let err = entry().set_purchase_price(bad).validate_and_finalise(&state).unwrap_err();
            assert!(matches!(entry_error(err), EntryError::InvalidPrice(_)));

            let err = entry().set_reorder_level(bad).validate_and_finalise(&state).unwrap_err();
            assert!(matches!(entry_error(err), EntryError::InvalidReorderLevel(_)));
        }

        // free stock and no reorder threshold are both fine
        assert!(entry().validate_and_finalise(&state).is_ok());
    }

    #[test]
    fn outward_cannot_exceed_stock() {
        let err = OutwardEntry::new()
            .set_item_id("item-cement")
            .set_quantity(101.0)
            .validate_and_finalise(&stocked_state())
            .unwrap_err();

        assert_eq!(
            entry_error(err),
            EntryError::InsufficientStock {
                requested: 101.0,
                available: 100.0,
                unit: "bags".into()
            }
        );
    }

    #[test]
    fn outward_blank_tender_is_none() {
        let action = OutwardEntry::new()
            .set_item_id("item-cement")
            .set_quantity(100.0)
            .set_given_to("PWD")
            .set_site_name("Ward 4")
            .set_tender_no("  ")
            .validate_and_finalise(&stocked_state())
            .unwrap();

        let Action::AddOutwardEntry { item_id, movement } = action else {
            panic!("expected an outward action");
        };
        assert_eq!(item_id, "item-cement");
        assert_eq!(
            movement.kind,
            MovementKind::Outward(OutwardDetails {
                given_to: "PWD".into(),
                site_name: "Ward 4".into(),
                tender_no: None,
            })
        );
    }

    #[test]
    fn return_needs_a_known_item() {
        let err = ReturnEntry::new()
            .set_item_id("nope")
            .set_quantity(1.0)
            .validate_and_finalise(&stocked_state())
            .unwrap_err();

        assert_eq!(entry_error(err), EntryError::UnknownItem("nope".into()));
    }
}

//! Stock movements and their type-dependent details
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStamp(DateTime<Utc>);

impl TimeStamp {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    /// Returns `None` when the fields don't name a single valid UTC instant.
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DateTime<Utc>> for TimeStamp {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InwardDetails {
    pub purchaser_name: String,
    pub bill_no: String,
    pub bill_date: NaiveDate,
    pub purchase_price: f64, // price paid per unit on this bill
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutwardDetails {
    pub given_to: String, // recipient or agency
    pub site_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tender_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDetails {
    pub returned_by: String,
    pub reason: String,
}

/// The movement type and its payload. Serialized as the `type` and `details`
/// fields of the enclosing movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "lowercase")]
pub enum MovementKind {
    Inward(InwardDetails),
    Outward(OutwardDetails),
    Return(ReturnDetails),
}

impl MovementKind {
    pub fn label(&self) -> &'static str {
        match self {
            MovementKind::Inward(_) => "inward",
            MovementKind::Outward(_) => "outward",
            MovementKind::Return(_) => "return",
        }
    }
    /// Inward and return movements add to stock, outward movements remove it.
    pub fn is_inbound(&self) -> bool {
        !matches!(self, MovementKind::Outward(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub date: TimeStamp,
    pub quantity: f64, // always a magnitude, direction comes from `kind`
    #[serde(flatten)]
    pub kind: MovementKind,
}

impl StockMovement {
    pub fn new(id: String, date: TimeStamp, quantity: f64, kind: MovementKind) -> Self {
        Self {
            id,
            date,
            quantity,
            kind,
        }
    }
    pub fn signed_quantity(&self) -> f64 {
        if self.kind.is_inbound() {
            self.quantity
        } else {
            -self.quantity
        }
    }
}

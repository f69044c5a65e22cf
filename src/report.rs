//! Read-only queries over the item list for listing, dashboard and history views
use super::item::InventoryItem;
use super::movement::{MovementKind, StockMovement};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};

pub fn low_stock(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    items.iter().filter(|item| item.is_low_stock()).collect()
}

/// Items that can be issued from right now.
pub fn in_stock(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    items.iter().filter(|item| item.current_stock > 0.0).collect()
}

/// Case-insensitive substring search over name and description.
pub fn search<'a>(items: &'a [InventoryItem], needle: &str) -> Vec<&'a InventoryItem> {
    let needle = needle.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            needle.is_empty()
                || item.name.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Quantity-weighted mean of the prices paid on inward bills. Falls back to
/// the item's recorded price when nothing has come in yet.
pub fn average_purchase_price(item: &InventoryItem) -> f64 {
    let (value, quantity) = item
        .history
        .iter()
        .filter_map(|movement| match &movement.kind {
            MovementKind::Inward(details) => {
                Some((movement.quantity * details.purchase_price, movement.quantity))
            }
            _ => None,
        })
        .fold((0.0, 0.0), |(v, q), (mv, mq)| (v + mv, q + mq));

    if quantity > 0.0 {
        value / quantity
    } else {
        item.purchase_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Monthly,
    Quarterly,
    Yearly,
    /// Both dates inclusive.
    Custom { from: NaiveDate, to: NaiveDate },
}

impl ReportPeriod {
    /// Half-open `[start, end)` window in UTC.
    pub fn range(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let months_back = |months| {
            now.checked_sub_months(Months::new(months))
                .map(|start| (start, now))
        };
        match self {
            ReportPeriod::Monthly => months_back(1),
            ReportPeriod::Quarterly => months_back(3),
            ReportPeriod::Yearly => months_back(12),
            ReportPeriod::Custom { from, to } => {
                let start = from.and_hms_opt(0, 0, 0)?.and_utc();
                let end = to.checked_add_days(Days::new(1))?.and_hms_opt(0, 0, 0)?.and_utc();
                Some((start, end))
            }
        }
    }
}

/// Movements inside the period, newest first. A period that can't be
/// resolved yields the full history.
pub fn history_in_period(
    item: &InventoryItem,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Vec<&StockMovement> {
    let Some((start, end)) = period.range(now) else {
        return item.history.iter().collect();
    };
    item.history
        .iter()
        .filter(|movement| {
            let at = movement.date.to_datetime_utc();
            at >= start && at < end
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventorySummary {
    pub item_types: usize,
    pub low_stock: usize,
    pub units_on_hand: f64,
}

pub fn summarize(items: &[InventoryItem]) -> InventorySummary {
    InventorySummary {
        item_types: items.len(),
        low_stock: low_stock(items).len(),
        units_on_hand: items.iter().map(|item| item.current_stock).sum(),
    }
}

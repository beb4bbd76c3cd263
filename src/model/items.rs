//! # Line Item Collection Editor
//!
//! CRUD and reorder over the ordered line-item sequence. Every operation
//! returns a new `Vec` (the model is copy-on-write throughout) and keeps
//! the stored `total` consistent with `quantity * unit_price`.
//!
//! Unknown ids are a normal, race-free path — ids are client-generated and
//! stable, so a miss means the row was already removed; the operation is a
//! silent no-op rather than an error.

use super::LineItem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_ITEM: AtomicU64 = AtomicU64::new(1);

/// A freshly generated item id: locally unique, not globally unique, not
/// security-sensitive. Ids are only compared for equality within one
/// in-memory collection.
pub fn generate_id() -> String {
    let n = NEXT_ITEM.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("li-{:x}-{:x}", nanos, n)
}

/// The editable fields of a line item. Numeric variants carry the value
/// already coerced at the input boundary (see [`coerce_number`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Description(String),
    Quantity(f64),
    UnitPrice(f64),
}

/// Coerce raw numeric input to an always-valid quantity/price: anything
/// non-finite or negative becomes 0. The editor never rejects a keystroke.
pub fn coerce_number(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse numeric text from an input field, coercing garbage to 0.
pub fn parse_number(text: &str) -> f64 {
    coerce_number(text.trim().parse::<f64>().unwrap_or(0.0))
}

/// Append a new empty item: quantity 1, price 0, total 0.
pub fn add(items: &[LineItem]) -> Vec<LineItem> {
    let mut next = items.to_vec();
    next.push(LineItem {
        id: generate_id(),
        description: String::new(),
        quantity: 1.0,
        unit_price: 0.0,
        total: 0.0,
    });
    next
}

/// Replace one field of the item matching `id`.
///
/// Quantity and unit-price updates recompute `total` from the new value
/// for the changed field and the existing value for the other. No-op when
/// the id is absent.
pub fn update(items: &[LineItem], id: &str, field: ItemField) -> Vec<LineItem> {
    items
        .iter()
        .map(|item| {
            if item.id != id {
                return item.clone();
            }
            let mut updated = item.clone();
            match &field {
                ItemField::Description(text) => updated.description = text.clone(),
                ItemField::Quantity(q) => {
                    updated.quantity = coerce_number(*q);
                    updated.total = updated.quantity * item.unit_price;
                }
                ItemField::UnitPrice(p) => {
                    updated.unit_price = coerce_number(*p);
                    updated.total = item.quantity * updated.unit_price;
                }
            }
            updated
        })
        .collect()
}

/// Remove the item matching `id`. No-op when absent.
pub fn remove(items: &[LineItem], id: &str) -> Vec<LineItem> {
    items.iter().filter(|item| item.id != id).cloned().collect()
}

/// Move the item `from_id` to the position currently occupied by `to_id`,
/// shifting the items in between. A stable array move: no ids change, and
/// every other relative order is preserved. Drag gestures and keyboard
/// move commands both funnel into this one operation.
pub fn reorder(items: &[LineItem], from_id: &str, to_id: &str) -> Vec<LineItem> {
    let from = items.iter().position(|i| i.id == from_id);
    let to = items.iter().position(|i| i.id == to_id);
    let (from, to) = match (from, to) {
        (Some(f), Some(t)) if f != t => (f, t),
        _ => return items.to_vec(),
    };
    let mut next = items.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    next
}

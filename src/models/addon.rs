//! Add-on (meals, beverages, extras) line items

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOnCategory {
    Meal,
    Beverage,
    Snack,
    Other,
}

/// One itemized add-on charge on a booking.
/// A booking carries at most one line per `item_id`; re-selecting an item
/// replaces its line (enforced by the form reducer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnLine {
    pub item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub category: AddOnCategory,
}

impl AddOnLine {
    pub fn total(&self) -> f64 {
        if self.unit_price.is_finite() {
            self.unit_price * f64::from(self.quantity)
        } else {
            0.0
        }
    }
}

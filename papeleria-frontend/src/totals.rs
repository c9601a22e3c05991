use serde::Serialize;

use crate::cart::LineItem;

/// IVA, fixed at 15%.
pub const IVA_RATE: f64 = 0.15;

/// Subtotal, tax and total of a list of lines. Values keep full precision; round only when
/// displaying.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    pub fn from_items(items: &[LineItem]) -> Self {
        let subtotal: f64 = items.iter().map(LineItem::subtotal).sum();
        let tax = subtotal * IVA_RATE;
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    pub fn display(&self) -> DisplayTotals {
        DisplayTotals {
            subtotal: money(self.subtotal),
            tax: money(self.tax),
            total: money(self.total),
        }
    }
}

/// Totals formatted for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DisplayTotals {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

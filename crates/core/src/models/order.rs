use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::CatalogItem;

/// Round a currency amount to cents (midpoint away from zero).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a currency amount for display, e.g. `format_money(5.5, "$") == "$5.50"`.
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{:.2}", round_money(amount))
}

/// One basket entry resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: CatalogItem,
    pub quantity: u32,
    /// `quantity × item.price`, unrounded
    pub line_total: Decimal,
}

impl OrderLine {
    pub fn new(item: CatalogItem, quantity: u32) -> Self {
        let line_total = item.price * Decimal::from(quantity);
        Self {
            item,
            quantity,
            line_total,
        }
    }
}

/// Result of pricing a basket against a catalog snapshot.
///
/// All amounts are unrounded; use [`round_money`] / [`format_money`] at
/// display time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Resolved lines in basket insertion order
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Sum of quantities over resolved lines
    pub item_count: u64,
    /// Basket ids with no matching catalog item; left out of every aggregate
    pub excluded: Vec<String>,
}

impl Totals {
    /// True when at least one line resolved against the catalog.
    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Immutable record of a simulated checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub item_count: u64,
}

impl OrderSummary {
    /// Snapshot the given totals, rounding the aggregates to cents.
    pub fn from_totals(totals: &Totals) -> Self {
        Self {
            id: Uuid::new_v4(),
            placed_at: Utc::now(),
            lines: totals.lines.clone(),
            subtotal: round_money(totals.subtotal),
            tax: round_money(totals.tax),
            total: round_money(totals.total),
            item_count: totals.item_count,
        }
    }
}

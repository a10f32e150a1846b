use serde::{Deserialize, Serialize};

use super::order::{format_money, OrderLine};

/// Top-level screen the storefront is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Waiting for the first auth state notification
    #[default]
    Loading,
    Login,
    Register,
    /// Catalog and basket panels
    Menu,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Loading => write!(f, "loading"),
            View::Login => write!(f, "login"),
            View::Register => write!(f, "register"),
            View::Menu => write!(f, "menu"),
        }
    }
}

/// Message shown when the catalog has no items.
pub const EMPTY_CATALOG_MESSAGE: &str = "No items available yet.";

/// Message shown when the basket has no priced lines.
pub const EMPTY_BASKET_MESSAGE: &str = "Your basket is empty. Add some flair!";

/// One catalog entry as the menu panel displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    /// Formatted unit price, e.g. "$5.50"
    pub price: String,
    /// Quantity badge from the basket
    pub quantity: u32,
    /// The "-" control is disabled at zero
    pub can_decrement: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
    pub category: String,
    pub rows: Vec<CatalogRow>,
}

/// View model for the catalog (menu) panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogView {
    pub sections: Vec<CatalogSection>,
    /// Set when there is nothing to list
    pub empty_message: Option<String>,
}

impl CatalogView {
    /// Quantity badge for an item, if the item is listed.
    pub fn quantity_of(&self, item_id: &str) -> Option<u32> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .find(|r| r.id == item_id)
            .map(|r| r.quantity)
    }
}

/// Quantity badge of one catalog row, redrawn on every basket change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBadge {
    pub id: String,
    pub quantity: u32,
    pub can_decrement: bool,
}

impl QuantityBadge {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
            can_decrement: quantity > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLineView {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub quantity: u32,
    /// e.g. "2 x $5.50"
    pub unit_label: String,
    /// e.g. "$11.00"
    pub line_total: String,
}

impl BasketLineView {
    pub fn from_line(line: &OrderLine, currency_symbol: &str) -> Self {
        Self {
            id: line.item.id.clone(),
            name: line.item.name.clone(),
            emoji: line.item.emoji.clone(),
            quantity: line.quantity,
            unit_label: format!(
                "{} x {}",
                line.quantity,
                format_money(line.item.price, currency_symbol)
            ),
            line_total: format_money(line.line_total, currency_symbol),
        }
    }
}

/// View model for the basket panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketView {
    pub lines: Vec<BasketLineView>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    /// Whether the "Place Order" control is enabled
    pub checkout_enabled: bool,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// A dialog-style message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category shown for items that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A purchasable product as published by the catalog data source.
///
/// Items are never mutated client-side; the whole set is replaced on every
/// snapshot the data source pushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Document id, unique within the catalog (e.g., "1")
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Grouping key for the menu (e.g., "Brewed", "Pastry")
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub emoji: String,

    /// Unit price. Stored as a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        description: impl Into<String>,
        category: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            emoji: emoji.into(),
            price,
        }
    }

    /// Category used for display grouping; blank categories fall under "Other".
    pub fn display_category(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            DEFAULT_CATEGORY
        } else {
            trimmed
        }
    }
}

/// The menu written to an empty catalog collection on first run.
pub fn default_menu() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(
            "1",
            "Coffee: Lavender",
            Decimal::new(550, 2),
            "Earthy, floral, and caffeinated.",
            "Brewed",
            "☕",
        ),
        CatalogItem::new(
            "2",
            "Matcha Latte",
            Decimal::new(600, 2),
            "Bright green goodness with oat milk.",
            "Specialty",
            "🍵",
        ),
        CatalogItem::new(
            "3",
            "Caramel Macchiato",
            Decimal::new(650, 2),
            "Layers of espresso, milk, and sweet caramel.",
            "Specialty",
            "🍮",
        ),
        CatalogItem::new(
            "4",
            "Chai Spiced Donut",
            Decimal::new(350, 2),
            "Soft donut with a spicy glaze.",
            "Pastry",
            "🍩",
        ),
        CatalogItem::new(
            "5",
            "Avocado Toast",
            Decimal::new(900, 2),
            "Sourdough, smashed avocado, chili flakes.",
            "Food",
            "🥑",
        ),
        CatalogItem::new(
            "6",
            "Chocolate Chip Cookie",
            Decimal::new(275, 2),
            "Classic, chewy, and warm.",
            "Pastry",
            "🍪",
        ),
    ]
}

/// In-memory snapshot of the catalog as last pushed by the data source.
///
/// Replaced wholesale on each update (no merging). Iteration order is the
/// order the data source delivered, which keeps category grouping stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogCache {
    items: Vec<CatalogItem>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Overwrite the whole snapshot.
    pub fn replace(&mut self, items: Vec<CatalogItem>) {
        self.items = items;
    }

    pub fn current(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn lookup(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Group items by display category.
    /// Categories appear in order of first occurrence; items keep catalog order.
    pub fn grouped(&self) -> Vec<(String, Vec<&CatalogItem>)> {
        let mut groups: Vec<(String, Vec<&CatalogItem>)> = Vec::new();
        for item in &self.items {
            let category = item.display_category();
            match groups.iter_mut().find(|(name, _)| name == category) {
                Some((_, members)) => members.push(item),
                None => groups.push((category.to_string(), vec![item])),
            }
        }
        groups
    }
}

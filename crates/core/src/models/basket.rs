use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The in-progress selection: catalog item id → quantity.
///
/// Invariant: every stored quantity is strictly positive. An adjustment that
/// brings a quantity to zero removes the entry. Iteration follows insertion
/// order, which is the order lines are priced and displayed in.
///
/// Not meant for concurrent mutation; a session owns its basket exclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    entries: IndexMap<String, u32>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `delta` to the quantity of `item_id` and return the new quantity.
    ///
    /// The result is clamped at zero (and saturates at `u32::MAX`); a zero
    /// result removes the entry. Whether the id exists in the catalog is not
    /// checked here.
    pub fn adjust(&mut self, item_id: &str, delta: i64) -> Result<u32, CoreError> {
        if item_id.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "Item id must not be empty".into(),
            ));
        }

        let current = i64::from(self.quantity(item_id));
        let new_qty = current.saturating_add(delta).clamp(0, i64::from(u32::MAX)) as u32;

        if new_qty == 0 {
            // shift_remove keeps the remaining lines in insertion order
            self.entries.shift_remove(item_id);
        } else if let Some(qty) = self.entries.get_mut(item_id) {
            *qty = new_qty;
        } else {
            self.entries.insert(item_id.to_string(), new_qty);
        }
        Ok(new_qty)
    }

    /// Quantity for an id; absent ids are zero.
    pub fn quantity(&self, item_id: &str) -> u32 {
        self.entries.get(item_id).copied().unwrap_or(0)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read-only view of the entries for pricing.
    pub fn snapshot(&self) -> &IndexMap<String, u32> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct ids held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

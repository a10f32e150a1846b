use rust_decimal::Decimal;
use tracing::debug;

use crate::models::basket::Basket;
use crate::models::catalog::CatalogCache;
use crate::models::order::{OrderLine, Totals};

/// Derives order lines and totals from a basket and a catalog snapshot.
///
/// Pure business logic: neither input is mutated and identical inputs always
/// give identical output, so it's recomputed from scratch on every change.
#[derive(Debug, Clone)]
pub struct PricingService {
    tax_rate: Decimal,
}

impl PricingService {
    pub fn new(tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Price every basket entry that resolves against the catalog.
    ///
    /// Entries without a catalog item are skipped entirely (no line, no
    /// contribution to subtotal or item count) and listed in `excluded`.
    /// Lines keep basket insertion order.
    pub fn compute_totals(&self, basket: &Basket, catalog: &CatalogCache) -> Totals {
        let mut lines = Vec::with_capacity(basket.len());
        let mut excluded = Vec::new();
        let mut subtotal = Decimal::ZERO;
        let mut item_count: u64 = 0;

        for (id, quantity) in basket.iter() {
            if quantity == 0 {
                continue;
            }
            let Some(item) = catalog.lookup(id) else {
                excluded.push(id.to_string());
                continue;
            };

            let line = OrderLine::new(item.clone(), quantity);
            subtotal += line.line_total;
            item_count += u64::from(quantity);
            lines.push(line);
        }

        if !excluded.is_empty() {
            debug!(?excluded, "basket references items missing from the catalog");
        }

        let tax = subtotal * self.tax_rate;
        let total = subtotal + tax;

        Totals {
            lines,
            subtotal,
            tax,
            total,
            item_count,
            excluded,
        }
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new(Decimal::new(8, 2))
    }
}

use tracing::info;

use crate::errors::CoreError;
use crate::models::basket::Basket;
use crate::models::catalog::CatalogCache;
use crate::models::order::OrderSummary;

use super::pricing_service::PricingService;

/// Simulated checkout: snapshot the basket into a summary, then empty it.
///
/// No payment is captured; clearing the basket is the only lasting effect.
pub struct CheckoutService;

impl CheckoutService {
    pub fn new() -> Self {
        Self
    }

    /// Place an order for everything in the basket that resolves against the catalog.
    ///
    /// Fails with `CoreError::EmptyBasket` (leaving the basket untouched) when
    /// no line resolves.
    pub fn place_order(
        &self,
        basket: &mut Basket,
        catalog: &CatalogCache,
        pricing: &PricingService,
    ) -> Result<OrderSummary, CoreError> {
        let totals = pricing.compute_totals(basket, catalog);
        if !totals.has_lines() {
            return Err(CoreError::EmptyBasket);
        }

        let summary = OrderSummary::from_totals(&totals);
        basket.clear();

        info!(
            order_id = %summary.id,
            total = %summary.total,
            items = summary.item_count,
            "order placed"
        );
        Ok(summary)
    }
}

impl Default for CheckoutService {
    fn default() -> Self {
        Self::new()
    }
}

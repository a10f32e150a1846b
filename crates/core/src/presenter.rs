use crate::errors::CoreError;
use crate::models::order::OrderSummary;
use crate::models::view::{BasketView, CatalogView, Notice, QuantityBadge, View};

/// Hooks the presentation layer implements to draw the storefront.
///
/// Every method has a no-op default so a presenter only overrides the panels
/// it actually draws.
pub trait Presenter: Send {
    /// The active view changed; draw its shell.
    fn on_view_changed(&mut self, _view: View) {}

    /// Catalog panel contents changed (new snapshot or menu entry).
    fn on_catalog_changed(&mut self, _catalog: &CatalogView) {}

    /// Basket panel contents changed.
    fn on_basket_changed(&mut self, _basket: &BasketView) {}

    /// The basket changed without a new catalog snapshot; refresh only the
    /// per-row quantity badges of the catalog panel.
    fn on_badges_changed(&mut self, _badges: &[QuantityBadge]) {}

    fn on_checkout_result(&mut self, _result: Result<&OrderSummary, &CoreError>) {}

    /// Inline message for the login or register form.
    fn on_auth_error(&mut self, _form: View, _message: &str) {}

    /// Dialog-style message (success, warning or error).
    fn on_notice(&mut self, _notice: &Notice) {}
}

/// Presenter that draws nothing. For headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::basket::Basket;
use crate::models::catalog::CatalogCache;
use crate::models::order::{format_money, Totals};
use crate::models::user::AuthState;
use crate::models::view::{
    BasketLineView, BasketView, CatalogRow, CatalogSection, CatalogView, QuantityBadge, View,
    EMPTY_BASKET_MESSAGE, EMPTY_CATALOG_MESSAGE,
};

/// A change of the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: View,
    pub to: View,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    pub fn enters_menu(&self) -> bool {
        self.to == View::Menu && self.from != View::Menu
    }

    pub fn leaves_menu(&self) -> bool {
        self.from == View::Menu && self.to != View::Menu
    }
}

/// State machine over the storefront's top-level views.
///
/// Auth notifications may move the session anywhere (`SignedOut` → login,
/// `SignedIn` → menu). User navigation only toggles between login and
/// register; nothing but a sign-out leaves the menu.
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    current: View,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// React to the auth collaborator's session state.
    pub fn on_auth_state(&mut self, state: &AuthState) -> Transition {
        let to = match state {
            AuthState::SignedIn(_) => View::Menu,
            AuthState::SignedOut => View::Login,
        };
        self.move_to(to)
    }

    /// User-driven navigation between the auth forms.
    pub fn navigate(&mut self, to: View) -> Result<Transition, CoreError> {
        let allowed = matches!(
            (self.current, to),
            (View::Login, View::Register) | (View::Register, View::Login)
        ) || self.current == to;

        if !allowed {
            return Err(CoreError::InvalidTransition {
                from: self.current.to_string(),
                to: to.to_string(),
            });
        }
        Ok(self.move_to(to))
    }

    fn move_to(&mut self, to: View) -> Transition {
        let transition = Transition {
            from: self.current,
            to,
        };
        self.current = to;
        transition
    }
}

/// Maps catalog, basket and totals onto the view-model records the
/// presentation layer draws.
#[derive(Debug, Clone)]
pub struct ViewService {
    currency_symbol: String,
}

impl ViewService {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Menu panel: items grouped by category with their basket quantity badges.
    pub fn catalog_view(&self, catalog: &CatalogCache, basket: &Basket) -> CatalogView {
        let sections: Vec<CatalogSection> = catalog
            .grouped()
            .into_iter()
            .map(|(category, items)| CatalogSection {
                category,
                rows: items
                    .into_iter()
                    .map(|item| {
                        let quantity = basket.quantity(&item.id);
                        CatalogRow {
                            id: item.id.clone(),
                            name: item.name.clone(),
                            description: item.description.clone(),
                            emoji: item.emoji.clone(),
                            price: format_money(item.price, &self.currency_symbol),
                            quantity,
                            can_decrement: quantity > 0,
                        }
                    })
                    .collect(),
            })
            .collect();

        let empty_message = sections
            .is_empty()
            .then(|| EMPTY_CATALOG_MESSAGE.to_string());

        CatalogView {
            sections,
            empty_message,
        }
    }

    /// Badge for every listed catalog row, in catalog order.
    pub fn badges(&self, catalog: &CatalogCache, basket: &Basket) -> Vec<QuantityBadge> {
        catalog
            .current()
            .iter()
            .map(|item| QuantityBadge::new(item.id.clone(), basket.quantity(&item.id)))
            .collect()
    }

    /// Basket panel: priced lines, formatted totals and the checkout toggle.
    pub fn basket_view(&self, totals: &Totals) -> BasketView {
        let symbol = self.currency_symbol.as_str();
        if !totals.has_lines() {
            return BasketView {
                lines: Vec::new(),
                subtotal: format_money(Decimal::ZERO, symbol),
                tax: format_money(Decimal::ZERO, symbol),
                total: format_money(Decimal::ZERO, symbol),
                checkout_enabled: false,
                empty_message: Some(EMPTY_BASKET_MESSAGE.to_string()),
            };
        }

        BasketView {
            lines: totals
                .lines
                .iter()
                .map(|line| BasketLineView::from_line(line, symbol))
                .collect(),
            subtotal: format_money(totals.subtotal, symbol),
            tax: format_money(totals.tax, symbol),
            total: format_money(totals.total, symbol),
            checkout_enabled: totals.item_count > 0,
            empty_message: None,
        }
    }
}

impl Default for ViewService {
    fn default() -> Self {
        Self::new("$")
    }
}

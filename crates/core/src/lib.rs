pub mod errors;
pub mod models;
pub mod presenter;
pub mod providers;
pub mod services;

use models::{
    basket::Basket,
    catalog::{default_menu, CatalogCache, CatalogItem},
    order::{format_money, OrderSummary, Totals},
    settings::{Settings, UnknownItemPolicy},
    user::{AuthMode, AuthState, AuthUser, UserProfile},
    view::{BasketView, CatalogView, Notice, NoticeKind, View},
};
use presenter::Presenter;
use providers::{
    registry::Collaborators,
    subscription::{CatalogEvent, CatalogSubscription},
    traits::{AuthProvider, CatalogSource},
};
use services::{
    checkout_service::CheckoutService,
    pricing_service::PricingService,
    view_service::{Transition, ViewController, ViewService},
};
use tracing::{debug, info, warn};

use errors::{clean_auth_message, CoreError};

/// Inline message when a form is submitted without credentials.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both email and password.";

/// Main entry point for the storefront core library.
///
/// One `Storefront` is one user session: it owns the catalog snapshot, the
/// basket, the current view and the catalog subscription, and talks to the
/// auth/data collaborators and the presenter it was built with.
///
/// Events are handled one at a time through `&mut self`; share a session
/// across threads only behind your own lock.
#[must_use]
pub struct Storefront {
    settings: Settings,
    catalog: CatalogCache,
    basket: Basket,
    views: ViewController,
    pricing: PricingService,
    checkout: CheckoutService,
    renderer: ViewService,
    auth: Box<dyn AuthProvider>,
    source: Box<dyn CatalogSource>,
    presenter: Box<dyn Presenter>,
    user: Option<AuthUser>,
    /// Released (dropped) on sign-out and when the session is dropped.
    subscription: Option<CatalogSubscription>,
    last_order: Option<OrderSummary>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("view", &self.views.current())
            .field("user", &self.user.as_ref().map(|u| &u.user_id))
            .field("catalog_items", &self.catalog.len())
            .field("basket_entries", &self.basket.len())
            .field("auth", &self.auth.name())
            .field("source", &self.source.name())
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

impl Storefront {
    /// Build a session over the given collaborators.
    pub fn new(
        settings: Settings,
        collaborators: Collaborators,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            pricing: PricingService::new(settings.tax_rate),
            renderer: ViewService::new(settings.currency_symbol.clone()),
            checkout: CheckoutService::new(),
            catalog: CatalogCache::new(),
            basket: Basket::new(),
            views: ViewController::new(),
            auth: collaborators.auth,
            source: collaborators.catalog,
            presenter,
            user: None,
            subscription: None,
            last_order: None,
            settings,
        })
    }

    /// Build a session with collaborators chosen from `settings`.
    pub fn from_settings(
        settings: Settings,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self, CoreError> {
        let collaborators = Collaborators::from_settings(&settings);
        Self::new(settings, collaborators, presenter)
    }

    /// Draw the initial (loading) view.
    pub fn start(&mut self) {
        self.presenter.on_view_changed(self.views.current());
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn current_view(&self) -> View {
        self.views.current()
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    #[must_use]
    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Summary of the most recent successful checkout in this session.
    #[must_use]
    pub fn last_order(&self) -> Option<&OrderSummary> {
        self.last_order.as_ref()
    }

    /// Price the current basket against the current catalog.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.pricing.compute_totals(&self.basket, &self.catalog)
    }

    #[must_use]
    pub fn catalog_view(&self) -> CatalogView {
        self.renderer.catalog_view(&self.catalog, &self.basket)
    }

    #[must_use]
    pub fn basket_view(&self) -> BasketView {
        self.renderer.basket_view(&self.totals())
    }

    // ── Authentication ──────────────────────────────────────────────

    /// Submit the login form.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.submit_auth(AuthMode::Login, email, password).await
    }

    /// Submit the registration form.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.submit_auth(AuthMode::Register, email, password).await
    }

    /// Sign out through the auth provider and return to the login view.
    pub async fn sign_out(&mut self) -> Result<(), CoreError> {
        self.auth.sign_out().await?;
        self.handle_auth_state(AuthState::SignedOut).await;
        Ok(())
    }

    async fn submit_auth(
        &mut self,
        mode: AuthMode,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, CoreError> {
        let form = match mode {
            AuthMode::Login => View::Login,
            AuthMode::Register => View::Register,
        };

        if email.trim().is_empty() || password.is_empty() {
            self.presenter.on_auth_error(form, MISSING_CREDENTIALS_MESSAGE);
            return Err(CoreError::Auth(MISSING_CREDENTIALS_MESSAGE.into()));
        }

        let result = match mode {
            AuthMode::Login => self.auth.sign_in(email.trim(), password).await,
            AuthMode::Register => self.auth.register(email.trim(), password).await,
        };

        match result {
            Ok(user) => {
                info!(user_id = %user.user_id, ?mode, "authenticated");
                if mode == AuthMode::Register {
                    self.record_profile(&user).await;
                    self.presenter.on_notice(&Notice::new(
                        NoticeKind::Success,
                        "Success!",
                        "Registration successful! You are now logged in.",
                    ));
                }
                self.handle_auth_state(AuthState::SignedIn(user.clone())).await;
                Ok(user)
            }
            Err(e) => {
                warn!(provider = self.auth.name(), ?mode, "authentication failed: {e}");
                let message = match e {
                    CoreError::Auth(message) => message,
                    other => clean_auth_message(&other.to_string()),
                };
                self.presenter.on_auth_error(form, &message);
                Err(CoreError::Auth(message))
            }
        }
    }

    /// Profile write failures never fail the registration itself.
    async fn record_profile(&mut self, user: &AuthUser) {
        let profile = UserProfile::joined_now(user);
        match self.source.record_profile(user, &profile).await {
            Ok(()) => debug!(user_id = %user.user_id, "profile recorded"),
            Err(e) => {
                warn!(source = self.source.name(), user_id = %user.user_id, "profile not recorded: {e}");
                self.presenter.on_notice(&Notice::new(
                    NoticeKind::Warning,
                    "Profile not saved",
                    e.to_string(),
                ));
            }
        }
    }

    /// React to a session-state change from the auth collaborator.
    ///
    /// Signing in enters the menu, which seeds the catalog if configured,
    /// starts the catalog subscription and draws both panels. Signing out
    /// releases the subscription and returns to the login view.
    pub async fn handle_auth_state(&mut self, state: AuthState) {
        match &state {
            AuthState::SignedIn(user) => {
                let previous = self.user.as_ref().map(|u| u.user_id.clone());
                if previous.is_some_and(|id| id != user.user_id) {
                    // Another account took over: the old session ends here.
                    if self.subscription.take().is_some() {
                        debug!("released catalog subscription of previous user");
                    }
                    self.catalog.replace(Vec::new());
                    if self.settings.basket.clear_on_sign_out {
                        self.basket.clear();
                    }
                }
                self.user = Some(user.clone());
            }
            AuthState::SignedOut => {
                self.user = None;
                if self.subscription.take().is_some() {
                    info!("catalog subscription released on sign-out");
                }
                if self.settings.basket.clear_on_sign_out {
                    self.basket.clear();
                }
            }
        }

        let transition = self.views.on_auth_state(&state);
        self.apply_transition(transition).await;
    }

    /// User navigation between the login and register forms.
    pub fn navigate(&mut self, to: View) -> Result<(), CoreError> {
        let transition = self.views.navigate(to)?;
        if !transition.is_noop() {
            self.presenter.on_view_changed(transition.to);
        }
        Ok(())
    }

    async fn apply_transition(&mut self, transition: Transition) {
        if transition.leaves_menu() && self.settings.basket.clear_on_leave_menu {
            self.basket.clear();
        }
        if !transition.is_noop() {
            self.presenter.on_view_changed(transition.to);
        }
        if transition.to == View::Menu && self.subscription.is_none() {
            self.enter_menu().await;
        }
    }

    async fn enter_menu(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };

        if self.settings.seed_catalog_if_empty {
            match self.source.seed_if_empty(&user, &default_menu()).await {
                Ok(true) => info!(source = self.source.name(), "seeded initial catalog"),
                Ok(false) => {}
                Err(e) => self.report_data_error(e),
            }
        }

        match self.source.subscribe(&user).await {
            Ok(subscription) => {
                debug!(source = self.source.name(), "catalog subscription started");
                self.subscription = Some(subscription);
                self.absorb_pending();
            }
            Err(e) => self.report_data_error(e),
        }

        self.render_menu();
    }

    // ── Catalog updates ─────────────────────────────────────────────

    /// Apply one pushed catalog event and redraw if the menu is showing.
    pub fn apply_catalog_event(&mut self, event: CatalogEvent) {
        self.absorb(event);
        self.render_menu();
    }

    /// Replace the catalog directly, as if the data source had pushed `items`.
    pub fn replace_catalog(&mut self, items: Vec<CatalogItem>) {
        self.apply_catalog_event(Ok(items));
    }

    /// Wait for the next catalog event and apply it.
    /// Returns `false` when there is no live subscription.
    pub async fn next_catalog_update(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.next().await {
            Some(event) => {
                self.apply_catalog_event(event);
                true
            }
            None => {
                warn!("catalog subscription ended by the data source");
                self.subscription = None;
                false
            }
        }
    }

    /// Apply every catalog event already delivered, redrawing once.
    /// Returns how many events were applied.
    pub fn drain_catalog_updates(&mut self) -> usize {
        let applied = self.absorb_pending();
        if applied > 0 {
            self.render_menu();
        }
        applied
    }

    /// One-shot re-read of the catalog, outside the subscription.
    pub async fn refresh_catalog(&mut self) -> Result<(), CoreError> {
        let user = self
            .user
            .clone()
            .ok_or_else(|| CoreError::InvalidArgument("Not signed in".into()))?;
        let items = self.source.fetch(&user).await?;
        self.apply_catalog_event(Ok(items));
        Ok(())
    }

    fn absorb_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.as_mut().and_then(|s| s.try_next()) {
            self.absorb(event);
            applied += 1;
        }
        applied
    }

    /// Fold an event into the catalog without drawing.
    fn absorb(&mut self, event: CatalogEvent) {
        match event {
            Ok(items) => {
                debug!(items = items.len(), "catalog snapshot replaced");
                self.catalog.replace(items);
            }
            Err(e) => self.report_data_error(e),
        }
    }

    /// Data-source failures keep the last snapshot and surface a warning.
    fn report_data_error(&mut self, error: CoreError) {
        let error = match error {
            e @ CoreError::DataSource(_) => e,
            other => CoreError::DataSource(other.to_string()),
        };
        warn!(source = self.source.name(), "catalog unavailable: {error}");
        self.presenter.on_notice(&Notice::new(
            NoticeKind::Warning,
            "Menu unavailable",
            error.to_string(),
        ));
    }

    // ── Basket ──────────────────────────────────────────────────────

    /// Change the quantity of an item by `delta` and redraw the basket panel.
    /// Returns the new quantity.
    pub fn adjust(&mut self, item_id: &str, delta: i64) -> Result<u32, CoreError> {
        if self.settings.unknown_items == UnknownItemPolicy::Reject
            && !item_id.trim().is_empty()
            && !self.catalog.contains(item_id)
        {
            return Err(CoreError::InvalidArgument(format!(
                "Unknown item id '{item_id}'"
            )));
        }

        let quantity = self.basket.adjust(item_id, delta)?;
        self.render_basket_change();
        Ok(quantity)
    }

    /// Empty the basket and redraw the basket panel.
    pub fn clear_basket(&mut self) {
        self.basket.clear();
        self.render_basket_change();
    }

    // ── Checkout ────────────────────────────────────────────────────

    /// Finalize the basket into an order summary and empty the basket.
    ///
    /// With nothing priceable in the basket this fails with
    /// `CoreError::EmptyBasket` and changes nothing.
    pub fn place_order(&mut self) -> Result<OrderSummary, CoreError> {
        match self
            .checkout
            .place_order(&mut self.basket, &self.catalog, &self.pricing)
        {
            Ok(summary) => {
                self.presenter.on_checkout_result(Ok(&summary));
                self.presenter.on_notice(&Notice::new(
                    NoticeKind::Success,
                    "Order Placed!",
                    format!(
                        "Your total is {}.",
                        format_money(summary.total, &self.settings.currency_symbol)
                    ),
                ));
                self.last_order = Some(summary.clone());
                self.render_basket_change();
                Ok(summary)
            }
            Err(e) => {
                self.presenter.on_checkout_result(Err(&e));
                self.presenter.on_notice(&Notice::new(
                    NoticeKind::Error,
                    "Oops!",
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render_menu(&mut self) {
        if self.views.current() != View::Menu {
            return;
        }
        let catalog = self.catalog_view();
        self.presenter.on_catalog_changed(&catalog);
        self.render_basket();
    }

    fn render_basket(&mut self) {
        if self.views.current() != View::Menu {
            return;
        }
        let basket = self.basket_view();
        self.presenter.on_basket_changed(&basket);
    }

    /// Basket-only change: basket panel plus the catalog's quantity badges.
    fn render_basket_change(&mut self) {
        if self.views.current() != View::Menu {
            return;
        }
        self.render_basket();
        let badges = self.renderer.badges(&self.catalog, &self.basket);
        self.presenter.on_badges_changed(&badges);
    }
}

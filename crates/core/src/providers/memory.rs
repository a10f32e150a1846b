use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::catalog::CatalogItem;
use crate::models::user::{AuthUser, UserProfile};

use super::subscription::{CatalogPublisher, CatalogSubscription};
use super::traits::{AuthProvider, CatalogSource};

/// Minimum password length accepted by the in-memory auth provider.
pub const MIN_PASSWORD_LEN: usize = 6;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Auth ────────────────────────────────────────────────────────────

struct Account {
    user_id: String,
    password: String,
}

/// Process-local account store. Handy for tests and offline demos.
///
/// Clones share the same accounts.
#[derive(Clone, Default)]
pub struct MemoryAuthProvider {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        lock(&self.accounts).len()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AuthProvider for MemoryAuthProvider {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(CoreError::Auth("The email address is badly formatted.".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(&email) {
            return Err(CoreError::Auth(
                "The email address is already in use by another account.".into(),
            ));
        }

        let user_id = Uuid::new_v4().to_string();
        accounts.insert(
            email.clone(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        debug!(%user_id, "registered in-memory account");
        Ok(AuthUser::new(user_id, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        let email = email.trim().to_lowercase();
        let accounts = lock(&self.accounts);
        match accounts.get(&email) {
            Some(account) if account.password == password => {
                Ok(AuthUser::new(account.user_id.clone(), email))
            }
            _ => Err(CoreError::Auth("Invalid email or password.".into())),
        }
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

// ── Catalog ─────────────────────────────────────────────────────────

#[derive(Default)]
struct CatalogState {
    items: Vec<CatalogItem>,
    subscribers: Vec<CatalogPublisher>,
    profiles: HashMap<String, UserProfile>,
}

/// Catalog held in memory with push delivery to every live subscription.
///
/// Clones share state, so a test can keep one handle and `publish` while the
/// session owns another.
#[derive(Clone, Default)]
pub struct MemoryCatalogSource {
    state: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        let source = Self::new();
        lock(&source.state).items = items;
        source
    }

    /// Replace the stored catalog and push the snapshot to all subscribers.
    pub fn publish(&self, items: Vec<CatalogItem>) {
        let mut state = lock(&self.state);
        state.items = items.clone();
        state
            .subscribers
            .retain(|tx| tx.send(Ok(items.clone())).is_ok());
    }

    /// Push an error to all subscribers without touching the stored catalog.
    pub fn fail(&self, message: &str) {
        let mut state = lock(&self.state);
        state
            .subscribers
            .retain(|tx| tx.send(Err(CoreError::DataSource(message.to_string()))).is_ok());
    }

    /// Number of subscriptions that are still open.
    pub fn subscriber_count(&self) -> usize {
        let mut state = lock(&self.state);
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    pub fn items(&self) -> Vec<CatalogItem> {
        lock(&self.state).items.clone()
    }

    /// Profile recorded for `user_id`, if any.
    pub fn profile(&self, user_id: &str) -> Option<UserProfile> {
        lock(&self.state).profiles.get(user_id).cloned()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CatalogSource for MemoryCatalogSource {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn fetch(&self, _user: &AuthUser) -> Result<Vec<CatalogItem>, CoreError> {
        Ok(self.items())
    }

    async fn seed_if_empty(
        &self,
        _user: &AuthUser,
        defaults: &[CatalogItem],
    ) -> Result<bool, CoreError> {
        let mut state = lock(&self.state);
        if !state.items.is_empty() {
            return Ok(false);
        }
        state.items = defaults.to_vec();
        Ok(true)
    }

    async fn subscribe(&self, _user: &AuthUser) -> Result<CatalogSubscription, CoreError> {
        let (tx, subscription) = CatalogSubscription::channel();
        let mut state = lock(&self.state);
        tx.send(Ok(state.items.clone()))
            .map_err(|_| CoreError::DataSource("Subscription closed before first snapshot".into()))?;
        state.subscribers.push(tx);
        Ok(subscription)
    }

    async fn record_profile(
        &self,
        user: &AuthUser,
        profile: &UserProfile,
    ) -> Result<(), CoreError> {
        lock(&self.state)
            .profiles
            .insert(user.user_id.clone(), profile.clone());
        debug!(user_id = %user.user_id, "recorded in-memory profile");
        Ok(())
    }
}

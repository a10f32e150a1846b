use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::catalog::CatalogItem;
use crate::models::user::{AuthUser, UserProfile};

use super::subscription::CatalogSubscription;

/// Account backend: sign-up, sign-in and sign-out.
///
/// Implementations return `CoreError::Auth` with a message fit to show next
/// to the form; anything provider-specific is stripped before it gets here.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AuthProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Create an account and sign it in.
    async fn register(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;

    async fn sign_out(&self) -> Result<(), CoreError>;
}

/// Catalog document store.
///
/// Updates are whole-catalog snapshots, never deltas.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// One-shot read of the current catalog.
    async fn fetch(&self, user: &AuthUser) -> Result<Vec<CatalogItem>, CoreError>;

    /// Write `defaults` if the catalog is empty. Returns whether anything was written.
    async fn seed_if_empty(
        &self,
        user: &AuthUser,
        defaults: &[CatalogItem],
    ) -> Result<bool, CoreError>;

    /// Start push delivery of catalog snapshots.
    ///
    /// The current snapshot is delivered first. Delivery stops when the
    /// returned subscription is dropped.
    async fn subscribe(&self, user: &AuthUser) -> Result<CatalogSubscription, CoreError>;

    /// Store the profile of a newly registered account.
    async fn record_profile(
        &self,
        user: &AuthUser,
        profile: &UserProfile,
    ) -> Result<(), CoreError>;
}

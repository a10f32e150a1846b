use tracing::info;

use crate::models::settings::Settings;

#[cfg(not(target_arch = "wasm32"))]
use super::firebase::{FirebaseAuthProvider, FirestoreCatalogSource};
use super::memory::{MemoryAuthProvider, MemoryCatalogSource};
use super::traits::{AuthProvider, CatalogSource};

/// The pair of backends a session talks to.
pub struct Collaborators {
    pub auth: Box<dyn AuthProvider>,
    pub catalog: Box<dyn CatalogSource>,
}

impl Collaborators {
    pub fn new(auth: Box<dyn AuthProvider>, catalog: Box<dyn CatalogSource>) -> Self {
        Self { auth, catalog }
    }

    /// In-memory accounts and catalog, no network.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryAuthProvider::new()),
            Box::new(MemoryCatalogSource::new()),
        )
    }

    /// Pick backends from settings: Firebase when configured (native only),
    /// in-memory otherwise.
    #[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
    pub fn from_settings(settings: &Settings) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(config) = &settings.firebase {
                info!(project = %config.project_id, "using Firebase collaborators");
                return Self::new(
                    Box::new(FirebaseAuthProvider::new(config.api_key.clone())),
                    Box::new(FirestoreCatalogSource::new(config.clone())),
                );
            }
        }

        info!("using in-memory collaborators");
        Self::in_memory()
    }
}

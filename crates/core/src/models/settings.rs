use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{env, fmt::Display, str::FromStr};
use tracing::{info, warn};

use crate::errors::CoreError;

/// What to do when a quantity change targets an id the catalog doesn't know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownItemPolicy {
    /// Store the quantity anyway; pricing leaves the line out.
    #[default]
    Tolerate,
    /// Fail the adjustment with `CoreError::InvalidArgument`.
    Reject,
}

impl FromStr for UnknownItemPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tolerate" => Ok(UnknownItemPolicy::Tolerate),
            "reject" => Ok(UnknownItemPolicy::Reject),
            other => Err(CoreError::Config(format!(
                "Unknown item policy '{other}' (expected 'tolerate' or 'reject')"
            ))),
        }
    }
}

/// When the basket is emptied besides a successful checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketPolicy {
    /// Clear when the auth collaborator reports a sign-out.
    pub clear_on_sign_out: bool,
    /// Clear whenever the session leaves the menu view.
    pub clear_on_leave_menu: bool,
}

impl Default for BasketPolicy {
    fn default() -> Self {
        Self {
            clear_on_sign_out: true,
            clear_on_leave_menu: true,
        }
    }
}

/// Connection details for the Firebase REST collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Web API key (sent as the `key` query parameter)
    pub api_key: String,
    pub project_id: String,
    /// Namespace under `artifacts/` holding this storefront's documents
    pub app_id: String,
}

/// Session-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Flat sales tax applied to the subtotal (0.08 = 8%).
    pub tax_rate: Decimal,

    /// Prefix used when formatting amounts for display.
    pub currency_symbol: String,

    pub unknown_items: UnknownItemPolicy,

    pub basket: BasketPolicy,

    /// Write the default menu when the catalog collection is empty on first sign-in.
    pub seed_catalog_if_empty: bool,

    pub firebase: Option<FirebaseConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            currency_symbol: "$".to_string(),
            unknown_items: UnknownItemPolicy::default(),
            basket: BasketPolicy::default(),
            seed_catalog_if_empty: true,
            firebase: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from process environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults (logged at info); malformed values
    /// are configuration errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Settings::default();

        let tax_rate = try_load(&lookup, "STOREFRONT_TAX_RATE", defaults.tax_rate)?;
        let currency_symbol =
            try_load(&lookup, "STOREFRONT_CURRENCY", defaults.currency_symbol)?;
        let unknown_items =
            try_load(&lookup, "STOREFRONT_UNKNOWN_ITEMS", defaults.unknown_items)?;
        let seed_catalog_if_empty =
            try_load(&lookup, "STOREFRONT_SEED_CATALOG", defaults.seed_catalog_if_empty)?;

        let firebase = match (
            lookup("FIREBASE_API_KEY"),
            lookup("FIREBASE_PROJECT_ID"),
        ) {
            (Some(api_key), Some(project_id)) => Some(FirebaseConfig {
                api_key,
                project_id,
                app_id: lookup("FIREBASE_APP_ID").unwrap_or_else(|| "default-app-id".into()),
            }),
            (None, None) => None,
            _ => {
                warn!("Only one of FIREBASE_API_KEY / FIREBASE_PROJECT_ID is set, ignoring Firebase config");
                None
            }
        };

        let settings = Settings {
            tax_rate,
            currency_symbol,
            unknown_items,
            basket: defaults.basket,
            seed_catalog_if_empty,
            firebase,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tax_rate.is_sign_negative() {
            return Err(CoreError::Config(format!(
                "Tax rate must not be negative (got {})",
                self.tax_rate
            )));
        }
        if self.currency_symbol.trim().is_empty() {
            return Err(CoreError::Config("Currency symbol must not be empty".into()));
        }
        Ok(())
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CoreError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            CoreError::Config(format!("Invalid {key} value '{raw}': {e}"))
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

impl Display for UnknownItemPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownItemPolicy::Tolerate => write!(f, "tolerate"),
            UnknownItemPolicy::Reject => write!(f, "reject"),
        }
    }
}

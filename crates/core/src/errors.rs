use thiserror::Error;

/// Unified error type for the entire storefront-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// No variant is fatal to a session: each one maps to a visible message
/// and the storefront stays interactive.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session / Business Logic ────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Your order is empty. Add something first!")]
    EmptyBasket,

    #[error("Cannot switch view from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    // ── Collaborators ───────────────────────────────────────────────
    #[error("{0}")]
    Auth(String),

    #[error("Catalog data source error: {0}")]
    DataSource(String),

    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Configuration / Parsing ─────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Fallback shown when a provider message cleans down to nothing.
pub const DEFAULT_AUTH_MESSAGE: &str = "Authentication failed. Check your credentials.";

/// Turn `"Firebase: Error (auth/wrong-password)."` into `"Error"`.
pub fn clean_auth_message(raw: &str) -> String {
    let without_prefix = raw.strip_prefix("Firebase: ").unwrap_or(raw);
    let head = without_prefix
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();
    if head.is_empty() {
        DEFAULT_AUTH_MESSAGE.to_string()
    } else {
        head.to_string()
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, and the Firebase REST API key
        // travels in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::catalog::CatalogItem;
use crate::models::settings::FirebaseConfig;
use crate::models::user::{AuthUser, UserProfile};

use super::subscription::CatalogSubscription;
use super::traits::{AuthProvider, CatalogSource};

const IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
}

// ═══════════════════════════════════════════════════════════════════
// Identity Toolkit (email/password auth)
// ═══════════════════════════════════════════════════════════════════

/// Firebase Authentication over the Identity Toolkit REST API.
///
/// - `accounts:signUp` for registration
/// - `accounts:signInWithPassword` for sign-in
///
/// The REST API is stateless, so sign-out only forgets the token client-side.
pub struct FirebaseAuthProvider {
    client: Client,
    api_key: String,
}

impl FirebaseAuthProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
        }
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, CoreError> {
        let url = format!("{IDENTITY_URL}/accounts:{endpoint}?key={}", self.api_key);
        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let body: IdentityErrorResponse = resp.json().await.unwrap_or_default();
            return Err(CoreError::Auth(identity_error_message(&body.error.message)));
        }

        let body: IdentityResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: "Firebase Auth".into(),
            message: format!("Failed to parse {endpoint} response: {e}"),
        })?;
        Ok(AuthUser::new(body.local_id, body.email).with_token(body.id_token))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
}

#[derive(Deserialize, Default)]
struct IdentityErrorResponse {
    #[serde(default)]
    error: IdentityErrorBody,
}

#[derive(Deserialize, Default)]
struct IdentityErrorBody {
    #[serde(default)]
    message: String,
}

/// Translate an Identity Toolkit error code into a message for the auth form.
///
/// Codes sometimes carry detail after `" : "` (e.g. `WEAK_PASSWORD : Password
/// should be at least 6 characters`); the detail wins when present.
pub fn identity_error_message(code: &str) -> String {
    let (code, detail) = match code.split_once(" : ") {
        Some((c, d)) => (c.trim(), Some(d.trim())),
        None => (code.trim(), None),
    };
    if let Some(detail) = detail.filter(|d| !d.is_empty()) {
        return crate::errors::clean_auth_message(detail);
    }

    match code {
        "EMAIL_EXISTS" => "The email address is already in use by another account.".into(),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password.".into()
        }
        "INVALID_EMAIL" => "The email address is badly formatted.".into(),
        "USER_DISABLED" => "This account has been disabled.".into(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.".into(),
        "WEAK_PASSWORD" => "Password should be at least 6 characters".into(),
        other => crate::errors::clean_auth_message(other),
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    fn name(&self) -> &str {
        "Firebase Auth"
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════
// Firestore (catalog documents)
// ═══════════════════════════════════════════════════════════════════

/// Catalog stored as Firestore documents under
/// `artifacts/{app_id}/public/data/menuItems`, one document per item.
///
/// The REST API has no listener, so `subscribe` polls and only pushes when
/// the snapshot actually changed.
#[derive(Clone)]
pub struct FirestoreCatalogSource {
    client: Client,
    config: FirebaseConfig,
    poll_interval: Duration,
}

/// Default delay between catalog polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Documents requested per `documents:list` page.
const PAGE_SIZE: usize = 300;

impl FirestoreCatalogSource {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: http_client(),
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn app_root(&self) -> String {
        format!(
            "{FIRESTORE_URL}/projects/{}/databases/(default)/documents/artifacts/{}",
            self.config.project_id, self.config.app_id
        )
    }

    /// Collection URL, without query string.
    pub fn collection_url(&self) -> String {
        format!("{}/public/data/menuItems", self.app_root())
    }

    /// Profile document URL for a user, without query string.
    pub fn profile_url(&self, user_id: &str) -> String {
        format!("{}/users/{user_id}/profile/data", self.app_root())
    }

    fn authorized(&self, req: RequestBuilder, user: &AuthUser) -> RequestBuilder {
        match &user.id_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Read the whole collection, following `nextPageToken` across pages.
    async fn list(&self, user: &AuthUser) -> Result<Vec<CatalogItem>, CoreError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self.authorized(self.client.get(self.collection_url()), user).query(&[
                ("pageSize", PAGE_SIZE.to_string()),
                ("key", self.config.api_key.clone()),
            ]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }
            let body = checked_body(req.send().await?).await?;
            let (page, next) = decode_page(&body)?;
            items.extend(page);
            match next {
                Some(token) => {
                    debug!(fetched = items.len(), "fetching next catalog page");
                    page_token = Some(token);
                }
                None => return Ok(items),
            }
        }
    }

    async fn write(&self, user: &AuthUser, item: &CatalogItem) -> Result<(), CoreError> {
        let url = format!(
            "{}/{}?key={}",
            self.collection_url(),
            item.id,
            self.config.api_key
        );
        let resp = self
            .authorized(self.client.patch(&url), user)
            .json(&encode_item(item))
            .send()
            .await?;
        checked_body(resp).await.map(|_| ())
    }

    async fn write_profile(&self, user: &AuthUser, profile: &UserProfile) -> Result<(), CoreError> {
        let url = format!("{}?key={}", self.profile_url(&user.user_id), self.config.api_key);
        let resp = self
            .authorized(self.client.patch(&url), user)
            .json(&encode_profile(profile))
            .send()
            .await?;
        checked_body(resp).await.map(|_| ())
    }
}

async fn checked_body(resp: Response) -> Result<String, CoreError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(CoreError::Api {
            provider: "Firestore".into(),
            message: format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
        })
    }
}

// ── Firestore document types ────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    double_value: Option<f64>,
    /// Firestore encodes 64-bit integers as strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integer_value: Option<String>,
}

impl FieldValue {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    fn as_string(&self) -> Option<String> {
        self.string_value.clone()
    }

    fn as_decimal(&self) -> Option<Decimal> {
        if let Some(d) = self.double_value {
            return Decimal::from_str(&d.to_string()).ok();
        }
        self.integer_value
            .as_deref()
            .and_then(|i| Decimal::from_str(i).ok())
    }
}

/// Decode a Firestore `documents:list` response body into catalog items.
///
/// Documents without a name or a valid non-negative price are skipped with a
/// warning rather than failing the whole snapshot.
pub fn decode_documents(body: &str) -> Result<Vec<CatalogItem>, CoreError> {
    decode_page(body).map(|(items, _)| items)
}

/// Decode one `documents:list` page, returning its items and the token of
/// the next page (absent or empty on the last page).
pub fn decode_page(body: &str) -> Result<(Vec<CatalogItem>, Option<String>), CoreError> {
    let resp: ListDocumentsResponse = serde_json::from_str(body)?;
    let next = resp.next_page_token.filter(|t| !t.is_empty());
    let mut items = Vec::with_capacity(resp.documents.len());

    for doc in resp.documents {
        let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
        let field = |key: &str| doc.fields.get(key).and_then(FieldValue::as_string);

        let name = field("name");
        let price = doc.fields.get("price").and_then(FieldValue::as_decimal);
        match (name, price) {
            (Some(name), Some(price)) if !id.is_empty() && !price.is_sign_negative() => {
                items.push(CatalogItem {
                    id,
                    name,
                    description: field("description").unwrap_or_default(),
                    category: field("category").unwrap_or_default(),
                    emoji: field("emoji").unwrap_or_default(),
                    price,
                });
            }
            _ => warn!(document = %doc.name, "skipping malformed catalog document"),
        }
    }
    Ok((items, next))
}

/// Encode a catalog item as a Firestore document body.
pub fn encode_item(item: &CatalogItem) -> Value {
    let price = FieldValue {
        double_value: item.price.to_f64(),
        ..FieldValue::default()
    };
    json!({
        "fields": {
            "id": FieldValue::string(&item.id),
            "name": FieldValue::string(&item.name),
            "description": FieldValue::string(&item.description),
            "category": FieldValue::string(&item.category),
            "emoji": FieldValue::string(&item.emoji),
            "price": price,
        }
    })
}

/// Encode a profile as a Firestore document body. `joined` is an RFC 3339 string.
pub fn encode_profile(profile: &UserProfile) -> Value {
    json!({
        "fields": {
            "email": FieldValue::string(&profile.email),
            "joined": FieldValue::string(&profile.joined.to_rfc3339()),
        }
    })
}

#[async_trait]
impl CatalogSource for FirestoreCatalogSource {
    fn name(&self) -> &str {
        "Firestore"
    }

    async fn fetch(&self, user: &AuthUser) -> Result<Vec<CatalogItem>, CoreError> {
        self.list(user).await
    }

    async fn seed_if_empty(
        &self,
        user: &AuthUser,
        defaults: &[CatalogItem],
    ) -> Result<bool, CoreError> {
        if !self.list(user).await?.is_empty() {
            return Ok(false);
        }
        info!(items = defaults.len(), "seeding initial catalog");
        for item in defaults {
            self.write(user, item).await?;
        }
        Ok(true)
    }

    /// Must be called from within a tokio runtime.
    async fn subscribe(&self, user: &AuthUser) -> Result<CatalogSubscription, CoreError> {
        let (tx, subscription) = CatalogSubscription::channel();
        let source = self.clone();
        let user = user.clone();

        let handle = tokio::spawn(async move {
            let mut last: Option<Vec<CatalogItem>> = None;
            let mut ticker = tokio::time::interval(source.poll_interval);
            loop {
                ticker.tick().await;
                let event = match source.list(&user).await {
                    Ok(items) if last.as_ref() == Some(&items) => continue,
                    Ok(items) => {
                        last = Some(items.clone());
                        Ok(items)
                    }
                    Err(e) => Err(CoreError::DataSource(e.to_string())),
                };
                if tx.send(event).is_err() {
                    debug!("catalog subscription closed, stopping poller");
                    break;
                }
            }
        });

        Ok(subscription.with_cancel(move || handle.abort()))
    }

    async fn record_profile(
        &self,
        user: &AuthUser,
        profile: &UserProfile,
    ) -> Result<(), CoreError> {
        self.write_profile(user, profile).await
    }
}

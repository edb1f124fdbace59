//! Access tokens for the Google APIs.
//!
//! A service-account key is exchanged for a bearer token with the OAuth 2.0
//! JWT-bearer grant. Tokens are cached and fetched again shortly before they
//! expire, so a long-running server keeps working past the first hour.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EditError, EditResult};

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/documents",
];
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens are replaced this long before the expiry the server reports.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account key file that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> EditResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            EditError::Configuration(format!("invalid service account key: {err}"))
        })
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    /// Used as given; never refreshed.
    AccessToken(String),
    Missing,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Deserialize)]
struct TokenError {
    error: Option<String>,
    error_description: Option<String>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Hands out bearer tokens for [`Credentials`], refreshing service-account
/// tokens as they near expiry.
pub struct TokenSource {
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// A token valid for at least [`REFRESH_MARGIN`], fetched with `client`
    /// when the cached one is missing or stale.
    pub fn token(&self, client: &Client) -> EditResult<String> {
        let key = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::Missing => {
                return Err(EditError::Configuration(
                    "GOOGLE_SERVICE_ACCOUNT_KEY or GOOGLE_SERVICE_ACCOUNT_KEY_FILE is required"
                        .to_string(),
                ))
            }
            Credentials::ServiceAccount(key) => key,
        };

        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
            debug!("Access token for {} is due for refresh", key.client_email);
        }

        let fresh = exchange(client, key)?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Signed RS256 assertion for the JWT-bearer grant.
fn sign_assertion(key: &ServiceAccountKey, issued_at: u64) -> EditResult<String> {
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|err| {
        EditError::Configuration(format!("invalid service account private key: {err}"))
    })?;
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key).map_err(|err| {
        EditError::Configuration(format!("failed to sign token request: {err}"))
    })
}

fn exchange(client: &Client, key: &ServiceAccountKey) -> EditResult<CachedToken> {
    let assertion = sign_assertion(key, unix_now())?;
    let requested_at = Instant::now();
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()?;
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        let message = token_error_message(&body);
        warn!("Token exchange failed with {}: {}", status, message);
        return Err(EditError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = serde_json::from_str(&body)?;
    debug!(
        "Fetched access token for {}, expires in {}s",
        key.client_email, token.expires_in
    );
    let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
    Ok(CachedToken {
        value: token.access_token,
        refresh_at: requested_at + lifetime,
    })
}

fn token_error_message(body: &str) -> String {
    serde_json::from_str::<TokenError>(body)
        .ok()
        .and_then(|error| error.error_description.or(error.error))
        .unwrap_or_else(|| body.trim().to_string())
}

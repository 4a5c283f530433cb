// Session lifecycle
//
// Owns the login protocol and the cache-population policy. Every resource
// operation asks this manager for a usable session; the manager answers
// from the cache or performs a fresh login.

pub mod cache;
pub mod token;

use reqwest::header;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

use crate::config::{ClientOptions, Credentials};
use crate::error::{Error, preview};
use cache::{Clock, TokenCache};

pub use token::Session;

const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";
const TOKEN_COOKIE: &str = "TOKEN";

/// The single source of truth for "do we have a usable session".
///
/// State machine per client instance: no session → (login success) →
/// valid session → (time passes its expiry) → no session. [`Self::login`]
/// is callable from any state; on failure the cache is left untouched.
pub struct SessionManager {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    cache: TokenCache,
    timeout_secs: u64,
}

impl SessionManager {
    pub(crate) fn new(http: reqwest::Client, options: &ClientOptions, clock: Box<dyn Clock>) -> Self {
        Self {
            http,
            base_url: options.base_url.clone(),
            credentials: options.credentials.clone(),
            cache: TokenCache::new(clock),
            timeout_secs: options.effective_timeout_secs(),
        }
    }

    /// A cached non-expired session if present, otherwise the result of a
    /// fresh [`Self::login`]. Never returns an expired session.
    pub async fn get_session(&self) -> Result<Session, Error> {
        if let Some(session) = self.cache.get() {
            trace!("reusing cached session");
            return Ok(session);
        }
        self.login().await
    }

    /// Authenticate unconditionally and overwrite the cached session.
    ///
    /// This is the explicit force-refresh path; [`Self::get_session`] is
    /// the reuse-if-possible path. A rejected login is a hard failure —
    /// the library never retries it, and the cache keeps whatever it had.
    pub async fn login(&self) -> Result<Session, Error> {
        let url = self.base_url.join(LOGIN_PATH)?;
        debug!("logging in at {url}");

        let body = json!({
            "username": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.login_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Login {
                message: format!("login rejected (HTTP {status}): {}", preview(&body)),
                source: None,
            });
        }

        let encoded = resp
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or_else(|| Error::Login {
                message: format!("login response did not set a {TOKEN_COOKIE} cookie"),
                source: None,
            })?;

        let session = token::decode(&encoded)?;
        self.cache.set(session.clone(), session.expires_at());
        debug!(expires_at = %session.expires_at(), "login successful");
        Ok(session)
    }

    /// End the current session, if any.
    ///
    /// Evicts the cached session and posts to the logout endpoint with
    /// its cookie. The response status is not inspected; with no cached
    /// session this is a no-op.
    pub async fn logout(&self) -> Result<(), Error> {
        let Some(session) = self.cache.take() else {
            return Ok(());
        };

        let url = self.base_url.join(LOGOUT_PATH)?;
        debug!("logging out at {url}");

        let _resp = self
            .http
            .post(url)
            .header(header::COOKIE, session.cookie_header())
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout_secs))?;

        debug!("logout complete");
        Ok(())
    }

    /// Timeouts keep their library-wide mapping even during login; any
    /// other send failure is part of the login hard-failure path.
    fn login_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::from_reqwest(e, self.timeout_secs)
        } else {
            Error::Login {
                message: "login request failed".to_owned(),
                source: Some(e),
            }
        }
    }
}

// Port forward HTTP client
//
// Wraps `reqwest::Client` with controller URL construction, authenticated
// request helpers, envelope handling, and error-body inspection. The CRUD
// operations themselves live in `portforward.rs` as inherent methods,
// keeping this module focused on transport mechanics.

use reqwest::{StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientOptions;
use crate::error::{Error, preview};
use crate::models::{DataEnvelope, ErrorEnvelope};
use crate::session::cache::{Clock, SystemClock};
use crate::session::{Session, SessionManager};

const CSRF_HEADER: &str = "X-CSRF-Token";
const ID_INVALID_MSG: &str = "api.err.IdInvalid";

/// Authenticated client for the controller's port forward endpoints.
///
/// Every operation first obtains a session from the [`SessionManager`]
/// (cached, or via a fresh login), then issues one round trip carrying
/// the session cookie — plus the anti-forgery header on mutations.
/// Entities are never cached; each call is a fresh round trip.
pub struct PortForwardClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    default_interface: Option<String>,
    timeout_secs: u64,
    sessions: SessionManager,
}

impl PortForwardClient {
    /// Build a client from options, using the system clock for session
    /// expiry.
    pub fn new(options: ClientOptions) -> Result<Self, Error> {
        Self::with_clock(options, Box::new(SystemClock))
    }

    /// Build a client with an explicit clock.
    ///
    /// Injecting the clock keeps session-expiry behavior deterministic
    /// under test; production callers want [`Self::new`].
    pub fn with_clock(options: ClientOptions, clock: Box<dyn Clock>) -> Result<Self, Error> {
        let timeout_secs = options.effective_timeout_secs();
        let http = options.build_http()?;
        let sessions = SessionManager::new(http.clone(), &options, clock);
        Ok(Self {
            http,
            base_url: options.base_url,
            site: options.site,
            default_interface: options.default_interface,
            timeout_secs,
            sessions,
        })
    }

    /// The session manager owning the login/cache lifecycle.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The site identifier used in resource URLs.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Force a fresh login, replacing any cached session.
    pub async fn login(&self) -> Result<Session, Error> {
        self.sessions.login().await
    }

    /// End the current session, if any.
    pub async fn logout(&self) -> Result<(), Error> {
        self.sessions.logout().await
    }

    pub(crate) fn default_interface(&self) -> Option<&str> {
        self.default_interface.as_deref()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/proxy/network/api/s/{site}/rest/portforward`
    pub(crate) fn collection_url(&self) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/proxy/network/api/s/{}/rest/portforward", self.site);
        Url::parse(&full).expect("invalid port forward collection URL")
    }

    /// `{collection}/{id}`
    pub(crate) fn item_url(&self, id: &str) -> Url {
        let full = format!("{}/{id}", self.collection_url());
        Url::parse(&full).expect("invalid port forward item URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a session-authenticated GET.
    pub(crate) async fn get(&self, url: Url) -> Result<reqwest::Response, Error> {
        let session = self.sessions.get_session().await?;
        debug!("GET {url}");

        self.send(
            self.http
                .get(url)
                .header(header::COOKIE, session.cookie_header()),
        )
        .await
    }

    /// Send a session-authenticated POST with the anti-forgery header.
    pub(crate) async fn post<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<reqwest::Response, Error> {
        let session = self.sessions.get_session().await?;
        debug!("POST {url}");

        self.send(
            self.http
                .post(url)
                .header(header::COOKIE, session.cookie_header())
                .header(CSRF_HEADER, session.csrf_token())
                .json(body),
        )
        .await
    }

    /// Send a session-authenticated PUT with the anti-forgery header.
    pub(crate) async fn put<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<reqwest::Response, Error> {
        let session = self.sessions.get_session().await?;
        debug!("PUT {url}");

        self.send(
            self.http
                .put(url)
                .header(header::COOKIE, session.cookie_header())
                .header(CSRF_HEADER, session.csrf_token())
                .json(body),
        )
        .await
    }

    /// Send a session-authenticated DELETE with the anti-forgery header.
    pub(crate) async fn delete(&self, url: Url) -> Result<reqwest::Response, Error> {
        let session = self.sessions.get_session().await?;
        debug!("DELETE {url}");

        self.send(
            self.http
                .delete(url)
                .header(header::COOKIE, session.cookie_header())
                .header(CSRF_HEADER, session.csrf_token()),
        )
        .await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout_secs))
    }

    // ── Response handling ────────────────────────────────────────────

    /// Read a success body as text; non-success statuses map to
    /// [`Error::Api`].
    pub(crate) async fn read_body(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.status_error(status, resp).await);
        }
        resp.text()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout_secs))
    }

    /// Read a success body and unwrap the `{ data: [...] }` envelope.
    pub(crate) async fn read_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Vec<T>, Error> {
        let body = self.read_body(resp).await?;
        Ok(parse_envelope(&body)?.data)
    }

    /// Check a write response, distinguishing the controller's
    /// `api.err.IdInvalid` report from other failures.
    pub(crate) async fn check_write(&self, id: &str, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && is_id_invalid(&body) {
            return Err(Error::InvalidId { id: id.to_owned() });
        }
        Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body),
        })
    }

    /// Generic non-success mapping: status plus a body preview.
    pub(crate) async fn status_error(
        &self,
        status: StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        let body = resp.text().await.unwrap_or_default();
        Error::Api {
            status: status.as_u16(),
            message: preview(&body),
        }
    }
}

/// Parse the `{ data: [...] }` envelope, keeping the raw body in the
/// error for debugging.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<DataEnvelope<T>, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Typed optional-parse of an error body for the IdInvalid shape.
///
/// Any parse failure or shape mismatch means "not an IdInvalid case";
/// the caller then surfaces its original failure unchanged.
fn is_id_invalid(body: &str) -> bool {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.meta.msg)
        .is_some_and(|msg| msg == ID_INVALID_MSG)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn id_invalid_body_detected() {
        assert!(is_id_invalid(r#"{"meta":{"msg":"api.err.IdInvalid"}}"#));
    }

    #[test]
    fn other_error_body_is_not_id_invalid() {
        assert!(!is_id_invalid(r#"{"meta":{"msg":"api.err.NoSiteContext"}}"#));
    }

    #[test]
    fn shape_mismatch_is_swallowed() {
        assert!(!is_id_invalid(r#"{"error":"bad request"}"#));
        assert!(!is_id_invalid("not json at all"));
        assert!(!is_id_invalid(r#"{"meta":{}}"#));
    }
}

use thiserror::Error;

/// Top-level error type for the `unifi-portfwd` crate.
///
/// The first four variants are the stable, matchable kinds callers are
/// expected to branch on; the rest carry diagnostics for failures the
/// library does not reinterpret.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session lifecycle ───────────────────────────────────────────
    /// Login rejected by the controller, or the login response was
    /// malformed (missing TOKEN cookie, undecodable session token).
    /// Never retried by the library.
    #[error("login failed: {message}")]
    Login {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ── Domain ──────────────────────────────────────────────────────
    /// The supplied rule identifier is empty, or the controller reported
    /// it as unrecognized (404 on read, `api.err.IdInvalid` on write).
    #[error("invalid port forward id: {id:?}")]
    InvalidId { id: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        timeout_secs: u64,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller API ──────────────────────────────────────────────
    /// Non-success response the library does not classify further.
    #[error("controller API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Map a transport failure, giving timeouts their own kind so
    /// callers can apply their own retry policy.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                timeout_secs,
                source: e,
            }
        } else {
            Self::Transport(e)
        }
    }

    /// Returns `true` if the supplied identifier was rejected, either
    /// locally or by the controller.
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, Self::InvalidId { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The library itself never retries; callers use this to drive
    /// their own policy.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

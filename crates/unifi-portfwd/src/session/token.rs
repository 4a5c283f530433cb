// Session token decoding
//
// The login endpoint answers with a signed JWT in the TOKEN cookie. The
// claims we need (expiry, anti-forgery token) sit in the payload segment;
// the signature is not verified — the client trusts the TLS channel, not
// the token issuer's key.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::Error;

/// Minutes subtracted from the token expiry to absorb clock skew between
/// client and controller.
const EXPIRY_MARGIN_MINUTES: i64 = 10;

/// One authenticated context, produced by a successful login.
///
/// Immutable: a fresh login always yields a brand-new `Session`. The
/// encoded token goes out as the `TOKEN` cookie on every request; the
/// anti-forgery token as the `X-CSRF-Token` header on mutations.
#[derive(Clone)]
pub struct Session {
    token: String,
    csrf_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(token: String, csrf_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            csrf_token,
            expires_at,
        }
    }

    /// The encoded session token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The anti-forgery token for state-changing requests.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Token expiry minus the safety margin; the session must not be
    /// used at or past this instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `Cookie` header value carrying this session.
    pub(crate) fn cookie_header(&self) -> String {
        format!("TOKEN={}", self.token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("csrf_token", &self.csrf_token)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Claims read from the session token payload.
#[derive(Deserialize)]
struct SessionClaims {
    /// Expiry, seconds since the Unix epoch.
    exp: i64,
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// Decode an encoded session token into a [`Session`].
///
/// Splits out the JWT payload segment, base64url-decodes it, and reads
/// the `exp` and `csrfToken` claims. Anything malformed is a protocol
/// violation from the login endpoint, reported as [`Error::Login`].
pub(crate) fn decode(encoded: &str) -> Result<Session, Error> {
    let payload = encoded
        .split('.')
        .nth(1)
        .ok_or_else(|| malformed("session token is not a JWT"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| malformed(&format!("session token payload is not base64url: {e}")))?;

    let claims: SessionClaims = serde_json::from_slice(&bytes)
        .map_err(|e| malformed(&format!("session token claims undecodable: {e}")))?;

    let expiry = DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| malformed("session token exp claim out of range"))?;

    Ok(Session::new(
        encoded.to_owned(),
        claims.csrf_token,
        expiry - Duration::minutes(EXPIRY_MARGIN_MINUTES),
    ))
}

fn malformed(message: &str) -> Error {
    Error::Login {
        message: message.to_owned(),
        source: None,
    }
}

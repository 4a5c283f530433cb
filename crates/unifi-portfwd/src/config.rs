// Construction-time configuration
//
// Everything the client needs is fixed here before the first request:
// base URL, credentials, certificate trust, site, default interface, and
// timeout. Nothing is mutated after construction.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::Error;

/// Default request timeout when none is configured.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Username/password pair for the controller login endpoint.
///
/// Supplied once at construction and never mutated. The password lives in
/// a [`SecretString`] and is only exposed at the moment the login body is
/// serialized.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Options for building a [`PortForwardClient`](crate::PortForwardClient).
///
/// Immutable after construction; the HTTP client, URLs, and session
/// manager are all derived from this once.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Controller root, e.g. `https://192.168.1.1`.
    pub base_url: Url,
    pub credentials: Credentials,
    /// Accept any certificate (for self-signed controllers).
    pub allow_invalid_certs: bool,
    /// Site identifier in resource URLs. Nearly always `"default"`.
    pub site: String,
    /// Interface substituted into create forms that leave it unset.
    pub default_interface: Option<String>,
    /// Total request timeout in seconds; 30 when unset.
    pub timeout_secs: Option<u64>,
}

impl ClientOptions {
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            allow_invalid_certs: false,
            site: "default".to_owned(),
            default_interface: None,
            timeout_secs: None,
        }
    }

    /// The configured timeout, or the 30-second default.
    pub(crate) fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Build the `reqwest::Client` shared by the session manager and the
    /// resource client.
    pub(crate) fn build_http(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.effective_timeout_secs()))
            .user_agent(concat!("unifi-portfwd/", env!("CARGO_PKG_VERSION")));

        if self.allow_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

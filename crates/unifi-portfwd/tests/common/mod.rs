// Shared fixtures for the wiremock-backed integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unifi_portfwd::{ClientOptions, Clock, Credentials, PortForwardClient};

/// The csrf claim baked into every fixture token.
pub const CSRF: &str = "csrf-token-fixture";

/// Test clock with a settable current time, shared by handle.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn login_time() -> DateTime<Utc> {
    "2021-10-11T14:33:00Z".parse().unwrap()
}

/// An encoded session token whose payload carries the given expiry and
/// the fixture csrf claim. The signature segment is never checked.
pub fn make_token(expires: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "exp": expires.timestamp(), "csrfToken": CSRF }).to_string(),
    );
    format!("{header}.{payload}.fixture-signature")
}

/// Mount a successful login that answers with a TOKEN cookie and expects
/// exactly `expect` calls.
pub async fn mount_login(server: &MockServer, token: &str, expect: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "foo", "password": "bar" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("TOKEN={token}; Path=/; HttpOnly")),
        )
        .expect(expect)
        .mount(server)
        .await;
}

pub fn options_for(server: &MockServer) -> ClientOptions {
    let mut options = ClientOptions::new(
        Url::parse(&server.uri()).unwrap(),
        Credentials::new("foo", "bar".to_owned()),
    );
    options.default_interface = Some("wan".to_owned());
    options
}

pub fn client_for(server: &MockServer, clock: &ManualClock) -> PortForwardClient {
    PortForwardClient::with_clock(options_for(server), Box::new(clock.clone())).unwrap()
}

/// Site-scoped collection path on the mock controller.
pub fn collection_path() -> String {
    "/proxy/network/api/s/default/rest/portforward".to_owned()
}

pub fn item_path(id: &str) -> String {
    format!("{}/{id}", collection_path())
}

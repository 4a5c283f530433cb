// unifi-portfwd: Async Rust client for UniFi port forwarding rules (UniFi OS)

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod portforward;
pub mod session;

pub use client::PortForwardClient;
pub use config::{ClientOptions, Credentials};
pub use error::Error;
pub use models::{PortForward, PortForwardForm};
pub use session::cache::{Clock, SystemClock, TokenCache};
pub use session::{Session, SessionManager};

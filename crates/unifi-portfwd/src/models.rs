// Wire types for the port forward endpoints
//
// The controller wraps payloads in a `{ "data": [...] }` envelope and
// reports write failures as `{ "meta": { "msg": "api.err.*" } }`. Entity
// fields use short server-side names; `#[serde(default)]` is applied
// liberally because field presence varies across firmware versions.

use serde::{Deserialize, Serialize};

/// Success envelope: `{ "data": [entity, ...] }`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct DataEnvelope<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

/// Error envelope on non-success responses: `{ "meta": { "msg": "..." } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub meta: ErrorMeta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorMeta {
    #[serde(default)]
    pub msg: Option<String>,
}

/// One port forwarding rule as the controller stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortForward {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    /// Source address restriction, `"any"` for none.
    #[serde(default, rename = "src")]
    pub source: String,
    /// External port (the controller keeps ports as strings).
    #[serde(default, rename = "dst_port")]
    pub destination_port: String,
    /// Internal target address.
    #[serde(default, rename = "fwd")]
    pub forward: String,
    #[serde(default, rename = "fwd_port")]
    pub forward_port: String,
    /// `tcp`, `udp`, or `tcp_udp`.
    #[serde(default, rename = "proto")]
    pub protocol: String,
    #[serde(default)]
    pub log: bool,
    #[serde(default, rename = "pfwd_interface")]
    pub interface: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Create/update payload for a port forwarding rule.
///
/// Omits the server-assigned `id`. Unset fields are left out of the JSON
/// body entirely; an unset `interface` is filled with the client's
/// configured default before transmission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortForwardForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "pfwd_interface", skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(rename = "src", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "dst_port", skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,
    #[serde(rename = "fwd", skip_serializing_if = "Option::is_none")]
    pub forward: Option<String>,
    #[serde(rename = "fwd_port", skip_serializing_if = "Option::is_none")]
    pub forward_port: Option<String>,
    #[serde(rename = "proto", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<bool>,
    #[serde(rename = "site_id", skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
}

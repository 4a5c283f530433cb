// Port forward endpoints
//
// CRUD over `rest/portforward`. Identifiers are validated locally before
// any network traffic; the controller's 404s and `api.err.IdInvalid`
// reports both surface as `Error::InvalidId`.

use reqwest::StatusCode;
use tracing::debug;

use crate::client::{PortForwardClient, parse_envelope};
use crate::error::Error;
use crate::models::{DataEnvelope, PortForward, PortForwardForm};

impl PortForwardClient {
    /// List all port forwarding rules for the site.
    ///
    /// `GET /proxy/network/api/s/{site}/rest/portforward`
    pub async fn list_port_forwards(&self) -> Result<Vec<PortForward>, Error> {
        let url = self.collection_url();
        debug!("listing port forwards");
        let resp = self.get(url).await?;
        self.read_envelope(resp).await
    }

    /// Fetch a single rule by id.
    ///
    /// A 404 from the controller means the id is unrecognized and maps to
    /// [`Error::InvalidId`]. A success response with an empty `data`
    /// envelope yields `None`.
    pub async fn get_port_forward(&self, id: &str) -> Result<Option<PortForward>, Error> {
        validate_id(id)?;
        let url = self.item_url(id);
        debug!("fetching port forward {id}");

        let resp = self.get(url).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::InvalidId { id: id.to_owned() });
        }

        let entries: Vec<PortForward> = self.read_envelope(resp).await?;
        Ok(entries.into_iter().next())
    }

    /// Create a rule; the controller assigns the id.
    ///
    /// A form without an interface gets the client's configured default
    /// before transmission.
    pub async fn create_port_forward(
        &self,
        mut form: PortForwardForm,
    ) -> Result<PortForward, Error> {
        if form.interface.is_none() {
            form.interface = self.default_interface().map(str::to_owned);
        }

        let url = self.collection_url();
        debug!("creating port forward {:?}", form.name);

        let resp = self.post(url, &form).await?;
        let body = self.read_body(resp).await?;
        let envelope: DataEnvelope<PortForward> = parse_envelope(&body)?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::Deserialization {
                message: "create response contained no port forward entry".to_owned(),
                body,
            })
    }

    /// Replace an existing rule.
    ///
    /// `PUT /proxy/network/api/s/{site}/rest/portforward/{id}`
    pub async fn update_port_forward(
        &self,
        id: &str,
        form: &PortForwardForm,
    ) -> Result<(), Error> {
        validate_id(id)?;
        let url = self.item_url(id);
        debug!("updating port forward {id}");

        let resp = self.put(url, form).await?;
        self.check_write(id, resp).await
    }

    /// Delete a rule.
    ///
    /// `DELETE /proxy/network/api/s/{site}/rest/portforward/{id}`
    pub async fn delete_port_forward(&self, id: &str) -> Result<(), Error> {
        validate_id(id)?;
        let url = self.item_url(id);
        debug!("deleting port forward {id}");

        let resp = self.delete(url).await?;
        self.check_write(id, resp).await
    }
}

/// Reject empty identifiers before any network call.
fn validate_id(id: &str) -> Result<(), Error> {
    if id.trim().is_empty() {
        return Err(Error::InvalidId { id: id.to_owned() });
    }
    Ok(())
}

//! Registration with the resource directory.
//!
//! One `POST <registration_path>?ep=<name>` with the link-format document as
//! body.  Only a flattened `201` counts as success; its location path becomes
//! the [`SessionHandle`].

use std::net::SocketAddr;
use std::sync::Arc;

use rd_protocol::{
    ContentFormat, EndpointId, LinkFormatDocument, Method, Request, ResponseCode, SessionHandle,
};

use crate::transport::Transport;
use crate::types::{NodeError, TransportError};

/// Result of a registration exchange that reached a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// `2.01 Created` with a usable location path.
    Registered(SessionHandle),
    /// The directory answered with anything other than `2.01`.
    Rejected(ResponseCode),
    /// Retransmissions exhausted.
    NoResponse,
}

/// Sends the registration request and interprets the answer.
#[derive(Clone)]
pub struct RegistrationClient {
    transport: Arc<dyn Transport>,
    directory: SocketAddr,
    registration_path: String,
}

impl RegistrationClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        directory: SocketAddr,
        registration_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            directory,
            registration_path: registration_path.into(),
        }
    }

    /// Build the registration request without sending it.
    pub fn request(&self, endpoint: &EndpointId, links: &LinkFormatDocument) -> Request {
        Request::new(Method::Post, self.registration_path.clone())
            .with_query(endpoint.as_str())
            .with_content_format(ContentFormat::LinkFormat)
            .with_payload(links.as_str())
    }

    /// Register `links` under `endpoint`.
    ///
    /// `Err` is reserved for local faults: a `2.01` whose location is missing
    /// or does not fit in a [`SessionHandle`], or a request that could not be
    /// framed.
    pub async fn register(
        &self,
        endpoint: &EndpointId,
        links: &LinkFormatDocument,
    ) -> Result<RegistrationOutcome, NodeError> {
        let request = self.request(endpoint, links);
        tracing::info!(
            directory = %self.directory,
            path = %self.registration_path,
            endpoint = %endpoint,
            payload_bytes = links.len(),
            "registering with directory"
        );

        let response = match self.transport.send(request, self.directory).await {
            Ok(r) => r,
            Err(TransportError::NoResponse { attempts }) => {
                tracing::error!(attempts, "directory did not answer registration");
                return Ok(RegistrationOutcome::NoResponse);
            }
            Err(e) => return Err(e.into()),
        };

        if response.code.flattened() != ResponseCode::CREATED.flattened() {
            tracing::error!(code = %response.code, "registration rejected");
            return Ok(RegistrationOutcome::Rejected(response.code));
        }

        let location = response
            .location_path
            .as_deref()
            .filter(|l| !l.is_empty())
            .ok_or(NodeError::MissingLocation)?;
        let handle = SessionHandle::new(location)?;
        tracing::info!(handle = %handle, "registered");
        Ok(RegistrationOutcome::Registered(handle))
    }
}

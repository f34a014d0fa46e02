//! Core types: local events, resource-handler context and errors, SDK errors.

use rd_protocol::{ProtocolError, ResponseCode};

/// A locally generated trigger fed into the node loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// The user button (or its stand-in) was pressed.
    ButtonPressed,
}

/// Context provided to every resource handler invocation.
#[derive(Clone, Debug)]
pub struct ResourceContext {
    /// Normalized resource path (no leading `/`).
    pub path: String,
    /// Query parameters from the request, in order.
    pub query: Vec<String>,
}

/// Result type for resource handlers.
pub type ResourceResult = Result<rd_protocol::Response, ResourceError>;

/// Errors a resource handler can return.
///
/// The table translates these into an error response; each variant maps
/// 1:1 to a response code.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ResourceError {
    #[error("bad_request: {0}")]
    BadRequest(String),
    #[error("method_not_allowed")]
    MethodNotAllowed,
    #[error("too_large: {0}")]
    TooLarge(String),
    #[error("failed: {0}")]
    Failed(String),
}

impl ResourceError {
    pub fn code(&self) -> ResponseCode {
        match self {
            ResourceError::BadRequest(_) => ResponseCode::BAD_REQUEST,
            ResourceError::MethodNotAllowed => ResponseCode::METHOD_NOT_ALLOWED,
            ResourceError::TooLarge(_) => ResponseCode::REQUEST_ENTITY_TOO_LARGE,
            ResourceError::Failed(_) => ResponseCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Retransmissions exhausted without a matching response.
    #[error("no response after {attempts} attempts")]
    NoResponse { attempts: u32 },
    /// The request could not be framed for the wire.
    #[error("framing: {0}")]
    Frame(String),
}

/// Top-level SDK error.
#[derive(thiserror::Error, Debug)]
pub enum NodeError {
    #[error("config: {0}")]
    Config(String),
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("registration rejected by directory: {0}")]
    RegistrationRejected(ResponseCode),
    #[error("registration failed: no response from directory")]
    RegistrationTimeout,
    #[error("registration response carried no location path")]
    MissingLocation,
    #[error("shutdown")]
    Shutdown,
}

//! Resource-directory protocol: message model, endpoint naming, link-format
//! serialization, and session handles.
//!
//! Nodes register their resource set with a remote directory using a single
//! create request (`POST /rd?ep=<name>` with a link-format body).  The
//! directory answers `2.01 Created` with a location token; every later update
//! from the node is addressed under that token.

pub mod endpoint;
pub mod error;
pub mod link_format;
pub mod message;
pub mod session;

pub use endpoint::{build_endpoint_id, EndpointId, LinkAddr, ENDPOINT_ID_CAPACITY, HW_ADDR_LEN};
pub use error::ProtocolError;
pub use link_format::{encode, LinkFormatDocument, ResourceDescriptor, DEFAULT_MAX_PAYLOAD};
pub use message::{ContentFormat, Method, Request, Response, ResponseCode, WireFrame};
pub use session::{SessionHandle, SESSION_HANDLE_CAPACITY};

/// Path under which a node serves its own link-format description.
pub const WELL_KNOWN_CORE: &str = "/.well-known/core";

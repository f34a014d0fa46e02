//! `rd-node-sdk` — building blocks for a node that registers its resources
//! with a remote resource directory and publishes updates under the session
//! handle the directory hands back.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  Your Node (CLI / embedded host / simulator)              │
//! │                                                           │
//! │   let mut table = ResourceTable::new();                   │
//! │   table.activate("actuators/toggle", None, Toggle);       │
//! │                                                           │
//! │   NodeBuilder::new()                                      │
//! │       .directory("[aaaa::1]:5683".parse()?)               │
//! │       .hw_addr("00:12:4b:00:06:0d:b2:a1".parse()?)        │
//! │       .resources(table)                                   │
//! │       .build()?                                           │
//! │       .run(events, shutdown)                              │
//! │       .await;                                             │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Node lifecycle (hard-coded by the SDK)
//!
//! 1. Derive `ep=<name>` from the hardware address
//! 2. Arm the one-shot registration timer
//! 3. On expiry: encode the resource table as link-format and send
//!    `POST <registration_path>?ep=<name>`
//! 4. `2.01 Created` → keep the location path as the session handle;
//!    anything else (or no response) → the node stops
//! 5. Main loop: every [`NodeEvent`] becomes a `PUT <handle>/<sub-path>`
//!
//! Exactly one exchange is ever in flight: the loop awaits each one before
//! looking at the next event.  Requests the directory sends back over an open
//! exchange are answered from the resource table (see [`WsTransport`]).

pub mod builder;
pub mod node;
pub mod registration;
pub mod resources;
pub mod retransmit;
pub mod router;
pub mod transport;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::NodeBuilder;
pub use node::{EventOutcome, Node, NodeState};
pub use registration::{RegistrationClient, RegistrationOutcome};
pub use resources::{Resource, ResourceTable};
pub use retransmit::RetransmitPolicy;
pub use router::EventRouter;
pub use transport::{Transport, WsTransport};
pub use types::{
    NodeError, NodeEvent, ResourceContext, ResourceError, ResourceResult, TransportError,
};

// Re-export protocol types so nodes never need to import rd-protocol directly.
pub use rd_protocol::{
    ContentFormat, EndpointId, LinkAddr, LinkFormatDocument, Method, ProtocolError, Request,
    ResourceDescriptor, Response, ResponseCode, SessionHandle, SESSION_HANDLE_CAPACITY,
    WELL_KNOWN_CORE,
};

//! Builder pattern for constructing a [`Node`].

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use rd_domain::config::Config;
use rd_protocol::{LinkAddr, DEFAULT_MAX_PAYLOAD};

use crate::node::{Node, NodeState};
use crate::registration::RegistrationClient;
use crate::resources::ResourceTable;
use crate::retransmit::{jitter_seed, RetransmitPolicy};
use crate::router::EventRouter;
use crate::transport::{Transport, WsTransport};
use crate::types::NodeError;

/// Fluent builder for [`Node`].
///
/// # Example
///
/// ```rust,no_run
/// # use rd_node_sdk::{NodeBuilder, ResourceTable};
/// let node = NodeBuilder::new()
///     .directory("[aaaa::1]:5683".parse().unwrap())
///     .hw_addr("00:12:4b:00:06:0d:b2:a1".parse().unwrap())
///     .registration_delay(std::time::Duration::from_secs(3))
///     .resources(ResourceTable::new())
///     .build()
///     .unwrap();
/// ```
pub struct NodeBuilder {
    pub(crate) directory: SocketAddr,
    pub(crate) registration_path: String,
    pub(crate) hw_addr: LinkAddr,
    pub(crate) registration_delay: Duration,
    pub(crate) update_sub_path: String,
    pub(crate) max_payload_bytes: usize,
    pub(crate) max_uri_bytes: usize,
    pub(crate) retransmit: RetransmitPolicy,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) resources: ResourceTable,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self {
            directory: SocketAddr::new(IpAddr::V6(Ipv6Addr::new(0xaaaa, 0, 0, 0, 0, 0, 0, 1)), 5683),
            registration_path: "/rd".into(),
            hw_addr: LinkAddr([0x00, 0x12, 0x4b, 0x00, 0x00, 0x00, 0x00, 0x01]),
            registration_delay: Duration::from_secs(3),
            update_sub_path: "actuators/button".into(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD,
            max_uri_bytes: 40,
            retransmit: RetransmitPolicy::default(),
            transport: None,
            resources: ResourceTable::new(),
        }
    }

    /// Seed every setting from a loaded [`Config`].  Resources and transport
    /// are still up to the caller.
    pub fn from_config(cfg: &Config) -> Result<Self, NodeError> {
        let ip: IpAddr = cfg.directory.address.parse().map_err(|_| {
            NodeError::Config(format!(
                "directory.address: '{}' is not an IP address",
                cfg.directory.address
            ))
        })?;
        let hw_addr: LinkAddr = cfg
            .node
            .hw_addr
            .parse()
            .map_err(|e| NodeError::Config(format!("node.hw_addr: {e}")))?;

        Ok(Self::new()
            .directory(SocketAddr::new(ip, cfg.directory.port))
            .registration_path(cfg.directory.registration_path.clone())
            .hw_addr(hw_addr)
            .registration_delay(Duration::from_secs(cfg.node.registration_delay_secs))
            .update_sub_path(cfg.node.update_sub_path.clone())
            .limits(cfg.limits.max_payload_bytes, cfg.limits.max_uri_bytes)
            .retransmit(RetransmitPolicy::from_config(&cfg.transport)))
    }

    // ── Directory ────────────────────────────────────────────────────

    /// Directory address (default `[aaaa::1]:5683`).
    pub fn directory(mut self, addr: SocketAddr) -> Self {
        self.directory = addr;
        self
    }

    /// Registration path (default `/rd`; `/ms` for a mirror server).
    pub fn registration_path(mut self, path: impl Into<String>) -> Self {
        self.registration_path = path.into();
        self
    }

    // ── Identity / behavior ──────────────────────────────────────────

    pub fn hw_addr(mut self, addr: LinkAddr) -> Self {
        self.hw_addr = addr;
        self
    }

    /// One-shot delay before registering (default 3s).
    pub fn registration_delay(mut self, d: Duration) -> Self {
        self.registration_delay = d;
        self
    }

    /// Path appended to the session handle for updates.
    pub fn update_sub_path(mut self, path: impl Into<String>) -> Self {
        self.update_sub_path = path.into();
        self
    }

    pub fn resources(mut self, table: ResourceTable) -> Self {
        self.resources = table;
        self
    }

    // ── Wire ─────────────────────────────────────────────────────────

    /// Payload and URI ceilings (default 256 / 40 bytes).
    pub fn limits(mut self, max_payload_bytes: usize, max_uri_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self.max_uri_bytes = max_uri_bytes;
        self
    }

    /// Retransmission policy for the default [`WsTransport`].  Ignored when a
    /// custom transport is supplied.
    pub fn retransmit(mut self, policy: RetransmitPolicy) -> Self {
        self.retransmit = policy;
        self
    }

    /// Replace the default WebSocket transport.  A custom transport is
    /// responsible for serving inbound requests itself.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the [`Node`].
    pub fn build(self) -> Result<Node, NodeError> {
        if !self.registration_path.starts_with('/') {
            return Err(NodeError::Config(
                "registration_path must start with '/'".into(),
            ));
        }
        if self.update_sub_path.trim_matches('/').is_empty() {
            return Err(NodeError::Config("update_sub_path is required".into()));
        }

        let endpoint_id = self.hw_addr.endpoint_id()?;
        let resources = self.resources.with_max_payload(self.max_payload_bytes);
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                WsTransport::new(self.retransmit)
                    .jitter_seed(jitter_seed(endpoint_id.as_str().as_bytes()))
                    .serving(resources.clone()),
            ),
        };

        Ok(Node {
            endpoint_id,
            resources,
            registration: RegistrationClient::new(
                transport.clone(),
                self.directory,
                self.registration_path,
            ),
            router: EventRouter::new(
                transport,
                self.directory,
                self.update_sub_path,
                self.max_uri_bytes,
                self.max_payload_bytes,
            ),
            registration_delay: self.registration_delay,
            max_payload_bytes: self.max_payload_bytes,
            state: NodeState::Unregistered,
            presses: 0,
        })
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

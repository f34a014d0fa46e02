//! Node loop: owns the endpoint identity, the session handle and the press
//! counter, and drives registration followed by event publishing.

use std::time::Duration;

use rd_protocol::{EndpointId, ResponseCode, SessionHandle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::registration::{RegistrationClient, RegistrationOutcome};
use crate::resources::ResourceTable;
use crate::router::EventRouter;
use crate::types::{NodeError, NodeEvent};

/// Where the node is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Unregistered,
    AwaitingRegistrationTimer,
    Registering,
    Registered(SessionHandle),
    /// Terminal: registration did not succeed.
    Failed,
}

/// What happened to a single [`NodeEvent`].
#[derive(Debug)]
pub enum EventOutcome {
    /// The directory answered the update.
    Published(ResponseCode),
    /// The update could not be built or sent.  The node keeps running.
    UpdateFailed(NodeError),
    /// The node was not registered yet; the event was discarded.
    Dropped,
}

/// A fully-configured node.
///
/// Create via [`NodeBuilder`](crate::builder::NodeBuilder).
pub struct Node {
    pub(crate) endpoint_id: EndpointId,
    pub(crate) resources: ResourceTable,
    pub(crate) registration: RegistrationClient,
    pub(crate) router: EventRouter,
    pub(crate) registration_delay: Duration,
    pub(crate) max_payload_bytes: usize,
    pub(crate) state: NodeState,
    pub(crate) presses: u64,
}

impl Node {
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        match &self.state {
            NodeState::Registered(handle) => Some(handle),
            _ => None,
        }
    }

    /// Number of events serviced since registration.
    pub fn presses(&self) -> u64 {
        self.presses
    }

    pub fn endpoint_id(&self) -> &EndpointId {
        &self.endpoint_id
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn registration_delay(&self) -> Duration {
        self.registration_delay
    }

    /// Arm the one-shot registration timer.  Returns the delay to wait.
    pub fn arm(&mut self) -> Duration {
        if self.state == NodeState::Unregistered {
            self.state = NodeState::AwaitingRegistrationTimer;
        }
        tracing::debug!(
            endpoint = %self.endpoint_id,
            delay_ms = self.registration_delay.as_millis() as u64,
            "registration timer armed"
        );
        self.registration_delay
    }

    /// Registration timer fired: encode the resource table and register.
    ///
    /// Any failure leaves the node in [`NodeState::Failed`].
    pub async fn on_timer_expired(&mut self) -> Result<SessionHandle, NodeError> {
        self.state = NodeState::Registering;
        let result = self.register().await;
        match &result {
            Ok(handle) => self.state = NodeState::Registered(handle.clone()),
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint_id,
                    error = %e,
                    "registration failed, node stopping"
                );
                self.state = NodeState::Failed;
            }
        }
        result
    }

    async fn register(&self) -> Result<SessionHandle, NodeError> {
        let links = self.resources.link_format(self.max_payload_bytes)?;
        match self.registration.register(&self.endpoint_id, &links).await? {
            RegistrationOutcome::Registered(handle) => Ok(handle),
            RegistrationOutcome::Rejected(code) => Err(NodeError::RegistrationRejected(code)),
            RegistrationOutcome::NoResponse => Err(NodeError::RegistrationTimeout),
        }
    }

    /// Service one local trigger.  Only a registered node publishes.
    pub async fn on_event(&mut self, event: NodeEvent) -> EventOutcome {
        let NodeState::Registered(handle) = &self.state else {
            tracing::warn!(?event, state = ?self.state, "node not registered, dropping event");
            return EventOutcome::Dropped;
        };
        let handle = handle.clone();

        self.presses += 1;
        match event {
            NodeEvent::ButtonPressed => {
                match self.router.publish(&handle, self.presses).await {
                    Ok(code) => {
                        tracing::info!(counter = self.presses, code = %code, "update answered");
                        EventOutcome::Published(code)
                    }
                    Err(e) => {
                        tracing::warn!(counter = self.presses, error = %e, "update failed");
                        EventOutcome::UpdateFailed(e)
                    }
                }
            }
        }
    }

    /// Run the node until the event stream ends or `shutdown` is cancelled.
    ///
    /// Returns `Err` if registration fails (the node never services events
    /// in that case) and [`NodeError::Shutdown`] on cancellation.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<NodeEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), NodeError> {
        tracing::info!(endpoint = %self.endpoint_id, resources = self.resources.len(), "node starting");

        // ── Registration timer ───────────────────────────────────────
        let timer = tokio::time::sleep(self.arm());
        tokio::pin!(timer);
        let mut events_open = true;

        loop {
            tokio::select! {
                _ = &mut timer => break,
                ev = events.recv(), if events_open => match ev {
                    Some(ev) => {
                        self.on_event(ev).await;
                    }
                    None => events_open = false,
                },
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested");
                    return Err(NodeError::Shutdown);
                }
            }
        }

        // ── Registration ─────────────────────────────────────────────
        tokio::select! {
            r = self.on_timer_expired() => { r?; }
            _ = shutdown.cancelled() => {
                tracing::info!("shutdown requested during registration");
                return Err(NodeError::Shutdown);
            }
        }

        // Triggers queued while registering predate the session.
        while let Ok(ev) = events.try_recv() {
            tracing::warn!(?ev, "event queued before registration, dropping");
        }

        // ── Event loop ───────────────────────────────────────────────
        loop {
            let ev = tokio::select! {
                ev = events.recv() => ev,
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested");
                    return Err(NodeError::Shutdown);
                }
            };

            let Some(ev) = ev else {
                tracing::info!(presses = self.presses, "event stream closed, node stopping");
                return Ok(());
            };

            tokio::select! {
                _ = self.on_event(ev) => {}
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested during update");
                    return Err(NodeError::Shutdown);
                }
            }
        }
    }

    /// Same as [`run`](Self::run), but returns a `JoinHandle` for embedding
    /// in a host runtime.
    pub fn spawn(
        self,
        events: mpsc::Receiver<NodeEvent>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<Result<(), NodeError>> {
        tokio::spawn(async move { self.run(events, shutdown).await })
    }
}

//! Confirmable request/response exchange with the directory.
//!
//! [`Transport`] is the seam between the node loop and the network.  The
//! shipped [`WsTransport`] carries one JSON [`WireFrame`] per WebSocket text
//! message; tests substitute an in-memory implementation.
//!
//! While a connection is open the directory may address the node itself:
//! inbound request frames are answered from the node's [`ResourceTable`]
//! on the same connection, echoing their `message_id`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};

use futures_util::{SinkExt, StreamExt};
use rd_protocol::{Request, Response, WireFrame};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;

use crate::resources::ResourceTable;
use crate::retransmit::RetransmitPolicy;
use crate::types::TransportError;

/// Inbound frames larger than this are ignored.
const MAX_FRAME_BYTES: usize = 4 * 1024;

/// Sends a request to `target` and waits for the matching response,
/// retransmitting as the implementation sees fit.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: Request, target: SocketAddr) -> Result<Response, TransportError>;
}

/// WebSocket transport: `ws://<target>/`, one exchange per connection.
pub struct WsTransport {
    policy: RetransmitPolicy,
    next_message_id: AtomicU16,
    jitter_seed: u32,
    resources: Option<ResourceTable>,
}

impl WsTransport {
    pub fn new(policy: RetransmitPolicy) -> Self {
        Self {
            policy,
            next_message_id: AtomicU16::new(1),
            jitter_seed: 0,
            resources: None,
        }
    }

    /// Per-node seed mixed into every exchange's timeout spread.
    pub fn jitter_seed(mut self, seed: u32) -> Self {
        self.jitter_seed = seed;
        self
    }

    /// Answer inbound requests from `table`.  Without a table they are
    /// ignored.
    pub fn serving(mut self, table: ResourceTable) -> Self {
        self.resources = Some(table);
        self
    }

    fn url(target: SocketAddr) -> String {
        format!("ws://{target}/")
    }

    /// A single transmission: connect, send, read frames until the response
    /// with `message_id` arrives or the peer goes away.
    async fn exchange(
        &self,
        url: &str,
        message_id: u16,
        frame_json: &str,
    ) -> Result<Response, anyhow::Error> {
        let (ws, _response) = tokio_tungstenite::connect_async(url).await?;
        let (mut sink, mut stream) = ws.split();

        sink.send(Message::Text(frame_json.to_owned())).await?;

        while let Some(msg) = stream.next().await {
            match msg? {
                Message::Text(text) => {
                    if text.len() > MAX_FRAME_BYTES {
                        tracing::warn!(
                            bytes = text.len(),
                            max = MAX_FRAME_BYTES,
                            "inbound frame exceeds max frame size, dropping"
                        );
                        continue;
                    }
                    match serde_json::from_str::<WireFrame>(&text) {
                        Ok(WireFrame::Response {
                            message_id: id,
                            response,
                        }) if id == message_id => {
                            let _ = sink.close().await;
                            return Ok(response);
                        }
                        Ok(WireFrame::Request {
                            message_id: id,
                            request,
                        }) => {
                            let Some(table) = &self.resources else {
                                tracing::debug!(message_id = id, "no resources to serve, ignoring request");
                                continue;
                            };
                            tracing::debug!(
                                message_id = id,
                                method = %request.method,
                                path = %request.uri_path,
                                "serving inbound request"
                            );
                            let response = table.dispatch(request).await;
                            let reply = serde_json::to_string(&WireFrame::Response {
                                message_id: id,
                                response,
                            })?;
                            sink.send(Message::Text(reply)).await?;
                        }
                        Ok(other) => {
                            tracing::debug!(
                                message_id = other.message_id(),
                                expected = message_id,
                                "ignoring unrelated frame"
                            );
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "failed to parse frame");
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }

        Err(anyhow::anyhow!("connection closed before response"))
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(RetransmitPolicy::default())
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    async fn send(&self, request: Request, target: SocketAddr) -> Result<Response, TransportError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        let frame = WireFrame::Request {
            message_id,
            request,
        };
        let json = serde_json::to_string(&frame).map_err(|e| TransportError::Frame(e.to_string()))?;
        let url = Self::url(target);
        let attempts = self.policy.attempts();
        let seed = self.jitter_seed ^ u32::from(message_id);

        for attempt in 0..attempts {
            let deadline = Instant::now() + self.policy.timeout_for_attempt(attempt, seed);
            tracing::debug!(url = %url, message_id, attempt, "transmitting");

            match tokio::time::timeout_at(deadline, self.exchange(&url, message_id, &json)).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    tracing::debug!(message_id, attempt, error = %e, "transmission failed");
                    // Hold the retransmission until the attempt's timer fires.
                    tokio::time::sleep_until(deadline).await;
                }
                Err(_) => {
                    tracing::debug!(message_id, attempt, "response timeout");
                }
            }
        }

        tracing::warn!(url = %url, message_id, attempts, "retransmissions exhausted");
        Err(TransportError::NoResponse { attempts })
    }
}

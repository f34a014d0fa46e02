use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transport retransmission
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Retransmission parameters for confirmable exchanges.
///
/// Defaults follow the usual constrained-network values: a 2 s initial
/// acknowledgement timeout doubled on every retry, four retransmissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "d_2000")]
    pub ack_timeout_ms: u64,
    #[serde(default = "d_backoff")]
    pub backoff_factor: f64,
    #[serde(default = "d_4")]
    pub max_retransmit: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: d_2000(),
            backoff_factor: d_backoff(),
            max_retransmit: d_4(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payload limits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fixed ceilings for outbound documents and request paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest link-format document or update body the node will send.
    #[serde(default = "d_256")]
    pub max_payload_bytes: usize,
    /// Largest scoped update path (`<handle>/<sub-path>`).
    #[serde(default = "d_40")]
    pub max_uri_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: d_256(),
            max_uri_bytes: d_40(),
        }
    }
}

fn d_2000() -> u64 {
    2000
}
fn d_backoff() -> f64 {
    2.0
}
fn d_4() -> u32 {
    4
}
fn d_256() -> usize {
    256
}
fn d_40() -> usize {
    40
}

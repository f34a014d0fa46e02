use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Node identity and behavior
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// 8-byte link-layer address, e.g. `00:12:4b:00:00:00:00:01`.
    /// The endpoint name is derived from it.
    #[serde(default = "d_hw_addr")]
    pub hw_addr: String,
    /// Delay between boot and the registration exchange.
    #[serde(default = "d_3")]
    pub registration_delay_secs: u64,
    /// Path appended to the session handle for button updates.
    #[serde(default = "d_update_sub_path")]
    pub update_sub_path: String,
    /// Capacity of the local trigger queue.
    #[serde(default = "d_16")]
    pub event_queue: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            hw_addr: d_hw_addr(),
            registration_delay_secs: d_3(),
            update_sub_path: d_update_sub_path(),
            event_queue: d_16(),
        }
    }
}

fn d_hw_addr() -> String {
    "00:12:4b:00:00:00:00:01".into()
}
fn d_3() -> u64 {
    3
}
fn d_update_sub_path() -> String {
    "actuators/button".into()
}
fn d_16() -> usize {
    16
}

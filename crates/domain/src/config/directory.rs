use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resource directory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the resource directory (or mirror server) lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// IP literal of the directory host.
    #[serde(default = "d_address")]
    pub address: String,
    #[serde(default = "d_5683")]
    pub port: u16,
    /// Well-known registration path (`/rd` for a resource directory,
    /// `/ms` for a mirror server).
    #[serde(default = "d_registration_path")]
    pub registration_path: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            address: d_address(),
            port: d_5683(),
            registration_path: d_registration_path(),
        }
    }
}

fn d_address() -> String {
    "aaaa::1".into()
}
fn d_5683() -> u16 {
    5683
}
fn d_registration_path() -> String {
    "/rd".into()
}

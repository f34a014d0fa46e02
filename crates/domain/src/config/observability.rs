use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Logging
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Log output configuration.
///
/// `RUST_LOG` still wins over `log_filter` when it is set, so operators can
/// raise verbosity without editing the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "d_log_filter")]
    pub log_filter: String,
    /// Emit one JSON object per line instead of the human-readable format.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: d_log_filter(),
            json_logs: false,
        }
    }
}

fn d_log_filter() -> String {
    "info".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain_text_info() {
        let cfg = ObservabilityConfig::default();
        assert_eq!(cfg.log_filter, "info");
        assert!(!cfg.json_logs);
    }

    #[test]
    fn json_logs_parses() {
        let cfg: ObservabilityConfig = toml::from_str("json_logs = true").unwrap();
        assert!(cfg.json_logs);
        assert_eq!(cfg.log_filter, "info");
    }
}

use rd_domain::config::{Config, ConfigError, ConfigSeverity};
use rd_node_sdk::{LinkAddr, SESSION_HANDLE_CAPACITY};

use crate::resources::{default_table, Led, PressCounter};

/// Problems that only show up once the config meets this node's resources:
/// an unparsable hardware address, a resource table too big for one
/// registration payload, or an update URI that a long session handle would
/// push over the limit.
pub fn node_issues(config: &Config) -> Vec<ConfigError> {
    let mut issues = Vec::new();

    if let Err(e) = config.node.hw_addr.parse::<LinkAddr>() {
        issues.push(ConfigError {
            severity: ConfigSeverity::Error,
            field: "node.hw_addr".into(),
            message: e.to_string(),
        });
    }

    let table = default_table(&Led::default(), &PressCounter::default());
    if let Err(e) = table.link_format(config.limits.max_payload_bytes) {
        issues.push(ConfigError {
            severity: ConfigSeverity::Error,
            field: "limits.max_payload_bytes".into(),
            message: format!("registration payload does not fit: {e}"),
        });
    }

    // `<handle>/<sub_path>` with the longest handle a directory may assign.
    let scoped_tail = 1 + config.node.update_sub_path.trim_start_matches('/').len();
    if SESSION_HANDLE_CAPACITY + scoped_tail > config.limits.max_uri_bytes {
        issues.push(ConfigError {
            severity: ConfigSeverity::Warning,
            field: "limits.max_uri_bytes".into(),
            message: format!(
                "updates fail for session handles longer than {} bytes",
                config.limits.max_uri_bytes.saturating_sub(scoped_tail)
            ),
        });
    }

    issues
}

/// Check the config and what this node derives from it, printing every
/// issue.  A clean run reports the endpoint id and where it will register.
///
/// Returns `true` when no error-severity issue was found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let mut issues = config.validate();
    issues.extend(node_issues(config));

    for issue in &issues {
        println!("{issue}");
    }

    let errors = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        println!(
            "\n{config_path}: {errors} error(s), {} warning(s)",
            issues.len() - errors
        );
        return false;
    }

    if let Some(endpoint) = config
        .node
        .hw_addr
        .parse::<LinkAddr>()
        .ok()
        .and_then(|addr| addr.endpoint_id().ok())
    {
        println!(
            "{config_path}: OK, {endpoint} registers at [{}]:{}{}",
            config.directory.address, config.directory.port, config.directory.registration_path
        );
    }
    true
}

/// Render the resolved config (with all defaults filled in) as TOML.
pub fn render(config: &Config) -> anyhow::Result<String> {
    toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serializing config: {e}"))
}

/// Print the resolved config.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

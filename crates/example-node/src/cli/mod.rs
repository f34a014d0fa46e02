pub mod config;
pub mod get;
pub mod run;

use clap::{Parser, Subcommand, ValueEnum};
use rd_domain::config::Config;
use rd_node_sdk::Method;

/// Example resource-directory node: registers its resources with a remote
/// directory and reports button presses under the returned session.
#[derive(Debug, Parser)]
#[command(name = "rd-node", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register and publish button presses (default when no subcommand is given).
    Run {
        /// Also press the button every N seconds.
        #[arg(long, value_name = "SECS")]
        press_every: Option<u64>,
        /// Do not treat stdin lines as button presses.
        #[arg(long)]
        no_stdin: bool,
    },
    /// Print the endpoint identifier derived from the hardware address.
    EndpointId,
    /// Print the link-format document the node registers.
    Links,
    /// Dispatch a request to a local resource and print the response.
    Get {
        /// Resource path (e.g. `/test/hello` or `/.well-known/core`).
        path: String,
        /// Request method.
        #[arg(long, value_enum, default_value = "get")]
        method: MethodArg,
        /// Query parameters (repeatable, e.g. `--query len=5`).
        #[arg(long)]
        query: Vec<String>,
        /// Request payload.
        #[arg(long)]
        payload: Option<String>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Get,
    Post,
    Put,
    Delete,
}

impl From<MethodArg> for Method {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Get => Method::Get,
            MethodArg::Post => Method::Post,
            MethodArg::Put => Method::Put,
            MethodArg::Delete => Method::Delete,
        }
    }
}

// ── Config loading helper ─────────────────────────────────────────────

/// Env var naming the config file.
pub const ENV_CONFIG: &str = "RD_CONFIG";
/// Config file used when [`ENV_CONFIG`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "rd-node.toml";

/// Load the configuration from the path specified by `RD_CONFIG` (or
/// `rd-node.toml` by default), then apply environment overrides.  Returns
/// the parsed [`Config`] and the path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var(ENV_CONFIG).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = load_config_from(&config_path)?;
    config.apply_env_overrides();
    Ok((config, config_path))
}

/// Load a config file without looking at the environment.  A missing file
/// yields the defaults.
pub fn load_config_from(config_path: &str) -> anyhow::Result<Config> {
    Config::load(config_path).map_err(|e| anyhow::anyhow!("loading {config_path}: {e}"))
}

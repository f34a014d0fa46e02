use std::time::Duration;

use clap::Parser;
use rd_domain::config::ObservabilityConfig;
use rd_example_node::cli::run::TriggerOptions;
use rd_example_node::cli::{self, Cli, Command, ConfigCommand};
use rd_example_node::resources::{default_table, Led, PressCounter};
use rd_node_sdk::LinkAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to run when no subcommand is given.
        None => {
            let (config, _config_path) = cli::load_config()?;
            init_tracing(&config.observability, LogMode::Node);
            cli::run::run(
                config,
                TriggerOptions {
                    stdin: true,
                    press_every: None,
                },
            )
            .await
        }
        Some(Command::Run {
            press_every,
            no_stdin,
        }) => {
            let (config, _config_path) = cli::load_config()?;
            init_tracing(&config.observability, LogMode::Node);
            cli::run::run(
                config,
                TriggerOptions {
                    stdin: !no_stdin,
                    press_every: press_every.map(Duration::from_secs),
                },
            )
            .await
        }
        Some(Command::EndpointId) => {
            let (config, _config_path) = cli::load_config()?;
            init_tracing(&config.observability, LogMode::OneShot);
            let hw_addr: LinkAddr = config
                .node
                .hw_addr
                .parse()
                .map_err(|e| anyhow::anyhow!("node.hw_addr: {e}"))?;
            println!("{}", hw_addr.endpoint_id()?);
            Ok(())
        }
        Some(Command::Links) => {
            let (config, _config_path) = cli::load_config()?;
            init_tracing(&config.observability, LogMode::OneShot);
            let table = default_table(&Led::default(), &PressCounter::default());
            println!("{}", table.link_format(config.limits.max_payload_bytes)?);
            Ok(())
        }
        Some(Command::Get {
            path,
            method,
            query,
            payload,
        }) => {
            init_tracing(&ObservabilityConfig::default(), LogMode::OneShot);
            let table = default_table(&Led::default(), &PressCounter::default());
            let response =
                cli::get::dispatch(&table, method.into(), &path, &query, payload.as_deref()).await;
            println!("{}", cli::get::render(&response));
            if !response.code.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cli::load_config()?;
            init_tracing(&config.observability, LogMode::OneShot);
            let valid = cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = cli::load_config()?;
            init_tracing(&config.observability, LogMode::OneShot);
            cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("rd-node {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// How the binary is being used, which decides where logs go and how loud
/// they are by default.
#[derive(Clone, Copy, PartialEq, Eq)]
enum LogMode {
    /// `run`: `observability.log_filter` applies.
    Node,
    /// Inspection commands print their result on stdout, so only warnings
    /// reach stderr unless `RUST_LOG` says otherwise.
    OneShot,
}

/// Install the global subscriber.  Logs always go to stderr and `RUST_LOG`
/// wins over the configured filter.
fn init_tracing(obs: &ObservabilityConfig, mode: LogMode) {
    let default_filter = match mode {
        LogMode::Node => obs.log_filter.as_str(),
        LogMode::OneShot => "warn",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match (obs.json_logs, mode) {
        (true, _) => fmt.json().init(),
        (false, LogMode::Node) => fmt.init(),
        (false, LogMode::OneShot) => fmt.compact().init(),
    }
}

//! `rd-example-node` — reference node for the resource directory.
//!
//! Serves a handful of demo resources, registers them with the directory
//! after a short delay, and turns every stdin line (or a periodic timer)
//! into a button press published under the session handle.
//!
//! # Env vars
//!
//! | Variable            | Description                                  | Default          |
//! |---------------------|----------------------------------------------|------------------|
//! | `RD_CONFIG`         | Path to the TOML config file                 | `rd-node.toml`   |
//! | `RD_DIRECTORY_ADDR` | Overrides `directory.address`                | (none)           |
//! | `RD_NODE_HW_ADDR`   | Overrides `node.hw_addr`                     | (none)           |
//!
//! # Resources
//!
//! - `test/hello`: `GET`, greeting, `?len=<n>` truncates
//! - `actuators/toggle`: `POST`, flips the red LED
//! - `sensors/button`: `GET`, number of presses so far

pub mod cli;
pub mod resources;
pub mod triggers;

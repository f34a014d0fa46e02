//! `rd-domain` — configuration model and shared error type for the
//! resource-directory node crates.

pub mod config;
pub mod error;

pub use error::{Error, Result};

//! Client toolkit for the Lepton AI serving platform.
//!
//! - [`record::WorkspaceRecord`] remembers the workspaces you logged in to.
//! - [`client::Client`] talks to one workspace; resource facades hang off it
//!   (`client.deployment()`, `client.photon()`, ...).
//! - [`types`] holds the wire models; [`error::Error`] every failure.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod photon;
pub mod record;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use client::Client;
pub use error::{Error, Result};
pub use record::WorkspaceRecord;

//! Typed Docker Engine and Swarm client.
//!
//! This crate is the only place in the workspace that depends on `bollard`.
//! It exposes a normalized, JSON-friendly surface so the gateway never has
//! to reason about raw Docker API response shapes.

mod capabilities;
mod client;
mod error;
mod types;

pub use capabilities::Capabilities;
pub use client::DockerClient;
pub use error::Error;
pub use types::*;

//! Network primitive for shelter.
//!
//! This crate provides the [`net::Network`] trait the strategy executors
//! fetch through, plus the reqwest-backed implementation used in
//! production.

pub mod net;

pub use net::{HttpNetwork, Network, NetworkConfig};

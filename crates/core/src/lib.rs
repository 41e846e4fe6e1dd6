//! Core types and shared functionality for shelter.
//!
//! This crate provides:
//! - The SQLite-backed cache store adapter (partitions + entries)
//! - Request/response descriptors used by the strategy engine
//! - The version registry driving activation garbage collection
//! - The client-message protocol types
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod request;
pub mod response;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use message::{ClientMessage, Notification, PartitionStatus};
pub use registry::VersionRegistry;
pub use request::{Method, RequestKey, RequestMode};
pub use response::ResponseSnapshot;
pub use store::{CacheDb, Partition, PartitionKind};

//! SQLite-backed cache store adapter.
//!
//! This module provides the persistent request→response store the strategy
//! executors read and write, using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Named partitions (static assets vs. dynamic data), deleted wholesale
//!   when a deployment supersedes them
//! - Entries keyed by SHA-256 of method + normalized URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use partitions::{Partition, PartitionKind};

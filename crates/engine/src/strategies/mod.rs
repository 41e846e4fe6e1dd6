//! Strategy executors.
//!
//! Each executor resolves a request to a response using the cache store
//! and the network primitive. They never fail the caller: network and
//! store trouble is absorbed into cached fallbacks or synthetic
//! responses.

mod cache_first;
mod network_first;

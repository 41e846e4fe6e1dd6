//! Request-interception and cache-strategy engine.
//!
//! The engine sits between a client application and the network: it
//! classifies each outbound request into a strategy (cache-first,
//! network-first, bypass), resolves it against the cache store and the
//! network primitive, drives the install/activate lifecycle that keeps
//! versioned cache partitions populated and pruned, and reports cache
//! state back to controlling clients over a tagged message channel.

pub mod clients;
pub mod engine;
pub mod lifecycle;
pub mod messages;
pub mod router;
pub mod strategies;

#[cfg(test)]
pub(crate) mod testutil;

pub use clients::{ClientHub, ClientId, WindowOutcome};
pub use engine::Engine;
pub use lifecycle::{LifecycleController, LifecycleState};
pub use messages::ReplyPort;
pub use router::{RoutingRules, Strategy, classify};

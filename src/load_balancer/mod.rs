//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → dispatcher.rs (single routing entry point)
//!     → Apply selection policy:
//!         - round_robin.rs (rotate through healthy backends)
//!         - weighted.rs (consume weight tokens in registry order)
//!         - least_conn.rs (fewest in-flight requests)
//!     → backend.rs (acquire in-flight guard)
//!     → Return backend guard or AllBackendsUnavailable
//! ```
//!
//! # Design Decisions
//! - Registry is fixed at startup; only per-backend counters mutate
//! - Policy chosen once at construction, shared behind a trait object
//! - Unhealthy backends excluded from every selection
//! - Per-backend atomics instead of one registry-wide lock

pub mod backend;
pub mod dispatcher;
pub mod least_conn;
pub mod round_robin;
pub mod weighted;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use backend::{Backend, RequestGuard};
pub use dispatcher::{DispatchError, Dispatcher};

/// A backend selection algorithm.
///
/// Implementations must be callable concurrently from many request tasks,
/// must only ever return healthy backends, and must return `None` when no
/// healthy backend exists.
pub trait SelectionPolicy: Send + Sync {
    /// Pick one backend from the registry, or `None` if none is eligible.
    fn select(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;

    /// Policy name for startup logs.
    fn name(&self) -> &'static str;
}

/// Selection policy variants, chosen once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    RoundRobin,
    WeightedRoundRobin,
    LeastConnections,
}

impl PolicyKind {
    /// Instantiate the policy behind the common trait.
    pub fn build(self) -> Box<dyn SelectionPolicy> {
        match self {
            PolicyKind::RoundRobin => Box::new(round_robin::RoundRobin::new()),
            PolicyKind::WeightedRoundRobin => Box::new(weighted::WeightedRoundRobin::new()),
            PolicyKind::LeastConnections => Box::new(least_conn::LeastConnections::new()),
        }
    }
}

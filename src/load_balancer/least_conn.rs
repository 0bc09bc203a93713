//! Least-connections selection.

use std::sync::Arc;

use crate::load_balancer::{backend::Backend, SelectionPolicy};

/// Selects the healthy backend with the fewest in-flight requests.
/// Ties break to the lowest registry index.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for LeastConnections {
    fn select(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        // Loads are read independently per backend; a torn snapshot across
        // the registry is acceptable for this heuristic.
        backends
            .iter()
            .filter(|b| b.is_healthy())
            .min_by_key(|b| b.in_flight())
            .cloned()
    }

    fn name(&self) -> &'static str {
        "least_connections"
    }
}

//! Weighted round-robin selection.

use std::sync::{Arc, Mutex};

use crate::load_balancer::{backend::Backend, SelectionPolicy};

/// Weight-token selector.
///
/// Scans the registry in fixed order and picks the first healthy backend
/// that still holds a weight token. A depleted backend is skipped, without
/// resetting, until the whole healthy set is depleted; then every backend's
/// tokens are replenished and a new cycle begins. Within each cycle a
/// backend is selected exactly as many times as its configured weight.
pub struct WeightedRoundRobin {
    /// Serializes cycle replenishment so concurrent callers start a new
    /// cycle once. Token consumption itself is lock-free.
    cycle: Mutex<()>,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self {
            cycle: Mutex::new(()),
        }
    }

    fn try_consume(backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        backends
            .iter()
            .find(|b| b.is_healthy() && b.consume_weight_token())
            .cloned()
    }
}

impl Default for WeightedRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionPolicy for WeightedRoundRobin {
    fn select(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if !backends.iter().any(|b| b.is_healthy()) {
            return None;
        }

        if let Some(backend) = Self::try_consume(backends) {
            return Some(backend);
        }

        // Every healthy backend is depleted. Re-check under the lock in
        // case another caller already replenished.
        let _cycle = self.cycle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(backend) = Self::try_consume(backends) {
            return Some(backend);
        }
        for backend in backends {
            backend.replenish_weight();
        }
        Self::try_consume(backends)
    }

    fn name(&self) -> &'static str {
        "weighted_round_robin"
    }
}

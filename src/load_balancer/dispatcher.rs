//! Request dispatch.
//!
//! # Responsibilities
//! - Own the fixed backend registry and the selection policy
//! - Provide the single "pick a backend for this request" entry point
//! - Pair each successful pick with an in-flight acquisition

use std::sync::Arc;

use thiserror::Error;

use crate::load_balancer::{
    backend::{Backend, RequestGuard},
    PolicyKind, SelectionPolicy,
};

/// Routing failure surfaced to the request-handling layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Every registered backend is currently marked unhealthy.
    #[error("no healthy backend available")]
    AllBackendsUnavailable,
}

/// Owns the registry and the active selection policy.
///
/// Both are fixed at construction; the dispatcher lives for the process
/// lifetime and is shared behind an `Arc`.
pub struct Dispatcher {
    backends: Vec<Arc<Backend>>,
    policy: Box<dyn SelectionPolicy>,
}

impl Dispatcher {
    pub fn new(backends: Vec<Arc<Backend>>, policy: PolicyKind) -> Self {
        Self {
            backends,
            policy: policy.build(),
        }
    }

    /// Select a backend for one request.
    ///
    /// On success the backend's in-flight count is already incremented;
    /// dropping the returned guard signals completion and releases it.
    pub fn route(&self) -> Result<RequestGuard, DispatchError> {
        match self.policy.select(&self.backends) {
            Some(backend) => {
                backend.acquire_for_request();
                Ok(RequestGuard::new(backend))
            }
            None => Err(DispatchError::AllBackendsUnavailable),
        }
    }

    /// The full registry, in configuration order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Name of the active policy, for startup logs.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn registry(n: u16) -> Vec<Arc<Backend>> {
        (0..n)
            .map(|i| {
                let addr: SocketAddr = format!("127.0.0.1:{}", 8080 + i).parse().unwrap();
                Arc::new(Backend::new(format!("b{i}"), addr, 1))
            })
            .collect()
    }

    #[test]
    fn route_acquires_and_guard_drop_releases() {
        let dispatcher = Dispatcher::new(registry(1), PolicyKind::RoundRobin);

        let guard = dispatcher.route().unwrap();
        assert_eq!(guard.in_flight(), 1);
        drop(guard);
        assert_eq!(dispatcher.backends()[0].in_flight(), 0);
    }

    #[test]
    fn route_fails_when_all_backends_are_unhealthy() {
        let policies = [
            PolicyKind::RoundRobin,
            PolicyKind::WeightedRoundRobin,
            PolicyKind::LeastConnections,
        ];
        for policy in policies {
            let backends = registry(2);
            for backend in &backends {
                backend.set_healthy(false);
            }
            let dispatcher = Dispatcher::new(backends, policy);
            assert_eq!(
                dispatcher.route().unwrap_err(),
                DispatchError::AllBackendsUnavailable
            );
        }
    }

    #[test]
    fn least_connections_routing_reacts_to_open_guards() {
        let dispatcher = Dispatcher::new(registry(2), PolicyKind::LeastConnections);

        let g1 = dispatcher.route().unwrap();
        assert_eq!(g1.addr, dispatcher.backends()[0].addr);
        let g2 = dispatcher.route().unwrap();
        assert_eq!(g2.addr, dispatcher.backends()[1].addr);
        drop(g1);
        let g3 = dispatcher.route().unwrap();
        assert_eq!(g3.addr, dispatcher.backends()[0].addr);
    }

    #[test]
    fn in_flight_returns_to_zero_after_interleaved_completion() {
        let dispatcher = Dispatcher::new(registry(3), PolicyKind::RoundRobin);

        let g1 = dispatcher.route().unwrap();
        let g2 = dispatcher.route().unwrap();
        let g3 = dispatcher.route().unwrap();
        let g4 = dispatcher.route().unwrap();
        drop(g2);
        drop(g4);
        drop(g1);
        drop(g3);

        for backend in dispatcher.backends() {
            assert_eq!(backend.in_flight(), 0);
        }
    }
}

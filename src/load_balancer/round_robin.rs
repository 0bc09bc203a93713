//! Round-robin selection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, SelectionPolicy};

/// Cyclic selector.
///
/// A shared atomic cursor hands every caller a distinct position, so two
/// concurrent selections never observe the same index. The scan walks
/// forward from the cursor to the next healthy backend, wrapping at most
/// once around the registry.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for RoundRobin {
    fn select(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let len = backends.len();

        for i in 0..len {
            let backend = &backends[start.wrapping_add(i) % len];
            if backend.is_healthy() {
                return Some(backend.clone());
            }
        }
        None
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
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
    fn cycles_in_registry_order() {
        let lb = RoundRobin::new();
        let backends = registry(3);

        for round in 0..4 {
            for backend in &backends {
                let picked = lb.select(&backends).unwrap();
                assert_eq!(picked.addr, backend.addr, "round {round}");
            }
        }
    }

    #[test]
    fn each_backend_gets_an_equal_share() {
        let lb = RoundRobin::new();
        let backends = registry(3);

        let mut counts: HashMap<SocketAddr, usize> = HashMap::new();
        for _ in 0..30 {
            let picked = lb.select(&backends).unwrap();
            *counts.entry(picked.addr).or_default() += 1;
        }
        for backend in &backends {
            assert_eq!(counts[&backend.addr], 10);
        }
    }

    #[test]
    fn unhealthy_backends_are_never_selected() {
        let lb = RoundRobin::new();
        let backends = registry(3);
        backends[1].set_healthy(false);

        for _ in 0..12 {
            let picked = lb.select(&backends).unwrap();
            assert_ne!(picked.addr, backends[1].addr);
        }
    }

    #[test]
    fn returns_none_when_no_backend_is_healthy() {
        let lb = RoundRobin::new();
        let backends = registry(2);
        for backend in &backends {
            backend.set_healthy(false);
        }
        assert!(lb.select(&backends).is_none());
        assert!(lb.select(&[]).is_none());
    }

    #[test]
    fn concurrent_selections_stay_exactly_fair() {
        let lb = RoundRobin::new();
        let backends = registry(4);

        let threads = 8;
        let per_thread = 50;
        let mut counts: HashMap<SocketAddr, usize> = HashMap::new();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        (0..per_thread)
                            .map(|_| lb.select(&backends).unwrap().addr)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                for addr in handle.join().unwrap() {
                    *counts.entry(addr).or_default() += 1;
                }
            }
        });

        // 400 selections over 4 backends: distinct cursor values mean an
        // exact 100 per backend, with none duplicated or skipped.
        assert_eq!(counts.values().sum::<usize>(), threads * per_thread);
        for backend in &backends {
            assert_eq!(counts[&backend.addr], threads * per_thread / 4);
        }
    }
}

//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track health state (sole writer: the backend's probe)
//! - Track in-flight requests (for Least Connections)
//! - Hold weight tokens (for Weighted Round Robin)

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// A single backend server.
///
/// The address is immutable after creation; all runtime state sits behind
/// per-backend atomics, so probing or selecting one backend never blocks
/// traffic to another.
#[derive(Debug)]
pub struct Backend {
    /// Configured identifier, used in logs and metrics.
    pub name: String,
    /// The address requests are forwarded to.
    pub addr: SocketAddr,
    /// Liveness flag. Written only by this backend's health probe.
    healthy: AtomicBool,
    /// Remaining weight tokens for weighted round robin.
    weight: AtomicU32,
    /// Configured weight, restored when a weighted cycle is depleted.
    configured_weight: u32,
    /// Requests currently routed here and not yet completed.
    in_flight: AtomicUsize,
}

impl Backend {
    /// Create a backend. New backends start healthy; the first probe
    /// evaluation corrects the flag if that is wrong.
    pub fn new(name: impl Into<String>, addr: SocketAddr, weight: u32) -> Self {
        Self {
            name: name.into(),
            addr,
            healthy: AtomicBool::new(true),
            weight: AtomicU32::new(weight),
            configured_weight: weight,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Lock-free read of the health flag.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Overwrite the health flag. Last write wins; only the owning probe
    /// calls this.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    /// Current number of in-flight requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Count a request routed to this backend. Always succeeds;
    /// backpressure is not this layer's concern.
    pub fn acquire_for_request(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a routed request as completed. Releasing without a matching
    /// acquire is a programming error: fatal in debug builds, clamped to
    /// zero in release builds.
    pub fn release_after_request(&self) {
        let underflow = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_err();
        debug_assert!(!underflow, "release_after_request without matching acquire");
    }

    /// Remaining weight tokens.
    pub fn weight(&self) -> u32 {
        self.weight.load(Ordering::Relaxed)
    }

    /// Consume one weight token. Returns `false` when the backend is
    /// already depleted for the current cycle. The decrement is a single
    /// atomic read-modify-write, so the observed weight never goes below
    /// zero.
    pub fn consume_weight_token(&self) -> bool {
        self.weight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |w| w.checked_sub(1))
            .is_ok()
    }

    /// Restore the configured weight for a fresh weighted cycle.
    pub fn replenish_weight(&self) {
        self.weight.store(self.configured_weight, Ordering::Relaxed);
    }
}

/// RAII guard pairing one selection with exactly one completion.
///
/// Dropping the guard signals request completion and releases the backend's
/// in-flight count.
#[derive(Debug)]
pub struct RequestGuard {
    backend: Arc<Backend>,
}

impl RequestGuard {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

impl Deref for RequestGuard {
    type Target = Backend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.backend.release_after_request();
    }
}

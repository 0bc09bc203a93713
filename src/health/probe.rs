//! Per-backend health probing.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{BackendConfig, HealthCheckConfig};
use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

/// Why a probe evaluation marked its backend unhealthy.
///
/// Probe failures are recovered locally: they flip the backend's flag and
/// are logged, never propagated.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport failure: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("non-success status {0}")]
    Status(StatusCode),
    #[error("invalid probe request: {0}")]
    Request(#[from] axum::http::Error),
}

/// Periodic liveness prober for one backend.
///
/// The probe is the only writer of its backend's health flag. It runs as an
/// independent task for the process lifetime.
pub struct HealthProbe {
    backend: Arc<Backend>,
    target: Uri,
    interval: Duration,
    timeout: Duration,
    last_checked_at: Instant,
    client: Client<HttpConnector, Body>,
}

impl HealthProbe {
    pub fn new(backend: Arc<Backend>, target: Uri, interval: Duration, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            backend,
            target,
            interval,
            timeout,
            last_checked_at: Instant::now(),
            client,
        }
    }

    /// Build a probe from the global health-check section and one backend's
    /// overrides.
    pub fn from_config(
        backend: Arc<Backend>,
        defaults: &HealthCheckConfig,
        overrides: &BackendConfig,
    ) -> Result<Self, axum::http::uri::InvalidUri> {
        let path = overrides.check_path.as_deref().unwrap_or(&defaults.path);
        let target: Uri = format!("http://{}{}", backend.addr, path).parse()?;
        let interval =
            Duration::from_secs(overrides.check_interval_secs.unwrap_or(defaults.interval_secs));
        let timeout =
            Duration::from_secs(overrides.check_timeout_secs.unwrap_or(defaults.timeout_secs));
        Ok(Self::new(backend, target, interval, timeout))
    }

    /// Run until the shutdown broadcast fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            backend = %self.backend.name,
            target = %self.target,
            interval = ?self.interval,
            "health probe starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                tick = ticker.tick() => {
                    self.evaluate(tick).await;
                }
                _ = shutdown.recv() => {
                    tracing::debug!(backend = %self.backend.name, "health probe stopping");
                    break;
                }
            }
        }
    }

    /// One timer tick, where `now` is the tick's scheduled instant. Ticks
    /// that land inside the debounce window are skipped; returns whether a
    /// probe actually ran.
    pub async fn evaluate(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_checked_at) < self.interval {
            return false;
        }

        let outcome = self.probe_once().await;
        match &outcome {
            Ok(()) => {
                tracing::debug!(backend = %self.backend.name, "health probe succeeded");
            }
            Err(error) => {
                tracing::warn!(backend = %self.backend.name, %error, "health probe failed");
            }
        }

        self.backend.set_healthy(outcome.is_ok());
        metrics::record_backend_health(&self.backend.name, outcome.is_ok());
        self.last_checked_at = now;
        true
    }

    /// Issue one bounded GET against the check target.
    async fn probe_once(&self) -> Result<(), ProbeError> {
        let request = Request::builder()
            .method("GET")
            .uri(self.target.clone())
            .header("user-agent", concat!("backhaul/", env!("CARGO_PKG_VERSION")))
            .body(Body::empty())?;

        let response = time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(response.status()))
        }
    }
}

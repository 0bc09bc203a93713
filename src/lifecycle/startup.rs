//! Subsystem wiring at process start.

use std::net::AddrParseError;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::ProxyConfig;
use crate::health::HealthProbe;
use crate::lifecycle::Shutdown;
use crate::load_balancer::Backend;

/// Build the backend registry from configuration, in config order.
pub fn build_registry(config: &ProxyConfig) -> Result<Vec<Arc<Backend>>, AddrParseError> {
    config
        .backends
        .iter()
        .map(|bc| {
            let addr = bc.address.parse()?;
            Ok(Arc::new(Backend::new(bc.name.clone(), addr, bc.weight)))
        })
        .collect()
}

/// Spawn one health probe task per backend, tied to the shutdown broadcast.
pub fn spawn_probes(
    config: &ProxyConfig,
    backends: &[Arc<Backend>],
    shutdown: &Shutdown,
) -> Result<Vec<JoinHandle<()>>, axum::http::uri::InvalidUri> {
    if !config.health_check.enabled {
        tracing::info!("health probes disabled");
        return Ok(Vec::new());
    }

    let mut handles = Vec::with_capacity(backends.len());
    for (backend, bc) in backends.iter().zip(&config.backends) {
        let probe = HealthProbe::from_config(backend.clone(), &config.health_check, bc)?;
        handles.push(tokio::spawn(probe.run(shutdown.subscribe())));
    }
    Ok(handles)
}

//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use backhaul::config::{BackendConfig, ProxyConfig};
use backhaul::http::HttpServer;
use backhaul::lifecycle::{startup, Shutdown};
use backhaul::load_balancer::Dispatcher;

/// Start a mock backend on an ephemeral port returning a fixed 200 body.
/// Returns the bound address.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (200, body.to_string()) }).await
}

/// Start a programmable mock backend; the closure decides each response.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend config entry pointing at a mock backend.
pub fn backend_config(name: &str, addr: SocketAddr, weight: u32) -> BackendConfig {
    BackendConfig {
        name: name.to_string(),
        address: addr.to_string(),
        weight,
        check_path: None,
        check_interval_secs: None,
        check_timeout_secs: None,
    }
}

/// Start the proxy on an ephemeral port.
///
/// The returned `Shutdown` must be kept alive for the duration of the test;
/// dropping it stops the server and every probe task.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let backends = startup::build_registry(&config).unwrap();
    let dispatcher = Arc::new(Dispatcher::new(backends, config.policy));

    let shutdown = Shutdown::new();
    startup::spawn_probes(&config, dispatcher.backends(), &shutdown).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, dispatcher);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

//! HTTP server and proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request id)
//! - Dispatch each request through the load balancer
//! - Forward to the selected backend and relay the response

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{MakeUuidRequestId, X_REQUEST_ID};
use crate::load_balancer::{DispatchError, Dispatcher};
use crate::observability::metrics;

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP front end for the load balancer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server forwarding through the given dispatcher.
    pub fn new(config: &ProxyConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState { dispatcher, client };
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId));

        Self { router }
    }

    /// Accept connections until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: pick a backend, rewrite the URI, forward.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let guard = match state.dispatcher.route() {
        Ok(guard) => guard,
        Err(DispatchError::AllBackendsUnavailable) => {
            tracing::warn!(request_id = %request_id, "no healthy backend available");
            metrics::record_request(&method, 503, "none", start);
            return (StatusCode::SERVICE_UNAVAILABLE, "no healthy backend available")
                .into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        backend = %guard.name,
        path = %request.uri().path(),
        "forwarding request"
    );

    let backend_label = guard.addr.to_string();
    let request = match rewrite_to_backend(request, &backend_label) {
        Ok(request) => request,
        Err(error) => {
            tracing::error!(request_id = %request_id, %error, "failed to rewrite request URI");
            metrics::record_request(&method, 500, &backend_label, start);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state.client.request(request).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), &backend_label, start);
            relay_response(response)
        }
        Err(error) => {
            tracing::error!(
                request_id = %request_id,
                backend = %guard.name,
                %error,
                "upstream request failed"
            );
            metrics::record_request(&method, 502, &backend_label, start);
            (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
        }
    }
}

/// Point the request at the selected backend, keeping path and query.
fn rewrite_to_backend(
    request: Request<Body>,
    authority: &str,
) -> Result<Request<Body>, axum::http::Error> {
    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(Authority::from_str(authority)?);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = Uri::from_parts(uri_parts)?;
    Ok(Request::from_parts(parts, body))
}

/// Convert the upstream response body into an Axum response.
fn relay_response(response: axum::http::Response<Incoming>) -> Response {
    response.map(Body::new).into_response()
}

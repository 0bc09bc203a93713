//! HTTP proxy surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → dispatcher picks a backend (503 when none is healthy)
//!     → URI rewritten to the backend authority
//!     → hyper client forwards, response relayed (502 on upstream failure)
//! ```

pub mod request;
pub mod server;

pub use server::HttpServer;

//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! One probe task per backend (probe.rs):
//!     Periodic timer tick
//!     → debounce against the last evaluation time
//!     → bounded GET to the backend's check target
//!     → overwrite the backend's health flag (last write wins)
//!
//! Selection policies only ever read the flag, never write it.
//! ```
//!
//! # Design Decisions
//! - Health state is a single boolean per backend with a single writer
//! - A failed probe flips one backend's flag and nothing else
//! - Probe tasks stop on the process-wide shutdown broadcast

pub mod probe;

pub use probe::{HealthProbe, ProbeError};

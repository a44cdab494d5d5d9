//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! session / gateway / lifecycle produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (operation and error counters)
//! ```
//!
//! Metrics go through the `metrics` facade; without an installed recorder
//! they are no-ops.

pub mod logging;
pub mod metrics;

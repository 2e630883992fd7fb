//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (tx_id, address, method)
//! - stdout stays reserved for command output
//! - Metrics are no-ops until an embedding process installs a recorder

pub mod logging;
pub mod metrics;

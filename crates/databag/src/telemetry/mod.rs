//! Tracing setup: structured JSON logs, with optional OTLP span export.
//!
//! # Telemetry invariants
//!
//! - **No secrets or field values** in any span attribute or log field. Only
//!   bag names, item ids, field names and scheme versions are recorded.
//! - Log level is configurable via `CHEF_LOG_LEVEL` (default: `info`) and
//!   overridable with `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;

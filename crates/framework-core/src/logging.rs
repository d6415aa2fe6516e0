//! Logging facilities.
//!
//! Framework crates log through the `tracing` crate with crate-qualified
//! targets. Nothing is printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("framework_rest=debug")
//!     .init();
//! ```

use std::time::{Duration, Instant};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core utilities target.
    pub const CORE: &str = "framework_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "framework_core::signal";
    /// Dispose guards target.
    pub const DISPOSE: &str = "framework_core::dispose";
    /// Timing spans target.
    pub const PERF: &str = "framework_core::perf";
    /// REST request assembly target.
    pub const REST_REQUEST: &str = "framework_rest::request";
    /// REST transport target.
    pub const REST_TRANSPORT: &str = "framework_rest::transport";
    /// REST response parsing target.
    pub const REST_PARSER: &str = "framework_rest::parser";
    /// REST cookie handling target.
    pub const REST_COOKIE: &str = "framework_rest::cookie";
}

/// A guard that times a synchronous operation.
///
/// Enters a `perf` span for its lifetime and logs the elapsed time at
/// `debug` level when dropped. Do not hold it across `.await` points.
///
/// ```
/// use framework_core::logging::PerfSpan;
///
/// let span = PerfSpan::new("build_request");
/// // ... work ...
/// assert!(span.elapsed().as_secs() < 60);
/// ```
pub struct PerfSpan {
    name: &'static str,
    started: Instant,
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            name,
            started: Instant::now(),
            span: span.entered(),
        }
    }

    /// Time elapsed since the span was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::debug!(
            target: targets::PERF,
            operation = self.name,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "operation finished"
        );
    }
}

//! Structured logging for fiber tensor construction
//!
//! Construction emits `tracing` events when the `tracing` feature is enabled
//! (the default). Without the feature every helper compiles to a no-op.
//!
//! # Example
//!
//! ```ignore
//! use tenrso_fiber::tracing_support::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! let ft = FiberTensor::from_coord(&tensor)?; // logs one event per mode
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., `RUST_LOG=tenrso_fiber=debug`)
//! - `TENRSO_LOG_FORMAT`: Set output format (`json`, `compact` or `pretty`, default: `pretty`)

use anyhow::Result;

#[cfg(feature = "tracing")]
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// JSON format for structured logging
    Json,
    /// Compact format (single line per event)
    Compact,
}

impl TracingFormat {
    /// Parse from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => TracingFormat::Json,
            "compact" => TracingFormat::Compact,
            _ => TracingFormat::Pretty,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// Filter directive (e.g., "tenrso_fiber=debug,info")
    pub filter: String,
    /// Enable ANSI colors
    pub with_ansi: bool,
    /// Show target module paths
    pub with_target: bool,
    /// Show thread IDs (useful when modes are built in parallel)
    pub with_thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        let format = std::env::var("TENRSO_LOG_FORMAT")
            .map(|s| TracingFormat::parse(&s))
            .unwrap_or(TracingFormat::Pretty);

        let filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tenrso_fiber=info,warn".to_string());

        Self {
            format,
            filter,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
        }
    }
}

/// Installs the global subscriber for fiber construction events.
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)?;

    let base = fmt::layer()
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        TracingFormat::Pretty => base.pretty().with_ansi(config.with_ansi).boxed(),
        TracingFormat::Compact => base.compact().with_ansi(config.with_ansi).boxed(),
        TracingFormat::Json => base.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;
    Ok(())
}

/// Stub for when tracing feature is disabled
#[cfg(not(feature = "tracing"))]
pub fn init_tracing(_config: TracingConfig) -> Result<()> {
    Ok(())
}

/// Record the mode orders chosen for a tensor
#[cfg(feature = "tracing")]
pub fn record_plan(dims: &[usize], orders: &[crate::order::ModeOrder]) {
    for (mode, order) in orders.iter().enumerate() {
        tracing::debug!(mode, dims = ?dims, order = ?order.as_slice(), "mode_order_planned");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn record_plan(_dims: &[usize], _orders: &[crate::order::ModeOrder]) {}

/// Record the outcome of building one mode
#[cfg(feature = "tracing")]
pub fn record_mode_build(mode: usize, nnz: usize, nfibs: usize, empty_slices: usize) {
    tracing::debug!(
        mode,
        nnz,
        nfibs,
        empty_slices,
        avg_fiber_len = if nfibs == 0 { 0.0 } else { nnz as f64 / nfibs as f64 },
        "mode_built"
    );
}

#[cfg(not(feature = "tracing"))]
pub fn record_mode_build(_mode: usize, _nnz: usize, _nfibs: usize, _empty_slices: usize) {}

/// Record a whole fiber tensor build
#[cfg(feature = "tracing")]
pub fn record_tensor_build(nmodes: usize, nnz: usize, bytes: usize, parallel: bool) {
    tracing::info!(
        nmodes,
        nnz,
        bytes,
        mb = bytes as f64 / 1024.0 / 1024.0,
        parallel,
        "fiber_tensor_built"
    );
}

#[cfg(not(feature = "tracing"))]
pub fn record_tensor_build(_nmodes: usize, _nnz: usize, _bytes: usize, _parallel: bool) {}

/// Record a rejected construction
#[cfg(feature = "tracing")]
pub fn record_rejection(err: &crate::error::SparseError) {
    tracing::warn!(error = %err, "fiber_tensor_rejected");
}

#[cfg(not(feature = "tracing"))]
pub fn record_rejection(_err: &crate::error::SparseError) {}

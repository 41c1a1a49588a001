//! ethtool-exporter - NIC driver statistics exporter for Prometheus.
//!
//! Samples per-interface `ethtool -S` counters and republishes them as a
//! single gauge family, either over a pull-based HTTP endpoint or as a
//! textfile snapshot for the node-exporter textfile collector.
//!
//! - `collector` — interface discovery, counter fetch/parse/filter, snapshot assembly
//! - `config` — CLI arguments and validated runtime configuration
//! - `metrics` — snapshot to Prometheus text exposition
//! - `publish` — the three publication modes (serve, periodic file, one-shot file)

pub mod collector;
pub mod config;
pub mod metrics;
pub mod publish;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Counter collection pipeline.
//!
//! One collection tick runs: interface enumeration from sysfs, one
//! `ethtool -S` invocation per interface, line parsing, allow/deny name
//! filtering, and per-interface deduplication, assembling everything into
//! a single [`Snapshot`].
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       Collector                        │
//! │  interfaces ──▶ fetch ──▶ parse ──▶ filter ──▶ dedup   │
//! │      │            │                                    │
//! │ ┌────▼─────┐ ┌────▼────────┐                           │
//! │ │FileSystem│ │ StatsSource │  (traits)                 │
//! │ └────┬─────┘ └────┬────────┘                           │
//! └──────┼────────────┼────────────────────────────────────┘
//!        │            │
//!   RealFs/MockFs  EthtoolRunner/MockStats
//! ```
//!
//! Both seams are traits so tests run against an in-memory sysfs tree and
//! canned ethtool output instead of a live system.

#[allow(clippy::module_inception)]
mod collector;
pub mod filter;
pub mod interfaces;
pub mod mock;
pub mod parser;
pub mod traits;

pub use collector::{CollectError, Collector, Sample, Snapshot};
pub use filter::{FilterError, StatFilter};
pub use traits::{EthtoolRunner, FetchError, FileSystem, RealFs, StatsSource};

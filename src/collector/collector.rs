//! Snapshot builder: one collection tick over all physical interfaces.
//!
//! The collector holds no mutable state across ticks; every call to
//! [`Collector::collect_snapshot`] builds a fresh [`Snapshot`] from
//! scratch, which makes concurrent scrapes in serve mode safe without
//! locking.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, error, warn};

use crate::collector::filter::StatFilter;
use crate::collector::interfaces::physical_interfaces;
use crate::collector::parser::parse_stats;
use crate::collector::traits::{FetchError, FileSystem, StatsSource};

/// One (interface, counter, value) reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub device: String,
    pub counter: String,
    pub value: f64,
}

/// All samples collected in one tick, ordered by discovery.
///
/// Immutable once built; discarded after publication. Within one device
/// the counter names are unique.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub samples: Vec<Sample>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of distinct devices contributing samples.
    pub fn device_count(&self) -> usize {
        self.samples
            .iter()
            .map(|s| s.device.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Error type for a collection tick. Every variant is fatal; soft
/// per-interface and per-line failures are logged and absorbed inside
/// the tick.
#[derive(Debug)]
pub enum CollectError {
    /// The sysfs net class root could not be read.
    Sysfs { path: PathBuf, source: io::Error },
    /// Fatal failure invoking ethtool (missing binary, permissions).
    Fetch(FetchError),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Sysfs { path, source } => {
                write!(f, "cannot list {}: {}", path.display(), source)
            }
            CollectError::Fetch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<FetchError> for CollectError {
    fn from(e: FetchError) -> Self {
        CollectError::Fetch(e)
    }
}

/// Orchestrates enumeration, fetch, parse, filter, and dedup into snapshots.
pub struct Collector<F: FileSystem, S: StatsSource> {
    fs: F,
    stats: S,
    sysfs_path: PathBuf,
    interface_pattern: Option<Regex>,
    stat_filter: StatFilter,
}

impl<F: FileSystem, S: StatsSource> Collector<F, S> {
    pub fn new(
        fs: F,
        stats: S,
        sysfs_path: impl Into<PathBuf>,
        interface_pattern: Option<Regex>,
        stat_filter: StatFilter,
    ) -> Self {
        Self {
            fs,
            stats,
            sysfs_path: sysfs_path.into(),
            interface_pattern,
            stat_filter,
        }
    }

    /// Runs one collection tick.
    ///
    /// Interfaces are processed strictly sequentially. An interface whose
    /// ethtool query exits non-zero contributes nothing and is logged;
    /// missing binary, permission errors, and an unreadable sysfs root
    /// are fatal and returned as `Err`.
    pub fn collect_snapshot(&self) -> Result<Snapshot, CollectError> {
        let interfaces = physical_interfaces(
            &self.fs,
            &self.sysfs_path,
            self.interface_pattern.as_ref(),
        )
        .map_err(|source| CollectError::Sysfs {
            path: self.sysfs_path.clone(),
            source,
        })?;

        let mut samples = Vec::new();

        for interface in interfaces {
            let raw = match self.stats.query(&interface) {
                Ok(raw) => raw,
                Err(e) if !e.is_fatal() => {
                    error!("{}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let mut seen: HashSet<String> = HashSet::new();
            for (name, value) in parse_stats(&raw) {
                if !self.stat_filter.includes(&name) {
                    continue;
                }
                if seen.contains(&name) {
                    warn!(
                        "counter {} already seen, check the source data for interface {}",
                        name, interface
                    );
                    continue;
                }
                seen.insert(name.clone());
                samples.push(Sample {
                    device: interface.clone(),
                    counter: name,
                    value,
                });
            }
            debug!("interface {}: {} counters", interface, seen.len());
        }

        Ok(Snapshot { samples })
    }
}

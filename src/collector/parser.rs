//! Parser for `ethtool -S` output.
//!
//! A pure function over the raw text so it is testable with string inputs.
//! Expected shape: a `NIC statistics:` header followed by indented
//! `name: value` lines. Drivers are free to emit garbage; a bad line is
//! logged and skipped, never aborting the rest of the parse.

use tracing::warn;

/// Section header emitted by ethtool before the counter lines.
const STATS_HEADER: &str = "NIC statistics:";

/// Parses raw ethtool output into (counter name, value) pairs.
///
/// Empty lines and the header are skipped. Remaining lines split on the
/// first `": "` with both halves trimmed and the value parsed as `f64`.
/// Lines without the separator or with a non-numeric value are logged
/// and dropped.
pub fn parse_stats(raw: &str) -> Vec<(String, f64)> {
    let mut pairs = Vec::new();

    for line in raw.lines() {
        if line.is_empty() || line == STATS_HEADER {
            continue;
        }
        let line = line.trim();

        let Some((name, value)) = line.split_once(": ") else {
            warn!("failed parsing \"{}\"", line);
            continue;
        };

        match value.trim().parse::<f64>() {
            Ok(value) => pairs.push((name.trim().to_string(), value)),
            Err(_) => warn!("failed parsing \"{}\"", line),
        }
    }

    pairs
}

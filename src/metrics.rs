//! Prometheus exposition of a collected snapshot.
//!
//! No global registry: every snapshot gets a freshly built `Registry` and
//! gauge family, so concurrent scrapes never share state.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::collector::Snapshot;

/// Name of the exported gauge family.
pub const METRIC_NAME: &str = "node_net_ethtool";
/// Help string of the exported gauge family.
pub const METRIC_HELP: &str = "Ethtool data";

/// Builds a registry holding the snapshot as one gauge family with
/// `device` and `type` labels.
pub fn registry_for(snapshot: &Snapshot) -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();
    let gauge = GaugeVec::new(Opts::new(METRIC_NAME, METRIC_HELP), &["device", "type"])?;
    registry.register(Box::new(gauge.clone()))?;

    for sample in &snapshot.samples {
        gauge
            .with_label_values(&[sample.device.as_str(), sample.counter.as_str()])
            .set(sample.value);
    }

    Ok(registry)
}

/// Serializes a snapshot in the Prometheus text exposition format.
pub fn encode_text(snapshot: &Snapshot) -> Result<String, prometheus::Error> {
    let registry = registry_for(snapshot)?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    // The text format is ASCII by construction.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Sample;

    fn snapshot() -> Snapshot {
        Snapshot {
            samples: vec![
                Sample {
                    device: "eth0".to_string(),
                    counter: "rx_packets".to_string(),
                    value: 100.0,
                },
                Sample {
                    device: "eth0".to_string(),
                    counter: "rx_errors".to_string(),
                    value: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_encode_contains_labeled_samples() {
        let text = encode_text(&snapshot()).unwrap();
        assert!(text.contains("node_net_ethtool{device=\"eth0\",type=\"rx_packets\"} 100"));
        assert!(text.contains("node_net_ethtool{device=\"eth0\",type=\"rx_errors\"} 0"));
    }

    #[test]
    fn test_encode_declares_gauge_type() {
        let text = encode_text(&snapshot()).unwrap();
        assert!(text.contains("# TYPE node_net_ethtool gauge"));
        assert!(text.contains("# HELP node_net_ethtool Ethtool data"));
    }

    #[test]
    fn test_empty_snapshot_encodes_without_samples() {
        let text = encode_text(&Snapshot::default()).unwrap();
        assert!(!text.contains("device="));
    }
}

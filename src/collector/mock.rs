//! In-memory test doubles for the collector seams.
//!
//! `MockFs` simulates the sysfs net class directory (including symlink
//! targets, which is how virtual devices are told apart), and `MockStats`
//! serves canned ethtool output per interface.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::collector::traits::{FetchError, FileSystem, StatsSource};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from directory path to its entries.
    directories: HashMap<PathBuf, Vec<PathBuf>>,
    /// Map from symlink path to its target.
    symlinks: HashMap<PathBuf, PathBuf>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symlinked device entry under `root`, the shape of a real
    /// `/sys/class/net` entry.
    pub fn add_device(&mut self, root: impl AsRef<Path>, name: &str, target: impl Into<PathBuf>) {
        let path = root.as_ref().join(name);
        self.directories
            .entry(root.as_ref().to_path_buf())
            .or_default()
            .push(path.clone());
        self.symlinks.insert(path, target.into());
    }

    /// Adds a plain (non-symlink) entry under `root`.
    pub fn add_plain_entry(&mut self, root: impl AsRef<Path>, name: &str) {
        let path = root.as_ref().join(name);
        self.directories
            .entry(root.as_ref().to_path_buf())
            .or_default()
            .push(path);
    }
}

impl FileSystem for MockFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.directories
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.symlinks
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "not a symlink"))
    }
}

/// Canned per-interface ethtool output for testing.
#[derive(Debug, Clone, Default)]
pub struct MockStats {
    outputs: HashMap<String, String>,
    failures: HashMap<String, i32>,
}

impl MockStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `raw` as the ethtool output for `interface`.
    pub fn with_output(mut self, interface: &str, raw: &str) -> Self {
        self.outputs.insert(interface.to_string(), raw.to_string());
        self
    }

    /// Makes queries for `interface` fail with the given exit code.
    pub fn with_exit_code(mut self, interface: &str, code: i32) -> Self {
        self.failures.insert(interface.to_string(), code);
        self
    }
}

impl StatsSource for MockStats {
    fn query(&self, interface: &str) -> Result<String, FetchError> {
        if let Some(code) = self.failures.get(interface) {
            return Err(FetchError::NonZeroExit {
                interface: interface.to_string(),
                code: Some(*code),
            });
        }
        self.outputs
            .get(interface)
            .cloned()
            .ok_or_else(|| FetchError::NonZeroExit {
                interface: interface.to_string(),
                code: Some(1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_distinguishes_symlinks() {
        let mut fs = MockFs::new();
        fs.add_device("/sys/class/net", "eth0", "../../devices/pci0000:00/net/eth0");
        fs.add_plain_entry("/sys/class/net", "bonding_masters");

        let entries = fs.read_dir(Path::new("/sys/class/net")).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(fs.read_link(Path::new("/sys/class/net/eth0")).is_ok());
        assert!(fs.read_link(Path::new("/sys/class/net/bonding_masters")).is_err());
    }

    #[test]
    fn test_mock_stats_failure() {
        let stats = MockStats::new().with_exit_code("eth1", 75);
        let err = stats.query("eth1").unwrap_err();
        assert!(matches!(err, FetchError::NonZeroExit { code: Some(75), .. }));
    }
}

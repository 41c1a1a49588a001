//! Abstractions over the two external surfaces the collector touches:
//! the sysfs device hierarchy and the ethtool binary.
//!
//! Both are traits so the pipeline can be exercised in tests with an
//! in-memory filesystem and canned command output (see [`crate::collector::mock`]).

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Filesystem operations needed for interface enumeration.
pub trait FileSystem: Send + Sync {
    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Resolves a symbolic link. Errors if `path` is not a symlink.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

/// Error raised while querying counters for one interface.
#[derive(Debug)]
pub enum FetchError {
    /// The ethtool binary does not exist. Fatal for the whole process.
    MissingBinary(PathBuf),
    /// Not allowed to execute the ethtool binary. Fatal for the whole process.
    PermissionDenied(PathBuf),
    /// ethtool ran but exited non-zero. Soft: the interface is skipped this tick.
    NonZeroExit {
        interface: String,
        code: Option<i32>,
    },
    /// Any other I/O failure spawning or reading the command.
    Io(io::Error),
}

impl FetchError {
    /// Soft errors skip one interface; everything else terminates the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FetchError::NonZeroExit { .. })
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::MissingBinary(path) => {
                write!(f, "{} not found, giving up", path.display())
            }
            FetchError::PermissionDenied(path) => {
                write!(f, "permission denied running {}", path.display())
            }
            FetchError::NonZeroExit { interface, code } => match code {
                Some(code) => write!(
                    f,
                    "ethtool returned exit code {} for interface {}",
                    code, interface
                ),
                None => write!(f, "ethtool was killed by a signal for interface {}", interface),
            },
            FetchError::Io(e) => write!(f, "I/O error running ethtool: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of raw counter text for one interface.
pub trait StatsSource: Send + Sync {
    /// Returns the raw `ethtool -S`-style output for `interface`.
    fn query(&self, interface: &str) -> Result<String, FetchError>;
}

/// Invokes the real ethtool binary with `-S <interface>`.
///
/// The invocation is blocking and has no timeout; a hung driver query ties
/// up the current tick.
#[derive(Debug, Clone)]
pub struct EthtoolRunner {
    binary: PathBuf,
}

impl EthtoolRunner {
    pub const DEFAULT_BINARY: &'static str = "/sbin/ethtool";

    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for EthtoolRunner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BINARY)
    }
}

impl StatsSource for EthtoolRunner {
    fn query(&self, interface: &str) -> Result<String, FetchError> {
        let output = Command::new(&self.binary)
            .arg("-S")
            .arg(interface)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => FetchError::MissingBinary(self.binary.clone()),
                io::ErrorKind::PermissionDenied => {
                    FetchError::PermissionDenied(self.binary.clone())
                }
                _ => FetchError::Io(e),
            })?;

        if !output.status.success() {
            return Err(FetchError::NonZeroExit {
                interface: interface.to_string(),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_dir() {
        let fs = RealFs::new();
        let src_dir = std::env::current_dir().unwrap().join("src");
        let entries = fs.read_dir(&src_dir).unwrap();
        assert!(!entries.is_empty());
    }

    #[test]
    fn test_real_fs_read_link_rejects_regular_file() {
        let fs = RealFs::new();
        let cargo_toml = std::env::current_dir().unwrap().join("Cargo.toml");
        assert!(fs.read_link(&cargo_toml).is_err());
    }

    #[test]
    fn test_missing_binary_is_fatal() {
        let runner = EthtoolRunner::new("/nonexistent/ethtool-12345");
        let err = runner.query("eth0").unwrap_err();
        assert!(matches!(err, FetchError::MissingBinary(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_zero_exit_is_soft() {
        let err = FetchError::NonZeroExit {
            interface: "eth0".to_string(),
            code: Some(75),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("75"));
        assert!(err.to_string().contains("eth0"));
    }
}

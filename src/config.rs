//! CLI arguments and validated runtime configuration.
//!
//! `Args` is the raw clap surface; `Config` is the typed configuration the
//! rest of the process runs on, produced once at startup. Mutually
//! exclusive destination flags and the whitelist/blacklist pair are
//! enforced by clap groups; mode-conditional rules (`--interval` and
//! `--oneshot` require textfile mode) are checked in [`Config::from_args`]
//! before any collection begins.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use regex::Regex;

use crate::collector::filter::{FilterError, StatFilter, anchored};
use crate::collector::traits::EthtoolRunner;

pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Collect ethtool metrics, publish them via http or save them to a file.
#[derive(Parser, Debug)]
#[command(
    name = "ethtool-exporter",
    about = "Collect ethtool metrics, publish them via http or save them to a file",
    version,
    group(ArgGroup::new("destination").required(true)),
    group(ArgGroup::new("stat_filter"))
)]
pub struct Args {
    /// Full file path where to store data for node collector to pick up.
    #[arg(short = 'f', long, group = "destination", value_name = "PATH")]
    pub textfile_name: Option<PathBuf>,

    /// Listen host:port, i.e. 0.0.0.0:9417.
    #[arg(short = 'l', long, group = "destination", value_name = "HOST:PORT")]
    pub listen: Option<String>,

    /// Number of seconds between updates of the textfile. Default is 5 seconds.
    #[arg(short = 'i', long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Only scrape interfaces whose name matches this regex.
    #[arg(short = 'I', long, default_value = ".*", value_name = "REGEX")]
    pub interface_regex: String,

    /// Run only once and exit. Useful for running in a cronjob.
    #[arg(short = '1', long)]
    pub oneshot: bool,

    /// Only include counters whose name matches this regex.
    /// Mutually exclusive with --blacklist-regex.
    #[arg(short = 'w', long, group = "stat_filter", value_name = "REGEX")]
    pub whitelist_regex: Option<String>,

    /// Exclude counters whose name matches this regex.
    /// Mutually exclusive with --whitelist-regex.
    #[arg(short = 'b', long, group = "stat_filter", value_name = "REGEX")]
    pub blacklist_regex: Option<String>,

    /// Path to the ethtool binary.
    #[arg(long, default_value = EthtoolRunner::DEFAULT_BINARY, value_name = "PATH")]
    pub ethtool_path: PathBuf,

    /// Path to the sysfs net class directory (for testing/mocking).
    #[arg(long, default_value = "/sys/class/net", value_name = "PATH")]
    pub sysfs_path: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Configuration error detected before any collection.
#[derive(Debug)]
pub enum ConfigError {
    IntervalRequiresTextfile,
    OneshotRequiresTextfile,
    BadListenAddr {
        addr: String,
        source: AddrParseError,
    },
    InterfacePattern(regex::Error),
    Filter(FilterError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IntervalRequiresTextfile => {
                write!(f, "--interval has to be used with textfile mode")
            }
            ConfigError::OneshotRequiresTextfile => {
                write!(f, "--oneshot has to be used with textfile mode")
            }
            ConfigError::BadListenAddr { addr, source } => {
                write!(f, "invalid listen address '{}': {}", addr, source)
            }
            ConfigError::InterfacePattern(e) => write!(f, "invalid interface regex: {}", e),
            ConfigError::Filter(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<FilterError> for ConfigError {
    fn from(e: FilterError) -> Self {
        ConfigError::Filter(e)
    }
}

/// How snapshots are delivered. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Serve /metrics over HTTP; collection is driven by scrape requests.
    Serve { addr: SocketAddr },
    /// Rewrite the textfile every `interval` until terminated.
    TextfilePeriodic { path: PathBuf, interval: Duration },
    /// Write the textfile once and exit.
    TextfileOnce { path: PathBuf },
}

/// Validated runtime configuration.
#[derive(Debug)]
pub struct Config {
    pub mode: Mode,
    pub interface_pattern: Regex,
    pub stat_filter: StatFilter,
    pub ethtool_path: PathBuf,
    pub sysfs_path: PathBuf,
}

impl Config {
    /// Validates parsed arguments into a `Config`.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.oneshot && args.textfile_name.is_none() {
            return Err(ConfigError::OneshotRequiresTextfile);
        }
        if args.interval.is_some() && args.textfile_name.is_none() {
            return Err(ConfigError::IntervalRequiresTextfile);
        }

        let stat_filter = StatFilter::from_patterns(
            args.whitelist_regex.as_deref(),
            args.blacklist_regex.as_deref(),
        )?;
        let interface_pattern =
            anchored(&args.interface_regex).map_err(ConfigError::InterfacePattern)?;

        let mode = if let Some(path) = args.textfile_name {
            if args.oneshot {
                Mode::TextfileOnce { path }
            } else {
                let interval =
                    Duration::from_secs(args.interval.unwrap_or(DEFAULT_INTERVAL_SECS));
                Mode::TextfilePeriodic { path, interval }
            }
        } else if let Some(listen) = args.listen {
            let addr = listen
                .parse()
                .map_err(|source| ConfigError::BadListenAddr {
                    addr: listen.clone(),
                    source,
                })?;
            Mode::Serve { addr }
        } else {
            // clap's required destination group guarantees one flag is set.
            unreachable!("destination group is required")
        };

        Ok(Config {
            mode,
            interface_pattern,
            stat_filter,
            ethtool_path: args.ethtool_path,
            sysfs_path: args.sysfs_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("ethtool-exporter").chain(argv.iter().copied()))
    }

    fn config(argv: &[&str]) -> Result<Config, ConfigError> {
        Config::from_args(parse(argv).expect("argv should pass clap"))
    }

    #[test]
    fn test_destination_is_required() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_textfile_and_listen_mutually_exclusive() {
        assert!(parse(&["-f", "/tmp/out.prom", "-l", "0.0.0.0:9417"]).is_err());
    }

    #[test]
    fn test_whitelist_and_blacklist_mutually_exclusive() {
        assert!(parse(&["-l", "0.0.0.0:9417", "-w", "rx", "-b", "tx"]).is_err());
    }

    #[test]
    fn test_serve_mode() {
        let config = config(&["-l", "127.0.0.1:9417"]).unwrap();
        match config.mode {
            Mode::Serve { addr } => assert_eq!(addr.port(), 9417),
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_textfile_mode_default_interval() {
        let config = config(&["-f", "/tmp/out.prom"]).unwrap();
        assert_eq!(
            config.mode,
            Mode::TextfilePeriodic {
                path: PathBuf::from("/tmp/out.prom"),
                interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            }
        );
    }

    #[test]
    fn test_oneshot_mode() {
        let config = config(&["-f", "/tmp/out.prom", "-1"]).unwrap();
        assert_eq!(
            config.mode,
            Mode::TextfileOnce {
                path: PathBuf::from("/tmp/out.prom"),
            }
        );
    }

    #[test]
    fn test_oneshot_ignores_interval() {
        // Interval is only meaningful for the periodic loop; a oneshot run
        // with textfile mode still performs exactly one cycle.
        let config = config(&["-f", "/tmp/out.prom", "-1", "-i", "30"]).unwrap();
        assert!(matches!(config.mode, Mode::TextfileOnce { .. }));
    }

    #[test]
    fn test_interval_without_textfile_rejected() {
        let err = config(&["-l", "0.0.0.0:9417", "-i", "30"]).unwrap_err();
        assert!(matches!(err, ConfigError::IntervalRequiresTextfile));
    }

    #[test]
    fn test_oneshot_without_textfile_rejected() {
        let err = config(&["-l", "0.0.0.0:9417", "-1"]).unwrap_err();
        assert!(matches!(err, ConfigError::OneshotRequiresTextfile));
    }

    #[test]
    fn test_bad_listen_address_rejected() {
        let err = config(&["-l", "not-an-address"]).unwrap_err();
        assert!(matches!(err, ConfigError::BadListenAddr { .. }));
    }

    #[test]
    fn test_exactly_one_filter_state_holds() {
        assert!(matches!(
            config(&["-l", "0.0.0.0:9417"]).unwrap().stat_filter,
            StatFilter::None
        ));
        assert!(matches!(
            config(&["-l", "0.0.0.0:9417", "-w", "rx"]).unwrap().stat_filter,
            StatFilter::Allow(_)
        ));
        assert!(matches!(
            config(&["-l", "0.0.0.0:9417", "-b", "rx"]).unwrap().stat_filter,
            StatFilter::Deny(_)
        ));
    }

    #[test]
    fn test_bad_whitelist_pattern_rejected() {
        let err = config(&["-l", "0.0.0.0:9417", "-w", "("]).unwrap_err();
        assert!(matches!(err, ConfigError::Filter(FilterError::Pattern(_))));
    }
}

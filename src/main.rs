//! ethtool-exporter - collect ethtool metrics, publish them via http or
//! save them to a file for the node-exporter textfile collector.

use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use ethtool_exporter::VERSION;
use ethtool_exporter::collector::{Collector, EthtoolRunner, RealFs};
use ethtool_exporter::config::{Args, Config, Mode};
use ethtool_exporter::publish;

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ethtool_exporter={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            eprintln!("Run 'ethtool-exporter --help' for usage.");
            process::exit(1);
        }
    };

    info!("ethtool-exporter {} starting", VERSION);

    let collector = Collector::new(
        RealFs::new(),
        EthtoolRunner::new(&config.ethtool_path),
        &config.sysfs_path,
        Some(config.interface_pattern),
        config.stat_filter,
    );

    let result = match config.mode {
        Mode::Serve { addr } => publish::serve(Arc::new(collector), addr),
        Mode::TextfilePeriodic { path, interval } => {
            info!(
                "writing {} every {}s",
                path.display(),
                interval.as_secs()
            );

            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                info!("received shutdown signal");
                r.store(false, Ordering::SeqCst);
            }) {
                warn!("failed to set Ctrl-C handler: {}", e);
            }

            publish::run_periodic(&collector, &path, interval, &running)
        }
        Mode::TextfileOnce { path } => publish::run_once(&collector, &path),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

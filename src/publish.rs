//! Publication modes: HTTP serve, periodic textfile, one-shot textfile.
//!
//! Serve mode binds once and collects on every scrape request; the two
//! textfile modes write the encoded snapshot atomically (write to a temp
//! file in the destination directory, then rename) so a reader never sees
//! a partially written file.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info};

use crate::collector::{CollectError, Collector, FileSystem, StatsSource};
use crate::metrics;

/// Error delivering a snapshot. [`CollectError`] variants pass through so
/// fatal environment errors reach the process exit code.
#[derive(Debug)]
pub enum PublishError {
    Collect(CollectError),
    Encode(prometheus::Error),
    Write { path: PathBuf, source: io::Error },
    Bind { addr: SocketAddr, source: io::Error },
    Serve(io::Error),
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::Collect(e) => write!(f, "{}", e),
            PublishError::Encode(e) => write!(f, "failed to encode metrics: {}", e),
            PublishError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            PublishError::Bind { addr, source } => {
                write!(f, "failed to bind {}: {}", addr, source)
            }
            PublishError::Serve(e) => write!(f, "http server error: {}", e),
        }
    }
}

impl std::error::Error for PublishError {}

impl From<CollectError> for PublishError {
    fn from(e: CollectError) -> Self {
        PublishError::Collect(e)
    }
}

impl From<prometheus::Error> for PublishError {
    fn from(e: prometheus::Error) -> Self {
        PublishError::Encode(e)
    }
}

/// Collects one snapshot and returns its text exposition.
fn collect_text<F: FileSystem, S: StatsSource>(
    collector: &Collector<F, S>,
) -> Result<String, PublishError> {
    let snapshot = collector.collect_snapshot()?;
    info!(
        "snapshot: {} counters across {} interfaces",
        snapshot.len(),
        snapshot.device_count()
    );
    Ok(metrics::encode_text(&snapshot)?)
}

/// Atomically replaces `path` with `contents`.
///
/// The temp file lives in the destination directory so the final rename
/// stays on one filesystem.
pub fn write_textfile(path: &Path, contents: &str) -> Result<(), PublishError> {
    let to_write_err = |source: io::Error| PublishError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(to_write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(to_write_err)?;
    tmp.persist(path).map_err(|e| to_write_err(e.error))?;
    Ok(())
}

/// One-shot mode: exactly one collection cycle, one atomic write.
pub fn run_once<F: FileSystem, S: StatsSource>(
    collector: &Collector<F, S>,
    path: &Path,
) -> Result<(), PublishError> {
    let text = collect_text(collector)?;
    write_textfile(path, &text)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Periodic mode: collect, write, sleep, repeat until `running` drops.
///
/// The sleep is sliced so a shutdown signal is noticed within ~100ms.
pub fn run_periodic<F: FileSystem, S: StatsSource>(
    collector: &Collector<F, S>,
    path: &Path,
    interval: Duration,
    running: &AtomicBool,
) -> Result<(), PublishError> {
    const SLEEP_SLICE: Duration = Duration::from_millis(100);

    while running.load(Ordering::SeqCst) {
        run_once(collector, path)?;

        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(SLEEP_SLICE);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    Ok(())
}

/// Serve mode: collection is demand-driven by scrape requests.
///
/// Each scrape builds its own snapshot, so concurrent scrapes need no
/// locking. Blocks until the server fails; there is no terminal state
/// short of external termination.
pub fn serve<F, S>(collector: Arc<Collector<F, S>>, addr: SocketAddr) -> Result<(), PublishError>
where
    F: FileSystem + 'static,
    S: StatsSource + 'static,
{
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve_async(collector, addr))
}

async fn serve_async<F, S>(
    collector: Arc<Collector<F, S>>,
    addr: SocketAddr,
) -> Result<(), PublishError>
where
    F: FileSystem + 'static,
    S: StatsSource + 'static,
{
    let app = Router::new()
        .route("/", get(index))
        .route("/metrics", get(scrape::<F, S>))
        .with_state(collector);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| PublishError::Bind { addr, source })?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app).await.map_err(PublishError::Serve)
}

async fn index() -> Html<&'static str> {
    Html(
        "<html><head><title>ethtool exporter</title></head>\
         <body><h1>ethtool exporter</h1><p><a href=\"/metrics\">Metrics</a></p></body></html>",
    )
}

/// Runs one collection tick per scrape request.
///
/// Fatal environment errors cannot terminate the process mid-request, so
/// the serve-mode rendition is a logged error plus HTTP 500.
async fn scrape<F, S>(State(collector): State<Arc<Collector<F, S>>>) -> Response
where
    F: FileSystem + 'static,
    S: StatsSource + 'static,
{
    let result =
        tokio::task::spawn_blocking(move || collect_text(collector.as_ref())).await;

    match result {
        Ok(Ok(body)) => {
            ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response()
        }
        Ok(Err(e)) => {
            error!("scrape failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("collection failed: {}\n", e),
            )
                .into_response()
        }
        Err(e) => {
            error!("scrape task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

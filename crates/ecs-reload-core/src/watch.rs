//! Signal-on-change file watcher.
//!
//! Watches a single file and sends a signal to the target container for every
//! change notification. Notifications are forwarded from the OS watcher thread
//! to one consumer task, so deliveries happen one at a time in arrival order.
//! There is no debouncing: a burst of writes yields one delivery per write.
//!
//! A write is recognised by the file being closed after writing, which happens
//! once per write session however many modify events the write raised. A file
//! renamed over the watched path (an editor's atomic save) counts once too.
//!
//! A failed delivery is logged and counted; the session keeps watching.

use crate::error::{Error, Result};
use crate::labels::short_id;
use crate::runtime::ContainerHandle;
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Signal sent when no other is configured.
pub const DEFAULT_SIGNAL: &str = "SIGHUP";

/// Counters for a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Change events received for the watched file.
    pub events: u64,
    /// Signals delivered successfully.
    pub delivered: u64,
    /// Signals that failed to deliver.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    events: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// An active file watch. Dropping the session closes it.
pub struct WatchSession {
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    consumer: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl WatchSession {
    /// The watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the session counters
    pub fn stats(&self) -> WatchStats {
        WatchStats {
            events: self.counters.events.load(Ordering::SeqCst),
            delivered: self.counters.delivered.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }

    /// Whether the session is still watching.
    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop watching and release the OS watch. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.watcher.take().is_some() {
            info!(path = %self.path.display(), "Closed file watch");
        }
        if let Some(consumer) = self.consumer.take() {
            consumer.abort();
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("path", &self.path)
            .field("active", &self.is_active())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Watch `path` and send `signal` to `target` on every change.
///
/// `path` must be an existing regular file; this is checked once, here. The
/// parent directory is observed so the file stays watched if it is deleted
/// and recreated. Must be called from within a tokio runtime.
pub async fn watch<H>(target: H, path: impl AsRef<Path>, signal: impl Into<String>) -> Result<WatchSession>
where
    H: ContainerHandle + 'static,
{
    let path = path.as_ref().to_path_buf();
    let signal = signal.into();

    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    let file_name = match path.file_name() {
        Some(name) if is_file => name.to_os_string(),
        _ => return Err(Error::NotAFile(path)),
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_change(&event, &file_name) => {
            let _ = tx.send(event);
        }
        Ok(_) => {}
        Err(e) => warn!("File watcher error: {}", e),
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    let counters = Arc::new(Counters::default());
    let consumer = tokio::spawn(deliver_signals(
        target,
        signal.clone(),
        path.clone(),
        rx,
        Arc::clone(&counters),
    ));

    info!(
        path = %path.display(),
        signal = %signal,
        "Watching file for changes"
    );

    Ok(WatchSession {
        path,
        watcher: Some(watcher),
        consumer: Some(consumer),
        counters,
    })
}

/// Whether `event` completes a change of the watched file.
///
/// Truncation and each `write(2)` raise separate modify events, and creating
/// a file is followed by its close-after-write, so only the close and the
/// rename target are counted.
fn is_change(event: &Event, file_name: &OsString) -> bool {
    matches!(
        event.kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Consumer loop: one delivery attempt per event, failures never end the loop.
async fn deliver_signals<H>(
    target: H,
    signal: String,
    path: PathBuf,
    mut events: mpsc::UnboundedReceiver<Event>,
    counters: Arc<Counters>,
) where
    H: ContainerHandle,
{
    while let Some(event) = events.recv().await {
        counters.events.fetch_add(1, Ordering::SeqCst);
        info!(
            "Watch event: {:?}, file: {}; signalling restart.",
            event.kind,
            path.display()
        );

        match target.signal(&signal).await {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::SeqCst);
                debug!(container = %short_id(target.id()), signal = %signal, "Signal delivered");
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::SeqCst);
                let err = Error::SignalDeliveryFailed {
                    container: short_id(target.id()).to_string(),
                    signal: signal.clone(),
                    reason: e.to_string(),
                };
                error!("{}", err);
            }
        }
    }
    debug!(path = %path.display(), "Watch event stream ended");
}

/* 📖 # How the change watcher works
The watcher polls instead of subscribing to filesystem events. Every interval it
walks the served directory through the PAL, records each watched file's
modification time in a fresh `Snapshot`, and compares it with the previous one.

At most one `ChangeNotification` is emitted per poll, naming the first changed or
new file. The previous snapshot is then replaced wholesale, so several edits that
land within one interval coalesce into a single notification. Deleted files simply
drop out of the next snapshot and are not reported.

Nothing here ever stops the loop: walk errors and vanished files are skipped, and
the thread only exits once its handle signals shutdown.
*/

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, instrument, warn};

use groomsite_base::{FilePath, GroomsiteResult, PalHandle};

use crate::config::WatchConfig;

/// Watched file path -> last observed modification time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<FilePath, SystemTime>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: FilePath, modified: SystemTime) {
        self.entries.insert(path, modified);
    }

    pub fn get(&self, path: &FilePath) -> Option<SystemTime> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &FilePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilePath, SystemTime)> {
        self.entries.iter().map(|(path, modified)| (path, *modified))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub path: FilePath,
}

fn extension_globs(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|extension| format!("**/*.{}", extension.trim_start_matches('.')))
        .collect()
}

/// Record the modification time of every watched file under `root`.
///
/// A missing root yields an empty snapshot. Files whose metadata cannot be read,
/// and entries the walk fails on, are left out.
pub fn scan(pal: &PalHandle, root: &FilePath, extensions: &[String]) -> Snapshot {
    let mut snapshot = Snapshot::new();
    match pal.file_exists(root) {
        Ok(true) => {}
        Ok(false) => return snapshot,
        Err(e) => {
            debug!(root = %root, error = %e, "could not check watch root");
            return snapshot;
        }
    }

    let entries = match pal.walk_directory(root, &extension_globs(extensions)) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(root = %root, error = %e, "could not walk watch root");
            return snapshot;
        }
    };
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        match pal.modified_time(&path) {
            Ok(modified) => snapshot.insert(path, modified),
            // vanished between listing and stat
            Err(_) => continue,
        }
    }
    snapshot
}

/// The first path in `current` that is new or whose modification time moved.
pub fn detect_change(previous: &Snapshot, current: &Snapshot) -> Option<FilePath> {
    current
        .iter()
        .find(|(path, modified)| previous.get(path) != Some(*modified))
        .map(|(path, _)| path.clone())
}

type ChangeCallback = Box<dyn FnMut(&ChangeNotification) + Send>;

fn log_change(notification: &ChangeNotification) {
    info!(path = %notification.path, "file changed");
}

/// Polls a directory for modified files.
pub struct ChangeWatcher {
    pal: PalHandle,
    root: FilePath,
    extensions: Vec<String>,
    interval: Duration,
    snapshot: Snapshot,
    on_change: ChangeCallback,
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("root", &self.root)
            .field("extensions", &self.extensions)
            .field("interval", &self.interval)
            .field("watched_files", &self.snapshot.len())
            .finish()
    }
}

impl ChangeWatcher {
    /// Takes the initial snapshot right away, so only later edits are reported.
    pub fn new(pal: PalHandle, root: FilePath, config: &WatchConfig) -> Self {
        let snapshot = scan(&pal, &root, &config.extensions);
        debug!(root = %root, files = snapshot.len(), "initial snapshot taken");
        Self {
            pal,
            root,
            extensions: config.extensions.clone(),
            interval: Duration::from_millis(config.interval_ms.max(1)),
            snapshot,
            on_change: Box::new(log_change),
        }
    }

    /// Replace the default action, which logs the changed path.
    pub fn on_change(mut self, callback: impl FnMut(&ChangeNotification) + Send + 'static) -> Self {
        self.on_change = Box::new(callback);
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// One poll iteration without the sleep.
    pub fn poll_once(&mut self) -> Option<ChangeNotification> {
        let current = scan(&self.pal, &self.root, &self.extensions);
        let notification = detect_change(&self.snapshot, &current).map(|path| ChangeNotification { path });
        if let Some(notification) = &notification {
            (self.on_change)(notification);
        }
        self.snapshot = current;
        notification
    }

    /// Run the poll loop on a dedicated thread until the handle is stopped.
    #[instrument(skip(self), fields(root = %self.root, interval_ms = self.interval.as_millis() as u64))]
    pub fn start(mut self) -> GroomsiteResult<ChangeWatcherHandle> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let thread = std::thread::Builder::new()
            .name("change-watcher".to_string())
            .spawn(move || {
                while sleep_unless_shutdown(self.interval, &flag) {
                    self.poll_once();
                }
                debug!("change watcher stopped");
            })
            .map_err(|e| groomsite_base::err!("Failed to spawn change watcher thread: {}", e))?;
        info!("watching for changes");
        Ok(ChangeWatcherHandle {
            shutdown,
            thread: Some(thread),
        })
    }
}

const SHUTDOWN_CHECK: Duration = Duration::from_millis(50);

/// Sleep for `interval`, waking early on shutdown. False once shutdown was requested.
fn sleep_unless_shutdown(interval: Duration, shutdown: &AtomicBool) -> bool {
    let mut remaining = interval;
    while !remaining.is_zero() {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(SHUTDOWN_CHECK);
        std::thread::sleep(step);
        remaining -= step;
    }
    !shutdown.load(Ordering::SeqCst)
}

/// Handle to a running watcher thread. Dropping it signals shutdown.
#[derive(Debug)]
pub struct ChangeWatcherHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ChangeWatcherHandle {
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Signals shutdown and waits for the poll loop to exit.
    pub fn stop(mut self) {
        self.shutdown();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("change watcher thread panicked");
        }
    }
}

impl Drop for ChangeWatcherHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! File system watcher feeding the build orchestrator.
//!
//! Watched files are observed non-recursively and watched directories
//! recursively. Paths are canonicalized before attaching, so symlinked
//! entries are followed. No events are produced for what already exists.

use crate::error::Result;
use devedge_build::{BuildTrigger, TriggerKind};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Capacity of the change channel between notify's thread and the runtime.
const CHANGE_QUEUE: usize = 100;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was created
    Added(PathBuf),
    /// File was modified
    Modified(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Added(p) | FileChange::Modified(p) | FileChange::Removed(p) => p,
        }
    }

    pub fn kind(&self) -> TriggerKind {
        match self {
            FileChange::Added(_) => TriggerKind::Added,
            FileChange::Modified(_) => TriggerKind::Modified,
            FileChange::Removed(_) => TriggerKind::Removed,
        }
    }

    /// Build request for this change, with the path shown relative to `base`
    /// when it lies inside it.
    pub fn to_trigger(&self, base: &Path) -> BuildTrigger {
        let path = self.path();
        let shown = path.strip_prefix(base).unwrap_or(path);
        BuildTrigger::new(shown.display().to_string(), self.kind())
    }

    /// Changes described by one notify event. Access and metadata-only
    /// events yield nothing.
    pub fn from_event(event: &Event) -> Vec<FileChange> {
        let each = |make: fn(PathBuf) -> FileChange| -> Vec<FileChange> {
            event.paths.iter().cloned().map(make).collect()
        };

        match event.kind {
            EventKind::Create(_) => each(FileChange::Added),
            EventKind::Remove(_) => each(FileChange::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => each(FileChange::Removed),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => each(FileChange::Added),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let mut paths = event.paths.iter().cloned();
                paths
                    .next()
                    .map(FileChange::Removed)
                    .into_iter()
                    .chain(paths.next().map(FileChange::Added))
                    .collect()
            }
            EventKind::Modify(_) => each(FileChange::Modified),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
        }
    }
}

/// Which configured paths ended up attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchReport {
    pub attached: Vec<PathBuf>,
    /// Path and the reason it could not be watched
    pub failed: Vec<(PathBuf, String)>,
}

/// Drops repeats of the same path inside a time window.
#[derive(Debug)]
struct Debouncer {
    window: Duration,
    last_seen: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: HashMap::new(),
        }
    }

    fn admit(&mut self, path: &Path, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }
        // Entries past the window can no longer suppress anything.
        let window = self.window;
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) < window);

        if self.last_seen.contains_key(path) {
            return false;
        }
        self.last_seen.insert(path.to_path_buf(), now);
        true
    }
}

/// Watches the configured paths until dropped.
pub struct ChangeWatcher {
    /// Underlying notify watcher
    _watcher: RecommendedWatcher,
    report: WatchReport,
}

impl ChangeWatcher {
    /// Start watching.
    ///
    /// A path that cannot be watched is logged and recorded in the report;
    /// the remaining paths are still attached.
    ///
    /// # Errors
    ///
    /// Returns an error only if the platform watcher cannot be created.
    pub fn new(
        paths: &[PathBuf],
        debounce: Duration,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(CHANGE_QUEUE);
        let mut debouncer = Debouncer::new(debounce);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!("Watcher error: {}", e);
                    return;
                }
            };

            for change in FileChange::from_event(&event) {
                if !debouncer.admit(change.path(), Instant::now()) {
                    continue;
                }
                // notify calls back on its own thread, outside the runtime.
                if tx.blocking_send(change).is_err() {
                    return;
                }
            }
        })?;

        let mut report = WatchReport::default();
        for path in paths {
            match attach(&mut watcher, path) {
                Ok(canonical) => report.attached.push(canonical),
                Err(reason) => {
                    tracing::error!("Cannot watch {}: {}", path.display(), reason);
                    report.failed.push((path.clone(), reason));
                }
            }
        }

        Ok((
            Self {
                _watcher: watcher,
                report,
            },
            rx,
        ))
    }

    pub fn report(&self) -> &WatchReport {
        &self.report
    }
}

fn attach(watcher: &mut RecommendedWatcher, path: &Path) -> std::result::Result<PathBuf, String> {
    let canonical = std::fs::canonicalize(path).map_err(|e| e.to_string())?;
    let mode = if canonical.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher
        .watch(&canonical, mode)
        .map_err(|e| e.to_string())?;
    Ok(canonical)
}

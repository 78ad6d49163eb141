//! Serialized rebuild orchestration.
//!
//! [`BuildOrchestrator`] owns the bundler and the target list. A rebuild takes
//! `&mut self`, so two runs can never overlap on the same orchestrator. For the
//! server, [`BuildOrchestrator::spawn`] moves it onto a dedicated task fed by a
//! bounded channel; triggers that arrive while a run is in flight are
//! coalesced into a single follow-up run.

use crate::bundler::Bundler;
use crate::error::BuildError;
use crate::metafile::BuildStats;
use crate::target::BuildTarget;
use std::fmt;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Capacity of the trigger queue between the watcher and the build task.
const TRIGGER_QUEUE: usize = 64;

/// What caused a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Startup,
    Added,
    Modified,
    Removed,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerKind::Startup => "startup",
            TriggerKind::Added => "add",
            TriggerKind::Modified => "modify",
            TriggerKind::Removed => "remove",
        })
    }
}

/// Rebuild request. Only used for logging; every run rebuilds all targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTrigger {
    pub path: String,
    pub kind: TriggerKind,
}

impl BuildTrigger {
    pub fn new(path: impl Into<String>, kind: TriggerKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// The synthetic trigger used for the initial build.
    pub fn startup() -> Self {
        Self::new("all", TriggerKind::Startup)
    }
}

impl fmt::Display for BuildTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}

/// Build status tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// No build has been performed yet
    NotStarted,
    /// Build is currently in progress
    InProgress { generation: u64 },
    /// Build completed successfully
    Success {
        generation: u64,
        duration_ms: u64,
        stats: BuildStats,
    },
    /// Build failed with error
    Failed { generation: u64, error: BuildError },
}

impl BuildStatus {
    /// Check if build is currently running.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress { .. })
    }

    /// Check if last build succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    /// Generation of the run this status describes (0 before the first run).
    pub fn generation(&self) -> u64 {
        match self {
            BuildStatus::NotStarted => 0,
            BuildStatus::InProgress { generation }
            | BuildStatus::Success { generation, .. }
            | BuildStatus::Failed { generation, .. } => *generation,
        }
    }

    /// Get error if failed.
    pub fn error(&self) -> Option<&BuildError> {
        match self {
            BuildStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Owner of the bundler and the single serialization point for builds.
pub struct BuildOrchestrator<B> {
    bundler: B,
    targets: Vec<BuildTarget>,
    vendor_marker: String,
    generation: u64,
    status: watch::Sender<BuildStatus>,
}

impl<B: Bundler + 'static> BuildOrchestrator<B> {
    /// Create an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `bundler` - Long-lived compiler instance, reused for every run
    /// * `targets` - Targets compiled by every run, in order
    /// * `vendor_marker` - Input path prefix identifying third-party modules
    pub fn new(bundler: B, targets: Vec<BuildTarget>, vendor_marker: impl Into<String>) -> Self {
        let (status, _) = watch::channel(BuildStatus::NotStarted);
        Self {
            bundler,
            targets,
            vendor_marker: vendor_marker.into(),
            generation: 0,
            status,
        }
    }

    /// Number of runs started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<BuildStatus> {
        self.status.subscribe()
    }

    /// Rebuild every target.
    ///
    /// The trigger is only logged. Targets are compiled in order and a failing
    /// target does not stop the ones after it; the run fails if any target
    /// failed, with all their messages collected.
    pub async fn rebuild(&mut self, trigger: &BuildTrigger) -> Result<BuildStats, BuildError> {
        self.generation += 1;
        let generation = self.generation;
        let start = Instant::now();

        tracing::info!("Build: file {} (generation {})", trigger, generation);
        self.status
            .send_replace(BuildStatus::InProgress { generation });

        let mut stats = BuildStats::default();
        let mut errors = Vec::new();

        for target in &self.targets {
            let label = target.label();
            match self.bundler.bundle(target).await {
                Ok(metafile) => stats.merge(metafile.stats(&self.vendor_marker)),
                Err(err) => errors.extend(err.for_target(&label).errors),
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        if errors.is_empty() {
            tracing::info!("Build stats: {} in {}ms", stats, duration_ms);
            self.status.send_replace(BuildStatus::Success {
                generation,
                duration_ms,
                stats: stats.clone(),
            });
            Ok(stats)
        } else {
            let error = BuildError::new(errors);
            tracing::error!("Build error {}", error.to_json());
            self.status.send_replace(BuildStatus::Failed {
                generation,
                error: error.clone(),
            });
            Err(error)
        }
    }

    /// Move the orchestrator onto its own task.
    ///
    /// The returned handle is the only way to request builds afterwards.
    pub fn spawn(self) -> BuildHandle {
        let (tx, rx) = mpsc::channel(TRIGGER_QUEUE);
        let status = self.subscribe();
        let task = tokio::spawn(self.run(rx));
        BuildHandle { tx, status, task }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<BuildTrigger>) {
        while let Some(trigger) = rx.recv().await {
            // Everything queued behind this trigger is covered by the same run.
            let mut coalesced = 0usize;
            while let Ok(extra) = rx.try_recv() {
                tracing::debug!("Coalescing build trigger: {}", extra);
                coalesced += 1;
            }
            if coalesced > 0 {
                tracing::debug!("{} queued triggers folded into one build", coalesced);
            }

            // Failures are logged by rebuild; the previous output stays on disk.
            let _ = self.rebuild(&trigger).await;
        }
        tracing::debug!("Build task stopped after {} runs", self.generation);
    }
}

/// Handle to a spawned [`BuildOrchestrator`].
pub struct BuildHandle {
    tx: mpsc::Sender<BuildTrigger>,
    status: watch::Receiver<BuildStatus>,
    task: JoinHandle<()>,
}

impl BuildHandle {
    /// Request a rebuild without waiting for it.
    ///
    /// Returns `false` only if the build task has stopped. A full queue means
    /// a rebuild is already pending, so the trigger is dropped.
    pub fn trigger(&self, trigger: BuildTrigger) -> bool {
        match self.tx.try_send(trigger) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(trigger)) => {
                tracing::debug!("Build queue full, dropping trigger: {}", trigger);
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Watch the status of the most recent run.
    pub fn status(&self) -> watch::Receiver<BuildStatus> {
        self.status.clone()
    }

    /// Stop immediately. A run in flight is cancelled and its bundler
    /// process killed.
    pub fn abort(self) {
        self.task.abort();
    }

    /// Stop accepting triggers and wait for queued runs to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::error!("Build task failed: {}", e);
        }
    }
}

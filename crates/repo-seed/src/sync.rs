use std::num::NonZeroUsize;
use std::path::Path;

use futures::StreamExt;

use crate::cancel::CancelFlag;
use crate::feedback::{Feedback, ProgressSink};
use crate::store::{ContentStore, RepoHandle};
use crate::walk::{DirectoryWalker, SkipReason, WalkEntry, WalkError, WalkItem};

/// How one file's reconciliation against the remote store ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Created,
    Updated,
    Failed(String),
}

/// Per-file result; created and discarded within one file's sync step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Normalized relative path, the file's remote key.
    pub path: String,
    pub status: SyncStatus,
}

/// Aggregated result of one synchronization pass.
///
/// Outcomes appear in walker order; a single file's failure never aborts
/// the pass, it just shows up here as `Failed`.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
    /// Non-fatal warnings raised during the pass (skipped symlinks,
    /// unreadable entries).
    pub feedback: Vec<Feedback>,
    /// True when cancellation stopped the pass before every file was tried.
    pub cancelled: bool,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Created))
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Updated))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&SyncStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Tuning for a synchronization pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Files reconciled concurrently. 1 keeps the pass strictly sequential
    /// (one remote call in flight at a time), which is the default given
    /// remote-store rate limits.
    pub concurrency: NonZeroUsize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: NonZeroUsize::MIN,
        }
    }
}

enum Step {
    Outcome(SyncOutcome),
    Warning(Feedback),
    Cancelled,
}

/// Reconcile every regular file under `root` with the remote repository.
///
/// Per file: read local bytes in full, probe the remote path, then update
/// (existing handle's version token as precondition) or create. Store
/// errors become a `Failed` outcome for that file and the pass moves on.
/// No retries happen here; that is caller policy.
///
/// With `concurrency` above 1 the per-file steps run across a bounded pool;
/// report order still matches walker order, and the flag is checked before
/// each file starts so cancellation takes effect between file operations.
pub async fn synchronize(
    store: &dyn ContentStore,
    repo: &RepoHandle,
    root: &Path,
    options: &SyncOptions,
    sink: &dyn ProgressSink,
    cancel: &CancelFlag,
) -> Result<SyncReport, WalkError> {
    let walker = DirectoryWalker::new(root)?;
    let mut report = SyncReport::default();

    let stream = futures::stream::iter(walker.iter())
        .map(|item| async move {
            match item {
                WalkItem::File(entry) => {
                    if cancel.is_cancelled() {
                        return Step::Cancelled;
                    }
                    Step::Outcome(sync_file(store, repo, entry, sink).await)
                }
                WalkItem::Skipped { path, reason } => {
                    let kind = match reason {
                        SkipReason::Symlink => "symlink",
                        SkipReason::Special => "special file",
                        SkipReason::NonUnicode => "non-unicode file name",
                    };
                    Step::Warning(Feedback::warning(format!(
                        "skipping {kind}: {}",
                        path.display()
                    )))
                }
                WalkItem::Unreadable { path, error } => Step::Warning(Feedback::warning(
                    format!("cannot read {}: {error}", path.display()),
                )),
            }
        })
        .buffered(options.concurrency.get());
    futures::pin_mut!(stream);

    // Draining the whole stream even after cancellation lets files already
    // in flight finish naturally; they are never interrupted mid-write.
    while let Some(step) = stream.next().await {
        match step {
            Step::Outcome(outcome) => report.outcomes.push(outcome),
            Step::Warning(event) => {
                sink.emit(event.clone());
                report.feedback.push(event);
            }
            Step::Cancelled => {
                if !report.cancelled {
                    report.cancelled = true;
                    let event = Feedback::warning("sync cancelled");
                    sink.emit(event.clone());
                    report.feedback.push(event);
                }
            }
        }
    }

    Ok(report)
}

async fn sync_file(
    store: &dyn ContentStore,
    repo: &RepoHandle,
    entry: WalkEntry,
    sink: &dyn ProgressSink,
) -> SyncOutcome {
    let path = entry.relative;

    // Whole-file read; the engine has no streaming mode.
    let content = match std::fs::read(&entry.absolute) {
        Ok(bytes) => bytes,
        Err(e) => {
            let reason = format!("failed to read {}: {e}", entry.absolute.display());
            sink.emit(Feedback::error(format!("Failed to add/update {path}: {reason}")));
            return SyncOutcome {
                path,
                status: SyncStatus::Failed(reason),
            };
        }
    };

    let result = match store.file_handle(repo, &path).await {
        Ok(Some(existing)) => store
            .update_file(
                repo,
                &path,
                &content,
                &format!("Update {path}"),
                &existing.version,
            )
            .await
            .map(|()| SyncStatus::Updated),
        Ok(None) => store
            .create_file(repo, &path, &content, &format!("Add {path}"))
            .await
            .map(|()| SyncStatus::Created),
        Err(e) => Err(e),
    };

    match result {
        Ok(status) => {
            let verb = match status {
                SyncStatus::Updated => "Updated",
                _ => "Added",
            };
            sink.emit(Feedback::info(format!("{verb}: {path}")));
            SyncOutcome { path, status }
        }
        Err(e) => {
            sink.emit(Feedback::error(format!("Failed to add/update {path}: {e}")));
            SyncOutcome {
                path,
                status: SyncStatus::Failed(e.to_string()),
            }
        }
    }
}

use std::fmt::Display;

use serde::Serialize;

use crate::diff::{SnapshotDiff, diff_snapshots};
use crate::extract::parse_course_list;
use crate::fetch::{DocumentSource, FetchError};
use crate::notify::{Notifier, NotifyError, format_added_message};
use crate::pdf::{self, PdfError};
use crate::store::{SnapshotStore, StoreError};
use crate::types::{Course, Snapshot, Watch};

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("PDF extraction failed: {0}")]
    Pdf(#[from] PdfError),
    #[error("snapshot store failed: {0}")]
    Store(#[from] StoreError),
    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),
}

/// Result of one watch within a run.
#[derive(Debug, Clone, Serialize)]
pub struct WatchOutcome {
    pub watch: String,
    pub course_count: usize,
    pub added: Vec<Course>,
    pub removed: Vec<Course>,
}

impl Display for WatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "[{}] {} course(s), {} new, {} removed",
            self.watch,
            self.course_count,
            self.added.len(),
            self.removed.len()
        )?;
        for course in &self.added {
            writeln!(f, "  + {}", course)?;
        }
        for course in &self.removed {
            writeln!(f, "  - {}", course)?;
        }
        Ok(())
    }
}

/// Summary across all configured watches of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<WatchOutcome>,
}

impl RunReport {
    /// Whether any watch produced additions, the run-level signal handed
    /// back to the invoking environment.
    pub fn has_new(&self) -> bool {
        self.outcomes.iter().any(|o| !o.added.is_empty())
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for outcome in &self.outcomes {
            write!(f, "{}", outcome)?;
        }
        let new_total: usize = self.outcomes.iter().map(|o| o.added.len()).sum();
        writeln!(
            f,
            "{} new course(s) across {} watch(es)",
            new_total,
            self.outcomes.len()
        )
    }
}

/// Sequential search-and-notify loop. Watches are processed in list order;
/// the first failure aborts the remaining watches and leaves their
/// snapshots untouched.
pub struct Watcher<D, S, N> {
    source: D,
    store: S,
    notifier: N,
}

impl<D: DocumentSource, S: SnapshotStore, N: Notifier> Watcher<D, S, N> {
    pub fn new(source: D, store: S, notifier: N) -> Self {
        Self {
            source,
            store,
            notifier,
        }
    }

    pub async fn run(&self, watches: &[Watch]) -> Result<RunReport, WatchError> {
        let mut report = RunReport::default();
        for watch in watches {
            report.outcomes.push(self.run_watch(watch).await?);
        }
        Ok(report)
    }

    async fn run_watch(&self, watch: &Watch) -> Result<WatchOutcome, WatchError> {
        log::info!("Checking '{}'...", watch.name);

        let prev = self.store.load(&watch.state_key)?;
        let bytes = self.source.fetch_document(&watch.search_url).await?;
        let text = pdf::extract_text(&bytes)?;
        let curr = parse_course_list(&text);

        self.settle(watch, &prev, curr).await
    }

    /// Diff against the prior snapshot, announce additions, then persist the
    /// new baseline. Persisting happens even when nothing changed; delivery
    /// failures abort before the save, so the additions are announced again
    /// on the next run.
    async fn settle(
        &self,
        watch: &Watch,
        prev: &Snapshot,
        curr: Snapshot,
    ) -> Result<WatchOutcome, WatchError> {
        let SnapshotDiff { added, removed } = diff_snapshots(prev, &curr);
        log::info!(
            "'{}': {} course(s), {} new, {} removed",
            watch.name,
            curr.len(),
            added.len(),
            removed.len()
        );

        if !added.is_empty() {
            let message = format_added_message(&watch.name, &added);
            self.notifier.send_text(&message).await?;
        }

        self.store.save(&watch.state_key, &curr)?;

        Ok(WatchOutcome {
            watch: watch.name.clone(),
            course_count: curr.len(),
            added,
            removed,
        })
    }
}

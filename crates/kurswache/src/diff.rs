use crate::types::{Course, Snapshot};

/// Added/removed partitions between the prior and the current snapshot of
/// one watch, both sorted ascending by course id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<Course>,
    pub removed: Vec<Course>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Pure set comparison on course ids. A record that keeps its id but changes
/// content upstream does not count as a change.
pub fn diff_snapshots(prev: &Snapshot, curr: &Snapshot) -> SnapshotDiff {
    let mut added_ids: Vec<&str> = curr
        .keys()
        .filter(|id| !prev.contains_key(id.as_str()))
        .map(String::as_str)
        .collect();
    added_ids.sort_unstable();

    let mut removed_ids: Vec<&str> = prev
        .keys()
        .filter(|id| !curr.contains_key(id.as_str()))
        .map(String::as_str)
        .collect();
    removed_ids.sort_unstable();

    SnapshotDiff {
        added: added_ids.iter().map(|id| curr[*id].clone()).collect(),
        removed: removed_ids.iter().map(|id| prev[*id].clone()).collect(),
    }
}

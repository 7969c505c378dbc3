//! Commit ordering and release boundaries

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use regex::Regex;
use tidings_core::{ChangelogError, Result};
use tracing::{debug, trace};

use crate::types::Commit;

/// Commits between two release boundaries, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSlice {
    /// Tag closing this slice; `None` for unreleased commits
    pub version: Option<String>,
    /// Timestamp of the tagged commit
    pub timestamp: Option<DateTime<Utc>>,
    /// Commits in this slice
    pub commits: Vec<Commit>,
}

/// Order commits oldest-first.
///
/// By timestamp unless `topo_order` is set, in which case every parent
/// precedes its children and ties fall back to timestamp, then input order.
pub fn order_commits(commits: Vec<Commit>, topo_order: bool) -> Result<Vec<Commit>> {
    if topo_order {
        return topological_order(commits);
    }

    let mut commits = commits;
    commits.sort_by_key(|c| c.timestamp);
    Ok(commits)
}

fn topological_order(commits: Vec<Commit>) -> Result<Vec<Commit>> {
    let index: HashMap<&str, usize> = commits
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut pending_parents = vec![0usize; commits.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); commits.len()];
    for (i, commit) in commits.iter().enumerate() {
        for parent in &commit.parents {
            // Parents outside the input are already released
            if let Some(&p) = index.get(parent.as_str()) {
                pending_parents[i] += 1;
                children[p].push(i);
            }
        }
    }

    let mut ready: BTreeSet<(DateTime<Utc>, usize)> = commits
        .iter()
        .enumerate()
        .filter(|(i, _)| pending_parents[*i] == 0)
        .map(|(i, c)| (c.timestamp, i))
        .collect();

    let mut order = Vec::with_capacity(commits.len());
    while let Some(next) = ready.pop_first() {
        let (_, i) = next;
        order.push(i);
        for &child in &children[i] {
            pending_parents[child] -= 1;
            if pending_parents[child] == 0 {
                ready.insert((commits[child].timestamp, child));
            }
        }
    }

    if order.len() != commits.len() {
        let stuck = (0..commits.len())
            .find(|i| pending_parents[*i] > 0)
            .map(|i| commits[i].id.clone())
            .unwrap_or_default();
        return Err(ChangelogError::CyclicHistory(stuck).into());
    }

    trace!(commits = order.len(), "commits ordered by ancestry");
    let mut slots: Vec<Option<Commit>> = commits.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

/// Split oldest-first commits into release slices, oldest release first.
///
/// A tagged commit closes the current slice unless its tag matches
/// `ignore_tags`. Trailing untagged commits form the unreleased slice,
/// which is omitted when empty.
pub fn split_releases(commits: Vec<Commit>, ignore_tags: Option<&Regex>) -> Vec<ReleaseSlice> {
    let mut releases = Vec::new();
    let mut current = Vec::new();

    for commit in commits {
        let boundary = commit
            .tag
            .clone()
            .filter(|tag| !ignore_tags.is_some_and(|re| re.is_match(tag)));
        let timestamp = commit.timestamp;
        current.push(commit);

        if let Some(tag) = boundary {
            trace!(tag = %tag, commits = current.len(), "release boundary");
            releases.push(ReleaseSlice {
                version: Some(tag),
                timestamp: Some(timestamp),
                commits: std::mem::take(&mut current),
            });
        }
    }

    if !current.is_empty() {
        releases.push(ReleaseSlice {
            version: None,
            timestamp: None,
            commits: current,
        });
    }

    debug!(releases = releases.len(), "commits split into releases");
    releases
}

/// Turn every non-empty line of a message into its own commit
pub fn split_commit(commit: &Commit) -> Vec<Commit> {
    commit
        .message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Commit {
            message: line.to_string(),
            ..commit.clone()
        })
        .collect()
}

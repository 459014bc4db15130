use crate::model::{ActivityLedger, CommitRecord, FileChange};
use crate::util::WeekWindow;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MERGE_MARKERS: [&str; 3] = ["Merge branch", "Merged in", "Merge commit"];
pub const GENERATED_SUFFIX: &str = "project.pbxproj";
pub const LARGE_COMMIT_LINES: u64 = 500;
pub const MIN_MESSAGE_LEN: usize = 15;
/// A 7 hour working day.
pub const WORKDAY_MINUTES: f64 = 7.0 * 60.0;

/// Decides whether a commit is a merge and so excluded from line metrics.
pub trait MergeRule {
    fn is_merge(&self, commit: &CommitRecord) -> bool;
}

/// Matches the message markers written by git and Bitbucket merges.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageHeuristic;

impl MergeRule for MessageHeuristic {
    fn is_merge(&self, commit: &CommitRecord) -> bool {
        is_merge_message(&commit.message)
    }
}

/// Message heuristic, plus any commit with two or more parents.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageOrParents;

impl MergeRule for MessageOrParents {
    fn is_merge(&self, commit: &CommitRecord) -> bool {
        commit.parent_ids.len() > 1 || is_merge_message(&commit.message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeDetection {
    #[default]
    Message,
    MessageOrParents,
}

impl MergeDetection {
    pub fn rule(self) -> Box<dyn MergeRule> {
        match self {
            MergeDetection::Message => Box::new(MessageHeuristic),
            MergeDetection::MessageOrParents => Box::new(MessageOrParents),
        }
    }
}

pub fn is_merge_message(message: &str) -> bool {
    MERGE_MARKERS.iter().any(|marker| message.contains(marker))
}

pub fn is_generated(file: &FileChange) -> bool {
    file.paths().any(|p| p.ends_with(GENERATED_SUFFIX))
}

pub fn is_test_path(path: &str) -> bool {
    path.to_lowercase().contains("test")
}

pub fn is_bad_message(message: &str) -> bool {
    message.chars().count() < MIN_MESSAGE_LEN
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub additions: u64,
    pub deletions: u64,
}

impl LineCounts {
    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }

    pub fn is_large(&self) -> bool {
        self.total() > LARGE_COMMIT_LINES
    }
}

/// Counts non-blank changed lines in a unified diff.
///
/// A `+` line is recorded as a deletion and a `-` line as an addition.
/// Patches run from the commit to its parent, so `-` lines are the ones the
/// commit introduced.
pub fn count_patch_lines(patch: &str) -> LineCounts {
    let mut counts = LineCounts::default();
    for line in patch.split('\n') {
        if let Some(rest) = line.strip_prefix('+') {
            if !line.starts_with("+++") && !rest.trim().is_empty() {
                counts.deletions += 1;
            }
        } else if let Some(rest) = line.strip_prefix('-') {
            if !line.starts_with("---") && !rest.trim().is_empty() {
                counts.additions += 1;
            }
        }
    }
    counts
}

/// Line counts over every file of a commit that is neither generated nor binary.
pub fn count_commit_lines(commit: &CommitRecord) -> LineCounts {
    let mut counts = LineCounts::default();
    for file in &commit.files {
        if is_generated(file) {
            continue;
        }
        match &file.patch {
            Some(patch) => {
                let c = count_patch_lines(patch);
                counts.additions += c.additions;
                counts.deletions += c.deletions;
            }
            None => log::debug!("{}: no text diff for {}", short_id(&commit.id), file.path),
        }
    }
    counts
}

pub struct Classifier {
    merge_rule: Box<dyn MergeRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Box::new(MessageHeuristic))
    }
}

impl Classifier {
    pub fn new(merge_rule: Box<dyn MergeRule>) -> Self {
        Self { merge_rule }
    }

    pub fn classify<'a, I, Tz>(&self, commits: I, window: &WeekWindow<Tz>) -> ActivityLedger
    where
        I: IntoIterator<Item = &'a CommitRecord>,
        Tz: TimeZone,
    {
        let mut ledger = ActivityLedger::new();
        for commit in commits {
            self.record(&mut ledger, commit, window);
        }
        ledger
    }

    pub fn record<Tz: TimeZone>(&self, ledger: &mut ActivityLedger, commit: &CommitRecord, window: &WeekWindow<Tz>) {
        if !window.contains(&commit.timestamp) {
            return;
        }

        let date = window.local_date(&commit.timestamp);
        let day = ledger.day_mut(&commit.author_email, date);
        day.commits += 1;

        if self.merge_rule.is_merge(commit) {
            log::debug!("{}: merge, skipping line metrics", short_id(&commit.id));
            return;
        }

        let lines = count_commit_lines(commit);
        let (inserted, deleted) = commit.diff_stat();
        log::debug!(
            "{}: {} files, diff stat +{inserted} -{deleted}, counted {} added {} removed",
            short_id(&commit.id),
            commit.files.len(),
            lines.additions,
            lines.deletions
        );
        day.added += lines.additions;
        day.removed += lines.deletions;

        if lines.is_large() {
            day.large_commits += 1;
        }
        if is_bad_message(&commit.message) {
            day.bad_messages += 1;
        }

        let touched: BTreeSet<&str> = commit.files.iter().map(|f| f.path.as_str()).collect();
        day.files_changed += touched.len() as u64;
        day.test_files_changed += touched.iter().filter(|p| is_test_path(p)).count() as u64;

        if day.added > 0 {
            day.time_per_line = WORKDAY_MINUTES / day.added as f64;
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

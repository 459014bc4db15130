use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

/// One file touched by a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub previous_path: Option<String>,
    /// Unified diff text; `None` when either side is binary or not UTF-8.
    pub patch: Option<String>,
    pub added_lines: u32,
    pub deleted_lines: u32,
}

impl FileChange {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.path.as_str()).chain(self.previous_path.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
    /// Raw message, trailing newline included.
    pub message: String,
    pub parent_ids: Vec<String>,
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    /// Lines inserted and deleted across all files, as `git diff --stat` counts them.
    pub fn diff_stat(&self) -> (u64, u64) {
        self.files.iter().fold((0, 0), |(inserted, deleted), f| {
            (inserted + f.added_lines as u64, deleted + f.deleted_lines as u64)
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub added: u64,
    pub removed: u64,
    pub commits: u64,
    pub large_commits: u64,
    pub bad_messages: u64,
    pub files_changed: u64,
    pub test_files_changed: u64,
    pub time_per_line: f64,
}

/// Author email -> calendar date -> stats for that day.
///
/// Days are created on first access through [`ActivityLedger::day_mut`]; reads
/// never create entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityLedger {
    users: BTreeMap<String, BTreeMap<NaiveDate, DailyStats>>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day_mut(&mut self, author: &str, date: NaiveDate) -> &mut DailyStats {
        self.users
            .entry(author.to_string())
            .or_default()
            .entry(date)
            .or_default()
    }

    pub fn day(&self, author: &str, date: NaiveDate) -> Option<&DailyStats> {
        self.users.get(author).and_then(|days| days.get(&date))
    }

    /// Authors in sorted order, each with its days in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<NaiveDate, DailyStats>)> {
        self.users.iter().map(|(author, days)| (author.as_str(), days))
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn author_count(&self) -> usize {
        self.users.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserWeeklyTotal {
    pub added: u64,
    pub removed: u64,
    pub commits: u64,
    pub large_commits: u64,
    pub bad_messages: u64,
    pub files_changed: u64,
    pub test_files_changed: u64,
    pub time_per_line: f64,
    pub cost_per_line: f64,
}

impl UserWeeklyTotal {
    pub fn add_day(&mut self, day: &DailyStats) {
        self.added += day.added;
        self.removed += day.removed;
        self.commits += day.commits;
        self.large_commits += day.large_commits;
        self.bad_messages += day.bad_messages;
        self.files_changed += day.files_changed;
        self.test_files_changed += day.test_files_changed;
    }
}

/// One CSV line: the day's own figures plus the author's running cost per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub author: String,
    pub date: NaiveDate,
    pub commits: u64,
    pub added: u64,
    pub removed: u64,
    pub files_changed: u64,
    pub test_files_changed: u64,
    pub time_per_line: f64,
    pub cost_per_line: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub author: String,
    pub rows: Vec<ReportRow>,
    pub total: UserWeeklyTotal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
    pub commits: u64,
    pub added: u64,
    pub removed: u64,
    pub large_commits: u64,
    pub bad_messages: u64,
    pub files_changed: u64,
    pub test_files_changed: u64,
}

impl OverallTotals {
    pub fn add_user(&mut self, total: &UserWeeklyTotal) {
        self.commits += total.commits;
        self.added += total.added;
        self.removed += total.removed;
        self.large_commits += total.large_commits;
        self.bad_messages += total.bad_messages;
        self.files_changed += total.files_changed;
        self.test_files_changed += total.test_files_changed;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub version: u32,
    pub week_start: NaiveDate,
    pub total_days: u32,
    pub users: Vec<UserReport>,
    pub overall: OverallTotals,
}

impl WeeklyReport {
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.users.iter().flat_map(|u| u.rows.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryPage {
    #[serde(default)]
    pub values: Vec<RemoteRepository>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}

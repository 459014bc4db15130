use crate::error::{Result, TeamweekError};
use crate::model::{CommitRecord, DateRange, FileChange};
use chrono::DateTime;
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

/// Decoded contents of one side of a change.
enum Side {
    Text(String),
    Unreadable,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Tips of every reference (branches, remotes, tags) that peel to a commit.
    fn ref_tips(&self) -> Result<Vec<ObjectId>> {
        let platform = self
            .repo
            .references()
            .map_err(|e| TeamweekError::GitRepo(format!("Cannot read references: {e}")))?;
        let refs = platform
            .all()
            .map_err(|e| TeamweekError::GitRepo(format!("Cannot iterate references: {e}")))?;

        let mut tips = Vec::new();
        for reference in refs {
            let mut reference = match reference {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Skipping unreadable reference: {e}");
                    continue;
                }
            };
            let name = reference.name().as_bstr().to_string();
            match reference.peel_to_id_in_place() {
                Ok(id) => {
                    let id = id.detach();
                    if self.repo.find_commit(id).is_ok() {
                        tips.push(id);
                    } else {
                        log::debug!("{name} does not point at a commit");
                    }
                }
                Err(e) => log::warn!("Cannot peel {name}: {e}"),
            }
        }

        if tips.is_empty() {
            if let Ok(head) = self.repo.head_id() {
                tips.push(head.detach());
            }
        }
        Ok(tips)
    }

    /// Every commit reachable from any ref whose author time falls in `range`.
    pub fn collect_commits(&self, range: &DateRange) -> Result<Vec<CommitRecord>> {
        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = self.ref_tips()?.into_iter().collect();

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Collecting commits...");

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = match self.repo.find_commit(commit_id) {
                Ok(c) => c,
                Err(e) => {
                    // shallow clones end in missing parents
                    log::warn!("Cannot read commit {commit_id}: {e}");
                    continue;
                }
            };
            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();
            stack.extend(parents.iter().copied());

            let author = match commit.author() {
                Ok(a) => a,
                Err(e) => {
                    log::warn!("{commit_id}: unreadable author, skipping commit: {e}");
                    continue;
                }
            };
            let secs = author.seconds();
            let Some(timestamp) = DateTime::from_timestamp(secs, 0) else {
                log::warn!("{commit_id}: invalid author time {secs}, skipping commit");
                continue;
            };

            if !range.contains(&timestamp) {
                continue;
            }

            let files = self.commit_files(commit_id, parents.first().copied());

            commits.push(CommitRecord {
                id: commit_id.to_string(),
                author_name: author.name.to_string(),
                author_email: author.email.to_string(),
                timestamp,
                message: commit.message_raw_sloppy().to_string(),
                parent_ids: parents.iter().map(|id| id.to_string()).collect(),
                files,
            });

            pb.inc(1);
        }

        pb.finish_and_clear();
        log::info!("Collected {} commits from {}", commits.len(), self.path.display());
        Ok(commits)
    }

    /// Per-file changes of `commit_id`; a failed diff yields no files.
    fn commit_files(&self, commit_id: ObjectId, parent: Option<ObjectId>) -> Vec<FileChange> {
        let diffed = match parent {
            Some(parent_id) => self.diff_against_parent(commit_id, parent_id),
            None => self.diff_against_empty(commit_id),
        };
        diffed.unwrap_or_else(|e| {
            log::warn!("{commit_id}: cannot diff, counting no files: {e}");
            Vec::new()
        })
    }

    fn diff_against_parent(&self, commit_id: ObjectId, parent_id: ObjectId) -> Result<Vec<FileChange>> {
        let parent_tree = match self.repo.find_commit(parent_id).map(|c| c.tree()) {
            Ok(Ok(tree)) => tree,
            _ => {
                log::warn!("{commit_id}: parent {parent_id} unreadable, diffing against empty tree");
                return self.diff_against_empty(commit_id);
            }
        };
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;

        let changes: Vec<ChangeDetached> =
            self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?;
        Ok(self.file_changes(commit_id, changes))
    }

    fn diff_against_empty(&self, commit_id: ObjectId) -> Result<Vec<FileChange>> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let changes: Vec<ChangeDetached> = self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?;
        Ok(self.file_changes(commit_id, changes))
    }

    fn file_changes(&self, commit_id: ObjectId, changes: Vec<ChangeDetached>) -> Vec<FileChange> {
        changes
            .into_iter()
            .filter_map(|change| self.handle_change(commit_id, change))
            .collect()
    }

    fn handle_change(&self, commit_id: ObjectId, change: ChangeDetached) -> Option<FileChange> {
        let (previous_path, path, old, new) = match change {
            ChangeDetached::Addition { id, location, entry_mode, .. } => {
                if entry_mode.is_tree() {
                    return None;
                }
                (None, location.to_string(), Side::Text(String::new()), self.read_side(id))
            }
            ChangeDetached::Deletion { id, location, entry_mode, .. } => {
                if entry_mode.is_tree() {
                    return None;
                }
                (None, location.to_string(), self.read_side(id), Side::Text(String::new()))
            }
            ChangeDetached::Modification { previous_id, id, location, entry_mode, .. } => {
                if entry_mode.is_tree() {
                    return None;
                }
                (None, location.to_string(), self.read_side(previous_id), self.read_side(id))
            }
            ChangeDetached::Rewrite { source_id, id, source_location, location, entry_mode, copy, .. } => {
                if entry_mode.is_tree() {
                    return None;
                }
                let old = if copy { Side::Text(String::new()) } else { self.read_side(source_id) };
                (Some(source_location.to_string()), location.to_string(), old, self.read_side(id))
            }
        };

        let (patch, added_lines, deleted_lines) = match (old, new) {
            (Side::Text(old), Side::Text(new)) => {
                // commit -> parent, so lines the commit adds are `-`
                let (patch, removed, added) = unified_patch(&new, &old);
                (Some(patch), added, removed)
            }
            _ => {
                log::warn!("{commit_id}: skipping line count for binary or non-UTF-8 file {path}");
                (None, 0, 0)
            }
        };

        Some(FileChange { path, previous_path, patch, added_lines, deleted_lines })
    }

    fn read_side(&self, id: ObjectId) -> Side {
        let Ok(obj) = self.repo.find_object(id) else {
            return Side::Unreadable;
        };
        if is_binary(obj.data.as_slice()) {
            return Side::Unreadable;
        }
        match std::str::from_utf8(obj.data.as_slice()) {
            Ok(text) => Side::Text(text.to_string()),
            Err(_) => Side::Unreadable,
        }
    }
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8192).any(|&b| b == 0)
}

/// Hunk text (no file header) turning `from` into `to`, plus its inserted and
/// deleted line counts.
pub fn unified_patch(from: &str, to: &str) -> (String, u32, u32) {
    let diff = TextDiff::from_lines(from, to);
    let mut added = 0u32;
    let mut deleted = 0u32;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    let patch = diff.unified_diff().context_radius(3).to_string();
    (patch, added, deleted)
}

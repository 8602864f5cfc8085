// src/history.rs

//! Reads commit records out of a local git repository.

use crate::error::{Error, Result};
use crate::model::{CommitRecord, ContributorRecord};
use crate::pool::{self, Processed};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use git2::{Oid, Repository, Sort};
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Characters of the commit message kept on each record
const MESSAGE_LIMIT: usize = 100;

/// Inclusive bounds on commit time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateFilter {
    /// Build a filter from `YYYY-MM-DD` days: `since` starts at midnight UTC, `until` runs to 23:59:59 UTC.
    pub fn from_days(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        let since = since.map(parse_day).transpose()?;
        let until = until.map(parse_day).transpose()?;
        Ok(Self {
            since: since.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|t| t.and_utc()),
            until: until.and_then(|d| d.and_hms_opt(23, 59, 59)).map(|t| t.and_utc()),
        })
    }

    pub fn contains(&self, seconds: i64) -> bool {
        self.since.map_or(true, |s| seconds >= s.timestamp()) && self.until.map_or(true, |u| seconds <= u.timestamp())
    }
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| Error::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// `owner/repo` from a remote URL such as `https://github.com/apache/kafka.git` or `git@host:owner/repo`
fn name_from_url(url: &str) -> Option<String> {
    let url = url.trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);
    let parts: Vec<&str> = url.split(['/', '\\', ':']).filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [.., owner, repo] => Some(format!("{owner}/{repo}")),
        _ => None,
    }
}

fn convert_time(time: git2::Time) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)?;
    Some(Utc.timestamp_opt(time.seconds(), 0).single()?.with_timezone(&offset))
}

/// Build a [`CommitRecord`] for one commit, diffing against its first parent.
fn extract_commit(repo: &Repository, oid: Oid) -> std::result::Result<CommitRecord, git2::Error> {
    let commit = repo.find_commit(oid)?;
    let tree = commit.tree()?;
    // Only a true root commit is diffed against the empty tree. An unreadable parent fails the record.
    let parent_tree = if commit.parent_count() == 0 {
        None
    } else {
        Some(commit.parent(0)?.tree()?)
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let stats = diff.stats()?;

    let author = commit.author();
    let timestamp =
        convert_time(author.when()).ok_or_else(|| git2::Error::from_str("author time out of range"))?;

    Ok(CommitRecord {
        sha: oid.to_string(),
        author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
        author_email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        timestamp,
        additions: stats.insertions() as u64,
        deletions: stats.deletions() as u64,
        message: String::from_utf8_lossy(commit.message_bytes()).chars().take(MESSAGE_LIMIT).collect(),
    })
}

/// An open repository to pull history from
pub struct HistorySource {
    repo: Repository,
    path: PathBuf,
}

impl HistorySource {
    pub fn open(path: &Path) -> Result<Self> {
        debug!("opening git repository at {}", path.display());
        let repo = Repository::open(path)?;
        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    /// `owner/repo` from the `origin` remote, else the repository directory name
    pub fn repo_name(&self) -> String {
        if let Some(name) = self
            .repo
            .find_remote("origin")
            .ok()
            .and_then(|remote| remote.url().and_then(name_from_url))
        {
            return name;
        }

        let dir = self.repo.workdir().unwrap_or(self.path.as_path());
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn walk_head(&self) -> Result<git2::Revwalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;
        Ok(revwalk)
    }

    /// Commits reachable from HEAD whose commit time passes `filter`, newest first
    pub fn commit_ids(&self, filter: &DateFilter) -> Result<Vec<Oid>> {
        let mut ids = Vec::new();
        for oid in self.walk_head()? {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            if filter.contains(commit.time().seconds()) {
                ids.push(oid);
            }
        }
        Ok(ids)
    }

    /// Extract a [`CommitRecord`] for every selected commit on `workers` threads, keeping walk order.
    /// Commits whose stats cannot be computed, including those with an unreadable parent, are skipped.
    pub fn fetch_commits(
        &self,
        filter: &DateFilter,
        workers: usize,
        progress: Option<&ProgressBar>,
    ) -> Result<Processed<CommitRecord>> {
        let ids = self.commit_ids(filter)?;
        info!(commits = ids.len(), "selected commits for analysis");
        if let Some(bar) = progress {
            bar.set_length(ids.len() as u64);
        }

        // git2 handles are not Sync; a handle is opened per rayon work split and reused within it
        let git_dir = self.repo.path().to_path_buf();
        pool::process_with(
            ids,
            workers,
            progress,
            || Repository::open(&git_dir).ok(),
            |repo, oid| {
                let repo = repo
                    .as_ref()
                    .ok_or_else(|| git2::Error::from_str("failed to open repository in worker"))?;
                extract_commit(repo, oid)
            },
        )
    }

    /// Every distinct author email reachable from HEAD, most active first
    pub fn fetch_contributors(&self) -> Result<Vec<ContributorRecord>> {
        let mut by_email: HashMap<String, ContributorRecord> = HashMap::new();
        for oid in self.walk_head()? {
            let commit = self.repo.find_commit(oid?)?;
            let author = commit.author();
            let email = String::from_utf8_lossy(author.email_bytes()).into_owned();
            by_email
                .entry(email)
                .or_insert_with_key(|email| ContributorRecord {
                    email: email.clone(),
                    name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
                    commits: 0,
                })
                .commits += 1;
        }

        let mut contributors: Vec<ContributorRecord> = by_email.into_values().collect();
        contributors.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.email.cmp(&b.email)));
        Ok(contributors)
    }
}

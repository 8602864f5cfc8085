// src/model.rs

use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Label for contributors who do not belong to any vendor
pub const COMMUNITY: &str = "community";

/// Label for the synthetic group that rolls up low-ranked categories
pub const OTHERS: &str = "others";

/// A single commit as extracted from history. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    /// Author time, kept in the author's own UTC offset
    pub timestamp: DateTime<FixedOffset>,
    pub additions: u64,
    pub deletions: u64,
    /// First 100 characters of the commit message
    pub message: String,
}

impl CommitRecord {
    /// Identity used for unique-contributor sets: the email, or the display name when there is no email.
    pub fn contributor_id(&self) -> &str {
        if self.author_email.is_empty() {
            &self.author_name
        } else {
            &self.author_email
        }
    }

    /// `YYYY-MM` key of the month this record falls in
    pub fn month_key(&self) -> String {
        self.timestamp.format("%Y-%m").to_string()
    }
}

/// One distinct author email across the whole history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorRecord {
    pub email: String,
    pub name: String,
    pub commits: u64,
}

/// Which figure a ranking or percentage is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Commits,
    Additions,
    Deletions,
    Contributors,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commits => "commits",
            Self::Additions => "additions",
            Self::Deletions => "deletions",
            Self::Contributors => "contributors",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running totals for one category within one aggregation scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMetrics {
    pub name: String,
    pub total_commits: u64,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub unique_contributors: BTreeSet<String>,
    /// `YYYY-MM` -> value
    pub commits_by_month: BTreeMap<String, u64>,
    pub additions_by_month: BTreeMap<String, u64>,
    pub deletions_by_month: BTreeMap<String, u64>,
}

impl CategoryMetrics {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fold one record into the totals and the month buckets.
    pub fn record(&mut self, commit: &CommitRecord) {
        self.total_commits += 1;
        self.total_additions += commit.additions;
        self.total_deletions += commit.deletions;

        let contributor = commit.contributor_id();
        if !contributor.is_empty() {
            self.unique_contributors.insert(contributor.to_string());
        }

        let month = commit.month_key();
        *self.commits_by_month.entry(month.clone()).or_default() += 1;
        *self.additions_by_month.entry(month.clone()).or_default() += commit.additions;
        *self.deletions_by_month.entry(month).or_default() += commit.deletions;
    }

    pub fn contributor_count(&self) -> u64 {
        self.unique_contributors.len() as u64
    }

    pub fn net_changes(&self) -> i64 {
        self.total_additions as i64 - self.total_deletions as i64
    }

    /// Average lines changed per commit
    pub fn avg_commit_size(&self) -> f64 {
        if self.total_commits == 0 {
            return 0.0;
        }
        (self.total_additions + self.total_deletions) as f64 / self.total_commits as f64
    }

    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Commits => self.total_commits,
            Metric::Additions => self.total_additions,
            Metric::Deletions => self.total_deletions,
            Metric::Contributors => self.contributor_count(),
        }
    }

    fn by_month(&self, metric: Metric) -> Option<&BTreeMap<String, u64>> {
        match metric {
            Metric::Commits => Some(&self.commits_by_month),
            Metric::Additions => Some(&self.additions_by_month),
            Metric::Deletions => Some(&self.deletions_by_month),
            Metric::Contributors => None,
        }
    }
}

/// Category name -> metrics for one aggregation scope
pub type CategoryMap = BTreeMap<String, CategoryMetrics>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Smallest range covering every timestamp, or `None` when there are none
    pub fn spanning<I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<FixedOffset>>,
    {
        timestamps.into_iter().fold(None, |range, ts| match range {
            None => Some(Self { start: ts, end: ts }),
            Some(r) => Some(Self {
                start: r.start.min(ts),
                end: r.end.max(ts),
            }),
        })
    }
}

/// Whole-repository analysis
#[derive(Debug, Clone)]
pub struct RepositoryAnalysis {
    pub repo_name: String,
    pub total_commits: u64,
    pub total_contributors: u64,
    /// `None` when no commits were analyzed
    pub date_range: Option<DateRange>,
    pub vendor_metrics: CategoryMap,
}

impl RepositoryAnalysis {
    /// Share of the whole repository held by `category`, in percent.
    pub fn vendor_percentage(&self, category: &str, metric: Metric) -> f64 {
        let Some(vendor) = self.vendor_metrics.get(category) else {
            return 0.0;
        };

        let total = match metric {
            Metric::Commits => self.total_commits,
            Metric::Additions => self.vendor_metrics.values().map(|m| m.total_additions).sum(),
            Metric::Contributors => self.total_contributors,
            Metric::Deletions => return 0.0,
        };
        percentage(vendor.value(metric), total)
    }

    /// Category names ordered by `metric`, ties by name
    pub fn sorted_categories(&self, metric: Metric, descending: bool) -> Vec<String> {
        let mut names: Vec<&CategoryMetrics> = self.vendor_metrics.values().collect();
        names.sort_by(|a, b| {
            let ord = a.value(metric).cmp(&b.value(metric));
            let ord = if descending { ord.reverse() } else { ord };
            ord.then_with(|| a.name.cmp(&b.name))
        });
        names.into_iter().map(|m| m.name.clone()).collect()
    }

    /// `month -> category -> value` for a per-month metric. Empty for contributors.
    pub fn timeline_data(&self, metric: Metric) -> BTreeMap<String, BTreeMap<String, u64>> {
        let mut timeline: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for (name, metrics) in &self.vendor_metrics {
            let Some(by_month) = metrics.by_month(metric) else {
                continue;
            };
            for (month, &value) in by_month {
                timeline.entry(month.clone()).or_default().insert(name.clone(), value);
            }
        }
        timeline
    }
}

/// `value / total` in percent, 0 when `total` is 0
pub fn percentage(value: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    value as f64 / total as f64 * 100.0
}

/// Formats an integer with `,` thousands separators.
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

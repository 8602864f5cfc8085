// src/analyzer.rs

use crate::classifier::{Classifier, Identity};
use crate::model::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Folds classified commit records into per-category totals.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    classifier: &'a Classifier,
}

impl<'a> Analyzer<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &'a Classifier {
        self.classifier
    }

    /// Category of a single record. Records carry no organization or username, so only the email is used.
    pub fn categorize(&self, commit: &CommitRecord) -> String {
        self.classifier.classify_identity(&Identity {
            email: &commit.author_email,
            ..Identity::default()
        })
    }

    /// Aggregate `commits` into one [`CategoryMetrics`] per category.
    ///
    /// Configured categories (and `community`) are present even when nothing lands in them. In auto mode
    /// categories appear only as records are classified into them.
    pub fn aggregate<'r, I>(&self, commits: I) -> CategoryMap
    where
        I: IntoIterator<Item = &'r CommitRecord>,
    {
        let mut metrics: CategoryMap = self
            .classifier
            .known_categories()
            .into_iter()
            .map(|name| (name.to_string(), CategoryMetrics::new(name)))
            .collect();

        for commit in commits {
            let category = self.categorize(commit);
            metrics
                .entry(category)
                .or_insert_with_key(|name| CategoryMetrics::new(name.as_str()))
                .record(commit);
        }

        metrics
    }

    /// Whole-repository analysis of `commits`.
    pub fn analyze(&self, commits: &[CommitRecord], repo_name: &str) -> RepositoryAnalysis {
        let vendor_metrics = self.aggregate(commits);

        let contributors: BTreeSet<&str> = commits
            .iter()
            .map(CommitRecord::contributor_id)
            .filter(|id| !id.is_empty())
            .collect();

        debug!(
            commits = commits.len(),
            contributors = contributors.len(),
            categories = vendor_metrics.len(),
            "aggregated repository metrics"
        );

        RepositoryAnalysis {
            repo_name: repo_name.to_string(),
            total_commits: commits.len() as u64,
            total_contributors: contributors.len() as u64,
            date_range: DateRange::spanning(commits.iter().map(|c| c.timestamp)),
            vendor_metrics,
        }
    }
}

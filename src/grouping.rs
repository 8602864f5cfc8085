// src/grouping.rs

//! Top-N ranking of categories, with the tail rolled up into a single `others` group.

use crate::model::{CategoryMap, CategoryMetrics, Metric, COMMUNITY, OTHERS};
use crate::timeline::{PeriodBucket, TimelineAnalysis};
use std::collections::{BTreeMap, BTreeSet};

/// A category (or the synthetic `others` roll-up) prepared for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedGroup {
    pub name: String,
    pub total_commits: u64,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub unique_contributors: BTreeSet<String>,
    /// True for the synthetic `others` group
    pub is_grouped: bool,
}

impl RankedGroup {
    fn single(metrics: &CategoryMetrics) -> Self {
        Self {
            name: metrics.name.clone(),
            total_commits: metrics.total_commits,
            total_additions: metrics.total_additions,
            total_deletions: metrics.total_deletions,
            unique_contributors: metrics.unique_contributors.clone(),
            is_grouped: false,
        }
    }

    fn others<'a>(collapsed: impl IntoIterator<Item = &'a CategoryMetrics>) -> Self {
        let mut group = Self {
            name: OTHERS.to_string(),
            is_grouped: true,
            ..Self::default()
        };
        for metrics in collapsed {
            group.total_commits += metrics.total_commits;
            group.total_additions += metrics.total_additions;
            group.total_deletions += metrics.total_deletions;
            group.unique_contributors.extend(metrics.unique_contributors.iter().cloned());
        }
        group
    }

    pub fn contributor_count(&self) -> u64 {
        self.unique_contributors.len() as u64
    }

    pub fn net_changes(&self) -> i64 {
        self.total_additions as i64 - self.total_deletions as i64
    }

    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Commits => self.total_commits,
            Metric::Additions => self.total_additions,
            Metric::Deletions => self.total_deletions,
            Metric::Contributors => self.contributor_count(),
        }
    }
}

/// Rank categories by `by`, keeping at most `top_n` non-community groups.
///
/// `community` always comes first and is never collapsed. When more than `top_n` other categories exist, the
/// best `top_n - 1` are kept and the rest are summed into `others` (contributor sets are unioned). Ties are
/// broken by category name.
pub fn rank(metrics: &CategoryMap, by: Metric, top_n: usize) -> Vec<RankedGroup> {
    rank_where(metrics, by, top_n, |_| true)
}

/// [`rank`] after dropping categories without a single commit, as the reports show them.
pub fn rank_visible(metrics: &CategoryMap, by: Metric, top_n: usize) -> Vec<RankedGroup> {
    rank_where(metrics, by, top_n, |m| m.total_commits > 0)
}

fn rank_where<F>(metrics: &CategoryMap, by: Metric, top_n: usize, keep: F) -> Vec<RankedGroup>
where
    F: Fn(&CategoryMetrics) -> bool,
{
    let mut result = Vec::new();
    if let Some(community) = metrics.get(COMMUNITY).filter(|&m| keep(m)) {
        result.push(RankedGroup::single(community));
    }

    let mut vendors: Vec<&CategoryMetrics> = metrics
        .iter()
        .filter(|&(name, m)| name != COMMUNITY && keep(m))
        .map(|(_, m)| m)
        .collect();
    vendors.sort_by(|a, b| b.value(by).cmp(&a.value(by)).then_with(|| a.name.cmp(&b.name)));

    if vendors.len() <= top_n {
        result.extend(vendors.into_iter().map(RankedGroup::single));
        return result;
    }

    let shown = top_n.saturating_sub(1);
    result.extend(vendors[..shown].iter().copied().map(RankedGroup::single));
    result.push(RankedGroup::others(vendors[shown..].iter().copied()));
    result
}

/// Column set for a timeline table: `community` first, then categories by commits summed over every period,
/// with the tail collapsed into `others` once more than `max` columns would be needed.
pub fn timeline_categories(timeline: &TimelineAnalysis, max: usize) -> Vec<String> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    let mut has_community = false;
    for period in &timeline.periods {
        for (name, metrics) in &period.vendor_metrics {
            if name == COMMUNITY {
                has_community = true;
            } else {
                *totals.entry(name.as_str()).or_default() += metrics.total_commits;
            }
        }
    }

    let mut columns = Vec::new();
    if has_community {
        columns.push(COMMUNITY.to_string());
    }

    let mut vendors: Vec<(&str, u64)> = totals.into_iter().filter(|&(_, commits)| commits > 0).collect();
    vendors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let slots = max.saturating_sub(columns.len());
    if vendors.len() <= slots {
        columns.extend(vendors.into_iter().map(|(name, _)| name.to_string()));
    } else {
        columns.extend(vendors.into_iter().take(slots.saturating_sub(1)).map(|(name, _)| name.to_string()));
        columns.push(OTHERS.to_string());
    }
    columns
}

/// Commits in `period` from categories that are neither shown nor `community`
pub fn others_commits(period: &PeriodBucket, shown: &[String]) -> u64 {
    period
        .vendor_metrics
        .iter()
        .filter(|&(name, _)| name != COMMUNITY && !shown.contains(name))
        .map(|(_, m)| m.total_commits)
        .sum()
}

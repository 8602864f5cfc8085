// src/timeline.rs

use crate::analyzer::Analyzer;
use crate::error::Error;
use crate::model::{percentage, CategoryMap, CommitRecord, DateRange, Metric};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Calendar unit a timeline is broken down by
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// `YYYY`
    Year,
    /// `YYYY-Qn`
    Quarter,
    /// `YYYY-MM`
    Month,
    /// `YYYY-Www`, ISO-8601 weeks
    Week,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Year => "Year-over-Year",
            Self::Quarter => "Quarter-over-Quarter",
            Self::Month => "Month-over-Month",
            Self::Week => "Week-over-Week",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "quarter" => Ok(Self::Quarter),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            _ => Err(Error::InvalidGranularity { value: s.to_string() }),
        }
    }
}

/// Key of the period containing `timestamp`, on the calendar of the timestamp's own offset.
pub fn period_key(timestamp: &DateTime<FixedOffset>, granularity: Granularity) -> String {
    let date = timestamp.date_naive();
    match granularity {
        Granularity::Year => format!("{}", date.year()),
        Granularity::Quarter => format!("{}-Q{}", date.year(), date.month().div_ceil(3)),
        Granularity::Month => format!("{}-{:02}", date.year(), date.month()),
        Granularity::Week => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
    }
}

fn utc_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Midnight on the first day of the month after `year`-`month`
fn start_of_next_month(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    utc_midnight(NaiveDate::from_ymd_opt(year, month, 1)?)
}

fn month_window(year: i32, first: u32, last: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = utc_midnight(NaiveDate::from_ymd_opt(year, first, 1)?)?;
    let end = start_of_next_month(year, last)? - Duration::seconds(1);
    Some((start, end))
}

/// First and last second (UTC, inclusive) of the period named by `key`. `None` if the key does not parse.
pub fn period_range(key: &str, granularity: Granularity) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    match granularity {
        Granularity::Year => {
            let year: i32 = key.parse().ok()?;
            let start = utc_midnight(NaiveDate::from_ymd_opt(year, 1, 1)?)?;
            let end = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_opt(23, 59, 59)?.and_utc();
            Some((start, end))
        }
        Granularity::Quarter => {
            let (year, quarter) = key.split_once("-Q")?;
            let year: i32 = year.parse().ok()?;
            let quarter: u32 = quarter.parse().ok()?;
            if !(1..=4).contains(&quarter) {
                return None;
            }
            month_window(year, (quarter - 1) * 3 + 1, quarter * 3)
        }
        Granularity::Month => {
            let (year, month) = key.split_once('-')?;
            let month: u32 = month.parse().ok()?;
            month_window(year.parse().ok()?, month, month)
        }
        Granularity::Week => {
            let (year, week) = key.split_once("-W")?;
            let year: i32 = year.parse().ok()?;
            let week: i64 = week.parse().ok()?;
            if !(1..=53).contains(&week) {
                return None;
            }
            let mut monday = NaiveDate::from_ymd_opt(year, 1, 1)?;
            while monday.weekday() != Weekday::Mon {
                monday = monday.succ_opt()?;
            }
            let start = utc_midnight(monday)? + Duration::days((week - 1) * 7);
            let end = start + Duration::days(7) - Duration::seconds(1);
            Some((start, end))
        }
    }
}

/// One calendar period and the metrics of the records inside it
#[derive(Debug, Clone)]
pub struct PeriodBucket {
    pub period: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub vendor_metrics: CategoryMap,
    pub total_commits: u64,
}

impl PeriodBucket {
    /// Share of this period held by `category`, in percent. Denominators cover this period only.
    pub fn vendor_percentage(&self, category: &str, metric: Metric) -> f64 {
        if self.total_commits == 0 {
            return 0.0;
        }
        let Some(metrics) = self.vendor_metrics.get(category) else {
            return 0.0;
        };

        match metric {
            Metric::Commits => percentage(metrics.total_commits, self.total_commits),
            Metric::Additions => percentage(
                metrics.total_additions,
                self.vendor_metrics.values().map(|m| m.total_additions).sum(),
            ),
            Metric::Contributors => percentage(
                metrics.contributor_count(),
                self.vendor_metrics.values().map(|m| m.contributor_count()).sum(),
            ),
            Metric::Deletions => 0.0,
        }
    }
}

/// Timeline analysis of a repository
#[derive(Debug, Clone)]
pub struct TimelineAnalysis {
    pub repo_name: String,
    pub granularity: Granularity,
    /// Sorted ascending by period key
    pub periods: Vec<PeriodBucket>,
    pub date_range: Option<DateRange>,
}

/// Partition `commits` into calendar periods and aggregate each one on its own.
pub fn bucket_by_period(analyzer: &Analyzer<'_>, commits: &[CommitRecord], granularity: Granularity) -> Vec<PeriodBucket> {
    let mut partitions: BTreeMap<String, Vec<&CommitRecord>> = BTreeMap::new();
    for commit in commits {
        partitions
            .entry(period_key(&commit.timestamp, granularity))
            .or_default()
            .push(commit);
    }

    let periods: Vec<PeriodBucket> = partitions
        .into_iter()
        .map(|(period, records)| {
            // Keys come from period_key, so they always parse
            let (start, end) = period_range(&period, granularity).unwrap_or_default();
            PeriodBucket {
                total_commits: records.len() as u64,
                vendor_metrics: analyzer.aggregate(records),
                period,
                start,
                end,
            }
        })
        .collect();

    debug!(granularity = %granularity, periods = periods.len(), "bucketed commits by period");
    periods
}

pub fn analyze_timeline(
    analyzer: &Analyzer<'_>,
    commits: &[CommitRecord],
    repo_name: &str,
    granularity: Granularity,
) -> TimelineAnalysis {
    TimelineAnalysis {
        repo_name: repo_name.to_string(),
        granularity,
        periods: bucket_by_period(analyzer, commits, granularity),
        date_range: DateRange::spanning(commits.iter().map(|c| c.timestamp)),
    }
}

//! Property tests for the worker pool, aggregation, bucketing, percentages and grouping.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use git_vendors::analyzer::Analyzer;
use git_vendors::classifier::Classifier;
use git_vendors::config::ClassifierConfig;
use git_vendors::grouping::rank;
use git_vendors::model::{CategoryMap, CategoryMetrics, CommitRecord, Metric, COMMUNITY};
use git_vendors::pool;
use git_vendors::timeline::{bucket_by_period, period_range, Granularity};
use proptest::prelude::*;
use std::collections::BTreeSet;

const EMAILS: &[&str] = &[
    "a@acme.com",
    "b@acme.com",
    "c@gmail.com",
    "d@globex.io",
    "e@initech.com",
    "",
    "not-an-email",
];

fn granularity_strategy() -> impl Strategy<Value = Granularity> {
    prop_oneof![
        Just(Granularity::Year),
        Just(Granularity::Quarter),
        Just(Granularity::Month),
        Just(Granularity::Week),
    ]
}

/// Seconds between 2000-01-01 and 2030-01-01
fn seconds_strategy() -> impl Strategy<Value = i64> {
    946_684_800i64..1_893_456_000i64
}

fn record(email: &str, timestamp: DateTime<FixedOffset>, additions: u64, deletions: u64) -> CommitRecord {
    CommitRecord {
        sha: String::new(),
        author_name: format!("name-{email}"),
        author_email: email.to_string(),
        timestamp,
        additions,
        deletions,
        message: String::new(),
    }
}

fn commit_strategy() -> impl Strategy<Value = CommitRecord> {
    (
        prop::sample::select(EMAILS),
        seconds_strategy(),
        -12i32..=14,
        0u64..500,
        0u64..500,
    )
        .prop_map(|(email, secs, offset_hours, adds, dels)| {
            let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
            let timestamp = offset.timestamp_opt(secs, 0).unwrap();
            record(email, timestamp, adds, dels)
        })
}

fn utc_commit_strategy() -> impl Strategy<Value = CommitRecord> {
    (prop::sample::select(EMAILS), seconds_strategy()).prop_map(|(email, secs)| {
        record(email, Utc.timestamp_opt(secs, 0).unwrap().fixed_offset(), 1, 1)
    })
}

fn classifiers() -> [Classifier; 2] {
    [
        Classifier::default(),
        Classifier::new(
            ClassifierConfig::from_yaml(
                "vendors:\n  acme:\n    domains: [acme.com]\n  globex:\n    domains: [globex.io]\n",
            )
            .unwrap(),
        ),
    ]
}

#[test]
fn prop_pool_preserves_order() {
    proptest!(|(input in prop::collection::vec(any::<u32>(), 0..200), workers in 1usize..8)| {
        let out = pool::process(input.clone(), workers, |n| {
            if n % 7 == 0 { Err(format!("{n} rejected")) } else { Ok(n) }
        })
        .unwrap();

        let expected: Vec<u32> = input.iter().copied().filter(|n| n % 7 != 0).collect();
        prop_assert_eq!(out.skipped, input.len() - expected.len());
        prop_assert_eq!(out.items, expected);
    });
}

#[test]
fn prop_fold_is_order_independent() {
    let strategy = prop::collection::vec(commit_strategy(), 0..80)
        .prop_flat_map(|commits| (Just(commits.clone()), Just(commits).prop_shuffle()));

    proptest!(|((commits, shuffled) in strategy)| {
        for classifier in classifiers() {
            let analyzer = Analyzer::new(&classifier);
            prop_assert_eq!(analyzer.aggregate(&commits), analyzer.aggregate(&shuffled));
        }
    });
}

#[test]
fn prop_unique_contributors_never_exceed_commits() {
    proptest!(|(commits in prop::collection::vec(commit_strategy(), 0..80))| {
        for classifier in classifiers() {
            for metrics in Analyzer::new(&classifier).aggregate(&commits).values() {
                prop_assert!(metrics.contributor_count() <= metrics.total_commits);
            }
        }
    });
}

#[test]
fn prop_periods_partition_records() {
    proptest!(|(commits in prop::collection::vec(commit_strategy(), 0..80), granularity in granularity_strategy())| {
        for classifier in classifiers() {
            let periods = bucket_by_period(&Analyzer::new(&classifier), &commits, granularity);

            let total: u64 = periods.iter().map(|p| p.total_commits).sum();
            prop_assert_eq!(total, commits.len() as u64);

            for period in &periods {
                let by_category: u64 = period.vendor_metrics.values().map(|m| m.total_commits).sum();
                prop_assert_eq!(by_category, period.total_commits);
                prop_assert!(period.total_commits > 0);
                prop_assert!(period.start < period.end);
            }
            for pair in periods.windows(2) {
                prop_assert!(pair[0].period < pair[1].period);
            }
        }
    });
}

#[test]
fn prop_calendar_periods_contain_their_utc_records() {
    let granularity = prop_oneof![Just(Granularity::Year), Just(Granularity::Quarter), Just(Granularity::Month)];
    proptest!(|(commit in utc_commit_strategy(), granularity in granularity)| {
        let key = git_vendors::timeline::period_key(&commit.timestamp, granularity);
        let (start, end) = period_range(&key, granularity).unwrap();
        let instant = commit.timestamp.with_timezone(&Utc);
        prop_assert!(start <= instant && instant <= end, "{} not in {} ({} .. {})", instant, key, start, end);
    });
}

#[test]
fn prop_percentages_are_bounded() {
    proptest!(|(commits in prop::collection::vec(commit_strategy(), 0..80), granularity in granularity_strategy())| {
        for classifier in classifiers() {
            let analyzer = Analyzer::new(&classifier);
            let analysis = analyzer.analyze(&commits, "r");
            let periods = bucket_by_period(&analyzer, &commits, granularity);

            for metric in [Metric::Commits, Metric::Additions, Metric::Contributors] {
                for name in analysis.vendor_metrics.keys() {
                    let pct = analysis.vendor_percentage(name, metric);
                    prop_assert!((0.0..=100.0 + 1e-9).contains(&pct));
                }
                for period in &periods {
                    for name in period.vendor_metrics.keys() {
                        let pct = period.vendor_percentage(name, metric);
                        prop_assert!((0.0..=100.0 + 1e-9).contains(&pct));
                    }
                }
            }
        }
    });
}

fn category_map_strategy() -> impl Strategy<Value = CategoryMap> {
    let names = prop::sample::subsequence(vec!["community", "a", "b", "c", "d", "e", "f", "g"], 0..8);
    names.prop_flat_map(|names| {
        let len = names.len();
        (
            Just(names),
            prop::collection::vec((0u64..100, prop::collection::btree_set("[a-f]", 0..4)), len),
        )
            .prop_map(|(names, values)| {
                names
                    .into_iter()
                    .zip(values)
                    .map(|(name, (commits, contributors))| {
                        let mut metrics = CategoryMetrics::new(name);
                        metrics.total_commits = commits;
                        metrics.total_additions = commits * 3;
                        metrics.total_deletions = commits * 2;
                        metrics.unique_contributors = contributors;
                        (name.to_string(), metrics)
                    })
                    .collect()
            })
    })
}

#[test]
fn prop_grouping_respects_top_n_and_conserves_totals() {
    proptest!(|(metrics in category_map_strategy(), top_n in 1usize..6)| {
        let groups = rank(&metrics, Metric::Commits, top_n);

        let vendor_groups = groups.iter().filter(|g| g.name != COMMUNITY).count();
        prop_assert!(vendor_groups <= top_n);
        prop_assert_eq!(groups.len(), metrics.len().min(top_n + usize::from(metrics.contains_key(COMMUNITY))));

        let sum = |f: fn(&CategoryMetrics) -> u64| metrics.values().map(f).sum::<u64>();
        prop_assert_eq!(groups.iter().map(|g| g.total_commits).sum::<u64>(), sum(|m| m.total_commits));
        prop_assert_eq!(groups.iter().map(|g| g.total_additions).sum::<u64>(), sum(|m| m.total_additions));
        prop_assert_eq!(groups.iter().map(|g| g.total_deletions).sum::<u64>(), sum(|m| m.total_deletions));

        if let Some(others) = groups.iter().find(|g| g.is_grouped) {
            let shown: BTreeSet<&str> = groups.iter().filter(|g| !g.is_grouped).map(|g| g.name.as_str()).collect();
            let union: BTreeSet<String> = metrics
                .iter()
                .filter(|(name, _)| !shown.contains(name.as_str()))
                .flat_map(|(_, m)| m.unique_contributors.iter().cloned())
                .collect();
            prop_assert_eq!(&others.unique_contributors, &union);
        }

        if metrics.contains_key(COMMUNITY) {
            prop_assert_eq!(groups[0].name.as_str(), COMMUNITY);
        }
    });
}

#[test]
fn prop_classification_is_deterministic() {
    proptest!(|(email in "[a-z]{0,6}(@[a-zA-Z.]{0,10})?", org in "[a-zA-Z ]{0,12}", user in "[a-z]{0,6}")| {
        for classifier in classifiers() {
            let first = classifier.classify(&email, &org, &user);
            prop_assert_eq!(classifier.classify(&email, &org, &user), first);
        }
    });
}

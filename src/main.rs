// src/main.rs

use clap::Parser;
use git_vendors::analyzer::Analyzer;
use git_vendors::classifier::Classifier;
use git_vendors::cli::Args;
use git_vendors::history::HistorySource;
use git_vendors::model::format_number;
use git_vendors::renderer::{self, Painter};
use git_vendors::{timeline, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let painter = Painter::new(!args.no_color && std::io::stdout().is_terminal());

    // Config and date errors abort here, before the repository is opened or anything is printed
    let settings = args.settings()?;
    if settings.config.is_empty() {
        info!("no vendor config, classifying by email domain");
        println!("No vendor config - using automatic domain classification");
        println!("  Personal emails (gmail, yahoo, etc.) -> 'community'");
        println!("  Corporate emails -> '@domain' (e.g. '@confluent.io')");
    } else {
        println!("Loaded vendor config: {}", settings.config.vendor_names().join(", "));
    }
    let classifier = Classifier::new(settings.config);

    let source = HistorySource::open(&args.repo)?;
    let repo_name = source.repo_name();
    println!("Repository: {repo_name}");
    println!();

    let start_time = Instant::now();
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{bar:40}] {pos}/{len}") {
        bar.set_style(style);
    }
    bar.set_message("Analyzing git history");
    bar.enable_steady_tick(Duration::from_millis(100));
    let fetched = source.fetch_commits(&settings.filter, settings.workers, Some(&bar));
    bar.finish_and_clear();
    let fetched = fetched?;
    let commits = fetched.items;

    let elapsed = start_time.elapsed();
    println!(
        "Processed {} commits in {:.2?} ({:.0} commits/sec)",
        format_number(commits.len() as i64),
        elapsed,
        commits.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    );
    if fetched.skipped > 0 {
        println!("Skipped {} commits whose stats could not be read", format_number(fetched.skipped as i64));
    }
    println!();

    if commits.is_empty() {
        println!("No commits found in the specified date range");
        return Ok(());
    }

    let contributors = source.fetch_contributors()?;
    println!("Found {} unique contributors", format_number(contributors.len() as i64));
    println!();

    let analyzer = Analyzer::new(&classifier);
    let mut report = String::new();
    match settings.breakdown {
        Some(granularity) => {
            let timeline = timeline::analyze_timeline(&analyzer, &commits, &repo_name, granularity);
            renderer::write_timeline_report(&mut report, &timeline, painter)?;
        }
        None => {
            let analysis = analyzer.analyze(&commits, &repo_name);
            renderer::write_repository_report(&mut report, &analysis, settings.top, painter)?;
        }
    }
    println!("{report}");

    Ok(())
}

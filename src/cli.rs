// src/cli.rs

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::history::DateFilter;
use crate::pool;
use crate::timeline::Granularity;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to analyze
    pub repo: PathBuf,

    /// Vendor configuration YAML; without it contributors are grouped by email domain
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only analyze commits since this day (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub since: Option<String>,

    /// Only analyze commits until this day (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub until: Option<String>,

    /// Number of threads extracting commit stats; 0 or less uses the default of 4
    #[arg(short, long, default_value_t = 8, allow_negative_numbers = true)]
    pub workers: i64,

    /// Break the analysis down by calendar period
    #[arg(short, long, value_enum)]
    pub breakdown: Option<Granularity>,

    /// Vendors listed individually before the rest are grouped as "others"
    #[arg(short, long, default_value_t = 5, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub top: usize,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Run settings checked up front, so bad input fails before the repository is opened
#[derive(Debug)]
pub struct Settings {
    pub config: ClassifierConfig,
    pub filter: DateFilter,
    pub workers: usize,
    pub breakdown: Option<Granularity>,
    pub top: usize,
}

impl Args {
    /// Load the vendor config and parse the date filter.
    pub fn settings(&self) -> Result<Settings> {
        let config = match &self.config {
            Some(path) => ClassifierConfig::load(path)?,
            None => ClassifierConfig::default(),
        };
        let filter = DateFilter::from_days(self.since.as_deref(), self.until.as_deref())?;

        Ok(Settings {
            config,
            filter,
            workers: pool::worker_count(self.workers),
            breakdown: self.breakdown,
            top: self.top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["git-vendors", "/tmp/repo"]).unwrap();
        assert_eq!(args.repo, PathBuf::from("/tmp/repo"));
        assert_eq!(args.workers, 8);
        assert_eq!(args.top, 5);
        assert!(args.breakdown.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn all_flags() {
        let args = Args::try_parse_from([
            "git-vendors",
            "repo",
            "-c",
            "vendors.yaml",
            "--since",
            "2024-01-01",
            "--until",
            "2024-12-31",
            "-w",
            "-1",
            "-b",
            "quarter",
            "-t",
            "3",
            "-v",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("vendors.yaml")));
        assert_eq!(args.since.as_deref(), Some("2024-01-01"));
        assert_eq!(args.workers, -1);
        assert_eq!(args.breakdown, Some(Granularity::Quarter));
        assert_eq!(args.top, 3);
        assert!(args.verbose && args.no_color);
    }

    #[test]
    fn rejects_unknown_breakdown() {
        assert!(Args::try_parse_from(["git-vendors", "repo", "--breakdown", "fortnight"]).is_err());
    }

    #[test]
    fn rejects_zero_top() {
        assert!(Args::try_parse_from(["git-vendors", "repo", "--top", "0"]).is_err());
        assert_eq!(Args::try_parse_from(["git-vendors", "repo", "-t", "1"]).unwrap().top, 1);
    }

    #[test]
    fn settings_without_config_use_auto_mode() {
        let args = Args::try_parse_from(["git-vendors", "missing-repo", "-w", "0", "--since", "2024-01-01"]).unwrap();
        let settings = args.settings().unwrap();
        assert!(settings.config.is_empty());
        assert!(settings.filter.since.is_some());
        assert_eq!(settings.workers, pool::DEFAULT_WORKERS);
        assert_eq!(settings.top, 5);
    }

    #[test]
    fn settings_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"vendors:\n  acme:\n    domains: [acme.com]\n").unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::try_parse_from(["git-vendors", "repo", "-c", path]).unwrap();
        assert_eq!(args.settings().unwrap().config.vendor_names(), vec!["acme"]);
    }

    #[test]
    fn bad_config_fails_settings() {
        let args = Args::try_parse_from(["git-vendors", "repo", "-c", "/nonexistent/vendors.yaml"]).unwrap();
        assert!(matches!(args.settings().unwrap_err(), Error::ConfigRead { .. }));
    }

    #[test]
    fn bad_date_fails_settings() {
        let args = Args::try_parse_from(["git-vendors", "repo", "--until", "yesterday"]).unwrap();
        assert!(matches!(args.settings().unwrap_err(), Error::InvalidDate { .. }));
    }
}

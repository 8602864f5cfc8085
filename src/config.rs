// src/config.rs

use crate::error::{Error, Result};
use crate::model::{COMMUNITY, OTHERS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Rules that identify one vendor's contributors
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorRules {
    /// Email domains, matched exactly and case-insensitively
    #[serde(default)]
    pub domains: Vec<String>,

    /// Fragments of a free-form organization string, matched as case-insensitive substrings
    #[serde(default, alias = "organizations")]
    pub github_companies: Vec<String>,

    /// Explicit usernames, matched exactly and case-insensitively
    #[serde(default)]
    pub usernames: Vec<String>,
}

impl VendorRules {
    fn normalized(self) -> Self {
        fn clean(values: Vec<String>) -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        }

        Self {
            domains: clean(self.domains),
            github_companies: clean(self.github_companies),
            usernames: clean(self.usernames),
        }
    }
}

/// Category name -> matching rules. Read-only once loaded.
///
/// An empty configuration switches classification to auto-classify-by-domain mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub vendors: BTreeMap<String, VendorRules>,
}

impl ClassifierConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        let config = config.validated()?;
        info!(vendors = ?config.vendor_names(), "loaded vendor config from {}", path.display());
        Ok(config)
    }

    /// Parse a YAML document without touching the filesystem.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| Error::ConfigParse {
            path: "<inline>".into(),
            source,
        })?;
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        let mut vendors = BTreeMap::new();
        for (name, rules) in self.vendors {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidConfig {
                    message: "vendor name must not be empty".to_string(),
                });
            }
            if trimmed == COMMUNITY || trimmed == OTHERS {
                return Err(Error::InvalidConfig {
                    message: format!("vendor name {trimmed:?} is reserved"),
                });
            }
            if vendors.insert(trimmed.to_string(), rules.normalized()).is_some() {
                return Err(Error::InvalidConfig {
                    message: format!("vendor {trimmed:?} is defined more than once"),
                });
            }
        }
        Ok(Self { vendors })
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    pub fn vendor_names(&self) -> Vec<&str> {
        self.vendors.keys().map(String::as_str).collect()
    }

    /// Every category known before any record is seen: the vendors plus `community`.
    pub fn all_categories(&self) -> Vec<&str> {
        let mut categories = self.vendor_names();
        categories.push(COMMUNITY);
        categories
    }
}

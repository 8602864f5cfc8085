// src/classifier.rs

//! Maps a contributor identity to a category.
//!
//! With vendors configured, a fixed cascade of resolvers runs in priority order and the first match wins:
//! username, then email domain, then organization string, then `community`. With no vendors configured,
//! every identity is classified by its email domain alone.

use crate::config::ClassifierConfig;
use crate::model::COMMUNITY;

/// Returned by [`auto_classify`] for an empty email
pub const UNKNOWN: &str = "unknown";

/// Returned by [`auto_classify`] for an email without exactly one `@`
pub const INVALID_EMAIL: &str = "invalid-email";

/// Webmail providers whose users are counted as community
const PERSONAL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "protonmail.com",
    "icloud.com",
    "mail.com",
    "aol.com",
    "yandex.com",
    "qq.com",
    "163.com",
    "126.com",
    "sina.com",
    "live.com",
    "msn.com",
    "me.com",
    "mac.com",
    "googlemail.com",
    "yahoo.co.uk",
    "yahoo.co.jp",
    "fastmail.com",
    "zoho.com",
];

/// Lower-cased domain of an email with exactly one `@`.
pub fn email_domain(email: &str) -> Option<String> {
    let mut parts = email.split('@');
    let (_, domain) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(domain.to_lowercase())
}

/// Classify by email domain alone: personal webmail is `community`, anything else is `@domain`.
pub fn auto_classify(email: &str) -> String {
    if email.is_empty() {
        return UNKNOWN.to_string();
    }
    let Some(domain) = email_domain(email) else {
        return INVALID_EMAIL.to_string();
    };

    if PERSONAL_DOMAINS.contains(&domain.as_str()) {
        COMMUNITY.to_string()
    } else {
        format!("@{domain}")
    }
}

/// Everything known about a contributor at classification time
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity<'a> {
    pub email: &'a str,
    pub organization: &'a str,
    pub username: &'a str,
}

type Resolver = for<'c> fn(&'c ClassifierConfig, &Identity<'_>) -> Option<&'c str>;

/// Resolvers in priority order
const CASCADE: [Resolver; 3] = [by_username, by_email_domain, by_organization];

fn by_username<'c>(config: &'c ClassifierConfig, identity: &Identity<'_>) -> Option<&'c str> {
    let username = identity.username.to_lowercase();
    if username.is_empty() {
        return None;
    }
    config
        .vendors
        .iter()
        .find(|(_, rules)| rules.usernames.iter().any(|u| u.to_lowercase() == username))
        .map(|(name, _)| name.as_str())
}

fn by_email_domain<'c>(config: &'c ClassifierConfig, identity: &Identity<'_>) -> Option<&'c str> {
    let domain = email_domain(identity.email)?;
    if domain.is_empty() {
        return None;
    }
    config
        .vendors
        .iter()
        .find(|(_, rules)| rules.domains.iter().any(|d| d.to_lowercase() == domain))
        .map(|(name, _)| name.as_str())
}

fn by_organization<'c>(config: &'c ClassifierConfig, identity: &Identity<'_>) -> Option<&'c str> {
    let organization = identity.organization.trim().to_lowercase();
    if organization.is_empty() {
        return None;
    }
    config
        .vendors
        .iter()
        .find(|(_, rules)| {
            rules
                .github_companies
                .iter()
                .any(|fragment| organization.contains(&fragment.to_lowercase()))
        })
        .map(|(name, _)| name.as_str())
}

/// Classifies identities against an immutable configuration. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// True when no vendors are configured and every identity goes through [`auto_classify`].
    pub fn is_auto(&self) -> bool {
        self.config.is_empty()
    }

    /// Categories that exist before any record is classified. Empty in auto mode, where categories are discovered.
    pub fn known_categories(&self) -> Vec<&str> {
        if self.is_auto() {
            Vec::new()
        } else {
            self.config.all_categories()
        }
    }

    pub fn classify(&self, email: &str, organization: &str, username: &str) -> String {
        self.classify_identity(&Identity {
            email,
            organization,
            username,
        })
    }

    pub fn classify_identity(&self, identity: &Identity<'_>) -> String {
        if self.is_auto() {
            return auto_classify(identity.email);
        }

        CASCADE
            .iter()
            .find_map(|resolve| resolve(&self.config, identity))
            .unwrap_or(COMMUNITY)
            .to_string()
    }

    /// Vendor owning the email's domain, if any
    pub fn classify_by_email(&self, email: &str) -> Option<&str> {
        by_email_domain(&self.config, &Identity { email, ..Identity::default() })
    }

    /// Vendor whose organization fragment occurs in `organization`, if any
    pub fn classify_by_organization(&self, organization: &str) -> Option<&str> {
        by_organization(&self.config, &Identity { organization, ..Identity::default() })
    }

    /// Vendor listing `username` explicitly, if any
    pub fn classify_by_username(&self, username: &str) -> Option<&str> {
        by_username(&self.config, &Identity { username, ..Identity::default() })
    }
}

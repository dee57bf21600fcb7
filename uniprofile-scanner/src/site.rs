use crate::error::{Result, ScanError};
use crate::username::Username;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use url::Url;

/// Substitution slot in a URL template.
pub const USERNAME_SLOT: &str = "{}";

/// Identifies which probe strategy handles a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyId {
    #[default]
    Generic,
    GithubApi,
    RedditJson,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Generic => "generic",
            StrategyId::GithubApi => "github-api",
            StrategyId::RedditJson => "reddit-json",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub name: String,
    pub url_template: String,
    pub reliable: bool,
    #[serde(default)]
    pub probe_strategy_id: StrategyId,
}

impl SiteDescriptor {
    pub fn new(name: &str, url_template: &str, reliable: bool) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
            reliable,
            probe_strategy_id: StrategyId::Generic,
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyId) -> Self {
        self.probe_strategy_id = strategy;
        self
    }

    /// Profile URL shown to the user for `username`.
    pub fn resolve_url(&self, username: &Username) -> String {
        fill_template(&self.url_template, username)
    }

    /// Checks the template has exactly one slot and yields an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScanError::Registry("site name must not be empty".to_string()));
        }
        validate_template(&self.name, &self.url_template)
    }
}

pub(crate) fn fill_template(template: &str, username: &Username) -> String {
    template.replacen(USERNAME_SLOT, username.as_str(), 1)
}

/// Whether `url` still addresses `username` once parsed.
///
/// Only names made entirely of dots can be lost: as a path segment `.` and `..` are
/// resolved away, so `/users/..` becomes `/`.
pub(crate) fn keeps_username(url: &str, username: &Username) -> bool {
    if !username.as_str().chars().all(|c| c == '.') {
        return true;
    }
    Url::parse(url).is_ok_and(|parsed| parsed.as_str().eq_ignore_ascii_case(url))
}

pub(crate) fn validate_template(site: &str, template: &str) -> Result<()> {
    let invalid = |reason: String| ScanError::InvalidTemplate {
        site: site.to_string(),
        reason,
    };

    let slots = template.matches(USERNAME_SLOT).count();
    if slots != 1 {
        return Err(invalid(format!(
            "expected exactly one '{}' slot, found {}",
            USERNAME_SLOT, slots
        )));
    }

    let sample = template.replacen(USERNAME_SLOT, "sample.user_01", 1);
    let url = Url::parse(&sample).map_err(|e| invalid(format!("'{}': {}", template, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(())
}

/// Read-only, ordered catalog of sites. Order is the output order of every scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRegistry {
    sites: Vec<SiteDescriptor>,
}

impl SiteRegistry {
    /// Build a registry, rejecting empty lists, duplicate names and bad templates.
    pub fn new(sites: Vec<SiteDescriptor>) -> Result<Self> {
        if sites.is_empty() {
            return Err(ScanError::Registry("registry contains no sites".to_string()));
        }

        let mut seen = HashSet::new();
        for site in &sites {
            site.validate()?;
            if !seen.insert(site.name.to_lowercase()) {
                return Err(ScanError::Registry(format!(
                    "duplicate site name '{}'",
                    site.name
                )));
            }
        }

        Ok(Self { sites })
    }

    pub fn builtin() -> Self {
        Self {
            sites: builtin_sites(),
        }
    }

    /// Load a registry from a JSON array of site descriptors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let sites: Vec<SiteDescriptor> = serde_json::from_str(json)?;
        Self::new(sites)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn list(&self) -> &[SiteDescriptor] {
        &self.sites
    }

    pub fn get(&self, index: usize) -> Option<&SiteDescriptor> {
        self.sites.get(index)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_sites() -> Vec<SiteDescriptor> {
    vec![
        SiteDescriptor::new("GitHub", "https://github.com/{}", true)
            .with_strategy(StrategyId::GithubApi),
        SiteDescriptor::new("Reddit", "https://www.reddit.com/user/{}", true)
            .with_strategy(StrategyId::RedditJson),
        SiteDescriptor::new("StackOverflow", "https://stackoverflow.com/users/{}", true),
        SiteDescriptor::new("GitLab", "https://gitlab.com/{}", true),
        SiteDescriptor::new("Medium", "https://medium.com/@{}", true),
        SiteDescriptor::new("Dev.to", "https://dev.to/{}", true),
        SiteDescriptor::new("YouTube", "https://www.youtube.com/@{}", true),
        SiteDescriptor::new("Pinterest", "https://www.pinterest.com/{}/", true),
        SiteDescriptor::new("Vimeo", "https://vimeo.com/{}", true),
        // These block bots or answer 200 for missing profiles
        SiteDescriptor::new("LinkedIn", "https://www.linkedin.com/in/{}", false),
        SiteDescriptor::new("Twitter/X", "https://twitter.com/{}", false),
        SiteDescriptor::new("Instagram", "https://www.instagram.com/{}", false),
        SiteDescriptor::new("Facebook", "https://www.facebook.com/{}", false),
        SiteDescriptor::new("Npm", "https://www.npmjs.com/~{}", true),
    ]
}

use crate::error::Result;
use crate::result::ProbeOutcome;
use crate::site::{SiteDescriptor, StrategyId, fill_template, keeps_username};
use crate::username::Username;
use futures::future::BoxFuture;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Browser-like user agent; the default reqwest agent is blocked outright by several sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const MAX_REDIRECTS: usize = 10;

pub const GITHUB_API_TEMPLATE: &str = "https://api.github.com/users/{}";

pub const REDDIT_JSON_TEMPLATE: &str = "https://www.reddit.com/user/{}/about.json";

/// Build the shared HTTP client used by every probe.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    Ok(client)
}

/// Fetch only the status of `url`.
///
/// Sends HEAD first. Only when HEAD gets no response at all is it retried once as GET;
/// a HEAD answered with 405 or 403 is reported as-is. Bodies are never read.
pub async fn fetch_status(client: &Client, url: &str) -> ProbeOutcome {
    match client.head(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            debug!("HEAD {} -> {}", url, status);
            ProbeOutcome::status(status)
        }
        Err(head_err) => {
            debug!("HEAD {} failed ({}), retrying with GET", url, head_err);
            match client.get(url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    debug!("GET {} -> {}", url, status);
                    ProbeOutcome::status(status)
                }
                Err(get_err) => {
                    debug!("GET {} failed: {}", url, get_err);
                    ProbeOutcome::transport_failure()
                }
            }
        }
    }
}

/// [`fetch_status`] for a URL built from `username`.
///
/// A URL that no longer names the user after parsing is reported as not found without a
/// request, since it would address some other page (`/users/..` is `/`).
async fn fetch_profile_status(client: &Client, url: &str, username: &Username) -> ProbeOutcome {
    if !keeps_username(url, username) {
        debug!("{} does not address '{}', skipping request", url, username);
        return ProbeOutcome::status(404);
    }
    fetch_status(client, url).await
}

/// A procedure for checking whether `username` exists on one site.
///
/// Implementations never fail: every error collapses into
/// [`ProbeOutcome::transport_failure`].
pub trait Probe: Send + Sync {
    fn probe<'a>(
        &'a self,
        site: &'a SiteDescriptor,
        username: &'a Username,
    ) -> BoxFuture<'a, ProbeOutcome>;
}

/// Requests the site's own profile URL.
#[derive(Debug, Clone)]
pub struct GenericProbe {
    client: Client,
}

impl GenericProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Probe for GenericProbe {
    fn probe<'a>(
        &'a self,
        site: &'a SiteDescriptor,
        username: &'a Username,
    ) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            let url = site.resolve_url(username);
            fetch_profile_status(&self.client, &url, username).await
        })
    }
}

/// Requests a structured lookup endpoint instead of the profile page.
#[derive(Debug, Clone)]
pub struct ApiProbe {
    client: Client,
    api_template: String,
}

impl ApiProbe {
    pub fn new(client: Client, api_template: impl Into<String>) -> Self {
        Self {
            client,
            api_template: api_template.into(),
        }
    }

    pub fn github(client: Client) -> Self {
        Self::new(client, GITHUB_API_TEMPLATE)
    }

    pub fn reddit(client: Client) -> Self {
        Self::new(client, REDDIT_JSON_TEMPLATE)
    }

    pub fn api_url(&self, username: &Username) -> String {
        fill_template(&self.api_template, username)
    }
}

impl Probe for ApiProbe {
    fn probe<'a>(
        &'a self,
        _site: &'a SiteDescriptor,
        username: &'a Username,
    ) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            let url = self.api_url(username);
            fetch_profile_status(&self.client, &url, username).await
        })
    }
}

/// Lookup table from strategy id to probe implementation.
///
/// Ids without an entry fall back to the generic probe.
#[derive(Clone)]
pub struct ProbeTable {
    generic: Arc<dyn Probe>,
    strategies: HashMap<StrategyId, Arc<dyn Probe>>,
}

impl ProbeTable {
    pub fn new(generic: Arc<dyn Probe>) -> Self {
        let mut strategies = HashMap::new();
        strategies.insert(StrategyId::Generic, generic.clone());
        Self {
            generic,
            strategies,
        }
    }

    /// Generic probe plus the GitHub API and Reddit JSON strategies.
    pub fn standard(client: Client) -> Self {
        Self::new(Arc::new(GenericProbe::new(client.clone())))
            .with_strategy(StrategyId::GithubApi, Arc::new(ApiProbe::github(client.clone())))
            .with_strategy(StrategyId::RedditJson, Arc::new(ApiProbe::reddit(client)))
    }

    pub fn with_strategy(mut self, id: StrategyId, probe: Arc<dyn Probe>) -> Self {
        if id == StrategyId::Generic {
            self.generic = probe.clone();
        }
        self.strategies.insert(id, probe);
        self
    }

    pub fn contains(&self, id: StrategyId) -> bool {
        self.strategies.contains_key(&id)
    }

    pub fn resolve(&self, id: StrategyId) -> Arc<dyn Probe> {
        match self.strategies.get(&id) {
            Some(probe) => probe.clone(),
            None => {
                warn!("No probe registered for strategy '{}', using generic", id);
                self.generic.clone()
            }
        }
    }
}

impl std::fmt::Debug for ProbeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.strategies.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        f.debug_struct("ProbeTable").field("strategies", &ids).finish()
    }
}

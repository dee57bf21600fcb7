use crate::error::Result;
use crate::probe::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ProbeTable, build_client};
use crate::result::{ProbeOutcome, ScanResult};
use crate::site::SiteRegistry;
use crate::username::Username;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

/// Called with `(completed, total)` each time a probe finishes.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Called with each result as soon as its probe finishes, in completion order.
pub type ResultCallback = Arc<dyn Fn(&ScanResult) + Send + Sync>;

pub const DEFAULT_CONCURRENCY: usize = 4;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Maximum probes in flight.
    pub concurrency: usize,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Minimum gap between two probe starts.
    pub delay: Duration,
    pub user_agent: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub struct Scanner {
    registry: Arc<SiteRegistry>,
    probes: ProbeTable,
    concurrency: usize,
    delay: Duration,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Scanner {
    pub fn new(registry: SiteRegistry) -> Result<Self> {
        Self::with_config(registry, ScannerConfig::default())
    }

    pub fn with_config(registry: SiteRegistry, config: ScannerConfig) -> Result<Self> {
        let client = build_client(&config.user_agent, config.timeout)?;

        Ok(Self {
            registry: Arc::new(registry),
            probes: ProbeTable::standard(client),
            concurrency: config.concurrency.max(1),
            delay: config.delay,
            progress_callback: None,
            result_callback: None,
        })
    }

    pub fn with_probe_table(mut self, probes: ProbeTable) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Validate `raw_username` and probe every registered site.
    ///
    /// Returns one result per site in registry order. Only an invalid username is an
    /// error; it is reported before any request is made.
    pub async fn scan(&self, raw_username: &str) -> Result<Vec<ScanResult>> {
        let username = Username::parse(raw_username)?;
        Ok(self.scan_username(&username).await)
    }

    pub async fn scan_username(&self, username: &Username) -> Vec<ScanResult> {
        let total = self.registry.len();
        info!(
            "Scanning {} sites for '{}' ({} in flight, {:?} pacing)",
            total, username, self.concurrency, self.delay
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let completed = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ScanResult)>();
        let mut handles = Vec::with_capacity(total);

        for (index, site) in self.registry.list().iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            // The semaphore is never closed, so acquisition only waits
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            let probe = self.probes.resolve(site.probe_strategy_id);
            let site = site.clone();
            let username = username.clone();
            let tx = tx.clone();
            let completed = completed.clone();
            let progress_cb = self.progress_callback.clone();
            let result_cb = self.result_callback.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let url = site.resolve_url(&username);
                debug!("Probing {} ({}) via {}", site.name, url, site.probe_strategy_id);

                let outcome = probe.probe(&site, &username).await;
                let result = ScanResult::new(site, url, outcome);
                debug!(
                    "{}: HTTP {} -> {}",
                    result.name(),
                    result.status_code(),
                    result.verdict
                );

                if let Some(ref callback) = result_cb {
                    callback(&result);
                }
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = progress_cb {
                    callback(done, total);
                }

                // The receiver outlives every sender
                let _ = tx.send((index, result));
            });

            handles.push(handle);
        }
        drop(tx);

        let mut slots: Vec<Option<ScanResult>> = (0..total).map(|_| None).collect();
        while let Some((index, result)) = rx.recv().await {
            slots[index] = Some(result);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Probe task failed: {}", e);
            }
        }

        let results: Vec<ScanResult> = slots
            .into_iter()
            .zip(self.registry.list())
            .map(|(slot, site)| {
                slot.unwrap_or_else(|| {
                    warn!("No result recorded for {}, marking as transport error", site.name);
                    let result = ScanResult::new(
                        site.clone(),
                        site.resolve_url(username),
                        ProbeOutcome::transport_failure(),
                    );
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(done, total);
                    }
                    result
                })
            })
            .collect();

        info!(
            "Scan complete. {} of {} sites report a profile for '{}'",
            results.iter().filter(|r| r.is_found()).count(),
            total,
            username
        );
        results
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("sites", &self.registry.len())
            .field("probes", &self.probes)
            .field("concurrency", &self.concurrency)
            .field("delay", &self.delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Probe;
    use crate::result::Verdict;
    use crate::site::SiteDescriptor;
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Answers from a fixed table keyed by site name, after a per-site delay.
    struct ScriptedProbe {
        answers: HashMap<String, (ProbeOutcome, Duration)>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        starts: Mutex<Vec<Instant>>,
    }

    impl ScriptedProbe {
        fn new(answers: &[(&str, ProbeOutcome, u64)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(name, outcome, ms)| {
                        (name.to_string(), (*outcome, Duration::from_millis(*ms)))
                    })
                    .collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                starts: Mutex::new(Vec::new()),
            }
        }
    }

    impl Probe for ScriptedProbe {
        fn probe<'a>(
            &'a self,
            site: &'a SiteDescriptor,
            _username: &'a Username,
        ) -> BoxFuture<'a, ProbeOutcome> {
            Box::pin(async move {
                self.starts.lock().unwrap().push(Instant::now());
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);

                let (outcome, delay) = self.answers[&site.name];
                tokio::time::sleep(delay).await;

                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                outcome
            })
        }
    }

    struct PanickingProbe;

    impl Probe for PanickingProbe {
        fn probe<'a>(
            &'a self,
            site: &'a SiteDescriptor,
            _username: &'a Username,
        ) -> BoxFuture<'a, ProbeOutcome> {
            Box::pin(async move {
                if site.name == "B" {
                    panic!("probe blew up");
                }
                ProbeOutcome::status(200)
            })
        }
    }

    fn registry(names: &[&str]) -> SiteRegistry {
        SiteRegistry::new(
            names
                .iter()
                .map(|name| {
                    SiteDescriptor::new(
                        name,
                        &format!("https://{}.example.com/{{}}", name.to_lowercase()),
                        true,
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn scanner_with(registry: SiteRegistry, probe: Arc<dyn Probe>) -> Scanner {
        Scanner::new(registry)
            .unwrap()
            .with_probe_table(ProbeTable::new(probe))
            .with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_results_follow_registry_order() {
        let probe = Arc::new(ScriptedProbe::new(&[
            ("A", ProbeOutcome::status(200), 150),
            ("B", ProbeOutcome::status(404), 0),
            ("C", ProbeOutcome::status(403), 100),
        ]));

        let completion_order = Arc::new(Mutex::new(Vec::new()));
        let order_clone = completion_order.clone();
        let scanner = scanner_with(registry(&["A", "B", "C"]), probe)
            .with_concurrency(3)
            .with_result_callback(Arc::new(move |result: &ScanResult| {
                order_clone.lock().unwrap().push(result.name().to_string());
            }));

        let results = scanner.scan("octocat").await.unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(
            results.iter().map(|r| r.verdict).collect::<Vec<_>>(),
            vec![Verdict::Confirmed, Verdict::NotFound, Verdict::Blocked]
        );
        assert_eq!(completion_order.lock().unwrap()[0], "B");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let answers: Vec<(&str, ProbeOutcome, u64)> = names
            .iter()
            .map(|n| (*n, ProbeOutcome::status(200), 40))
            .collect();
        let probe = Arc::new(ScriptedProbe::new(&answers));

        let scanner = scanner_with(registry(&names), probe.clone()).with_concurrency(2);
        let results = scanner.scan("octocat").await.unwrap();

        assert_eq!(results.len(), names.len());
        assert!(probe.max_in_flight.load(Ordering::SeqCst) <= 2);
        assert!(probe.max_in_flight.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_dispatch_is_paced() {
        let names = ["A", "B", "C", "D"];
        let answers: Vec<(&str, ProbeOutcome, u64)> = names
            .iter()
            .map(|n| (*n, ProbeOutcome::status(200), 0))
            .collect();
        let probe = Arc::new(ScriptedProbe::new(&answers));

        let scanner = scanner_with(registry(&names), probe.clone())
            .with_concurrency(4)
            .with_delay(Duration::from_millis(50));
        scanner.scan("octocat").await.unwrap();

        let mut starts = probe.starts.lock().unwrap().clone();
        starts.sort();
        assert_eq!(starts.len(), 4);
        for pair in starts.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(40));
        }
    }

    #[tokio::test]
    async fn test_progress_reaches_total() {
        let probe = Arc::new(ScriptedProbe::new(&[
            ("A", ProbeOutcome::status(200), 10),
            ("B", ProbeOutcome::transport_failure(), 0),
            ("C", ProbeOutcome::status(404), 5),
        ]));

        let progress = Arc::new(Mutex::new(Vec::new()));
        let progress_clone = progress.clone();
        let scanner = scanner_with(registry(&["A", "B", "C"]), probe).with_progress_callback(
            Arc::new(move |done, total| {
                progress_clone.lock().unwrap().push((done, total));
            }),
        );

        scanner.scan("octocat").await.unwrap();

        let mut seen = progress.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_panicking_probe_still_yields_result() {
        let scanner = scanner_with(registry(&["A", "B", "C"]), Arc::new(PanickingProbe));

        let results = scanner.scan("octocat").await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].verdict, Verdict::Confirmed);
        assert_eq!(results[1].name(), "B");
        assert_eq!(results[1].verdict, Verdict::TransportError);
        assert_eq!(results[1].url, "https://b.example.com/octocat");
        assert_eq!(results[2].verdict, Verdict::Confirmed);
    }

    #[tokio::test]
    async fn test_invalid_username_never_probes() {
        let probe = Arc::new(ScriptedProbe::new(&[("A", ProbeOutcome::status(200), 0)]));
        let scanner = scanner_with(registry(&["A"]), probe.clone());

        assert!(scanner.scan("bad name!").await.is_err());
        assert!(scanner.scan("").await.is_err());
        assert!(probe.starts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_concurrency_clamped_to_one() {
        let config = ScannerConfig {
            concurrency: 0,
            ..ScannerConfig::default()
        };
        let scanner = Scanner::with_config(SiteRegistry::builtin(), config).unwrap();
        assert_eq!(scanner.concurrency, 1);
        assert_eq!(scanner.with_concurrency(0).concurrency, 1);
    }
}

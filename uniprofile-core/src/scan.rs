use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use uniprofile_scanner::{
    ProbeTable, ResultCallback, ScanResult, Scanner, ScannerConfig, SiteRegistry, Username,
};

/// Options for configuring a scan
pub struct ScanOptions {
    pub username: String,
    pub registry: SiteRegistry,
    pub config: ScannerConfig,
    pub show_progress_bar: bool,
    /// Replaces the standard probe table; used to point probes at test servers.
    pub probes: Option<ProbeTable>,
}

impl ScanOptions {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            registry: SiteRegistry::builtin(),
            config: ScannerConfig::default(),
            show_progress_bar: false,
            probes: None,
        }
    }
}

/// Build the `Checking sites: [=====.....]  42%` bar.
pub fn checking_sites_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("Checking sites: [{bar:32.cyan/white.dim}] {percent:>3}%")
        .map(|style| style.progress_chars("=>."))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Execute a scan with the given options.
///
/// The username is validated first; nothing is sent over the network when it is
/// rejected.
pub async fn execute_scan(
    options: ScanOptions,
    result_callback: Option<ResultCallback>,
) -> uniprofile_scanner::Result<Vec<ScanResult>> {
    let ScanOptions {
        username,
        registry,
        config,
        show_progress_bar,
        probes,
    } = options;

    let username = Username::parse(&username)?;
    let total = registry.len();

    let mut scanner = Scanner::with_config(registry, config)?;
    if let Some(probes) = probes {
        scanner = scanner.with_probe_table(probes);
    }
    if let Some(callback) = result_callback {
        scanner = scanner.with_result_callback(callback);
    }

    let progress_bar = if show_progress_bar {
        let pb = Arc::new(checking_sites_bar(total));
        let pb_clone = pb.clone();
        scanner = scanner.with_progress_callback(Arc::new(move |done: usize, _total: usize| {
            pb_clone.set_position(done as u64);
        }));
        Some(pb)
    } else {
        None
    };

    let results = scanner.scan_username(&username).await;

    if let Some(ref pb) = progress_bar {
        pb.finish();
    }

    Ok(results)
}

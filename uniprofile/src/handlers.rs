use clap::ArgMatches;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use uniprofile_core::browser::open_in_browser;
use uniprofile_core::report::{
    DEFAULT_RESULTS_FILE, ReportFormat, found_results, generate_results_table, render_report,
    save_report,
};
use uniprofile_core::scan::{ScanOptions, execute_scan};
use uniprofile_scanner::probe::DEFAULT_TIMEOUT;
use uniprofile_scanner::scanner::{DEFAULT_CONCURRENCY, DEFAULT_DELAY};
use uniprofile_scanner::{ScanResult, ScannerConfig, SiteRegistry, Username};

/// Install the stderr log subscriber. `-v` enables info, `-vv` and above debug.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    // A subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Everything the `scan` command needs, decoupled from clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub username: Option<String>,
    pub threads: usize,
    pub timeout: Duration,
    pub delay: Duration,
    pub sites_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    pub interactive: bool,
    pub quiet: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            username: None,
            threads: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            sites_file: None,
            output: None,
            format: ReportFormat::Text,
            interactive: true,
            quiet: false,
        }
    }
}

impl ScanSettings {
    pub fn from_matches(args: &ArgMatches) -> Self {
        let defaults = Self::default();
        Self {
            username: args.get_one::<String>("USERNAME").cloned(),
            threads: args
                .get_one::<usize>("threads")
                .copied()
                .unwrap_or(defaults.threads),
            timeout: args
                .get_one::<u64>("timeout")
                .map(|secs| Duration::from_secs(*secs))
                .unwrap_or(defaults.timeout),
            delay: args
                .get_one::<u64>("delay")
                .map(|ms| Duration::from_millis(*ms))
                .unwrap_or(defaults.delay),
            sites_file: args.get_one::<PathBuf>("sites").cloned(),
            output: args.get_one::<PathBuf>("output").cloned(),
            format: args
                .get_one::<String>("format")
                .and_then(|f| ReportFormat::from_str(f))
                .unwrap_or(defaults.format),
            interactive: !args.get_flag("no-interactive"),
            quiet: false,
        }
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            concurrency: self.threads,
            timeout: self.timeout,
            delay: self.delay,
            ..ScannerConfig::default()
        }
    }

    /// Where `save` writes: `--output` if given, otherwise `results.txt`.
    pub fn save_path(&self) -> PathBuf {
        self.output
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_FILE))
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Load the custom registry file if given, otherwise the built-in sites.
pub fn load_registry(sites_file: Option<&PathBuf>) -> Result<SiteRegistry, String> {
    match sites_file {
        Some(path) => {
            let path = expand_path(path);
            SiteRegistry::from_json_file(&path)
                .map_err(|e| format!("Failed to load sites from {}: {}", path.display(), e))
        }
        None => Ok(SiteRegistry::builtin()),
    }
}

/// Ask for a username until a valid one is entered.
///
/// Returns `None` on EOF or an empty line.
pub fn prompt_username<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Option<Username> {
    loop {
        write!(output, "\nEnter username: ").ok()?;
        output.flush().ok()?;

        let mut line = String::new();
        if input.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return None;
        }

        match Username::parse(line) {
            Ok(username) => return Some(username),
            Err(_) => {
                writeln!(
                    output,
                    "{}",
                    "Error: Username contains invalid characters (spaces, special symbols)."
                        .red()
                )
                .ok()?;
                writeln!(output, "{}", "Allowed: A-Z, a-z, 0-9, -, _, .".yellow()).ok()?;
            }
        }
    }
}

/// A command typed at the post-scan prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveCommand {
    /// Open the result at this zero-based index.
    Open(usize),
    OpenAll,
    Save,
    Exit,
    Invalid,
}

/// Parse a prompt line. Ids are 1-based and must be within `total`.
pub fn parse_command(input: &str, total: usize) -> InteractiveCommand {
    match input.trim() {
        "exit" | "quit" | "q" | "Q" => InteractiveCommand::Exit,
        "save" => InteractiveCommand::Save,
        "all" => InteractiveCommand::OpenAll,
        other => match other.parse::<usize>() {
            Ok(id) if id >= 1 && id <= total => InteractiveCommand::Open(id - 1),
            _ => InteractiveCommand::Invalid,
        },
    }
}

pub fn save_results(
    path: &Path,
    format: ReportFormat,
    username: &str,
    results: &[ScanResult],
) -> Result<(), String> {
    let content = render_report(format, username, results).map_err(|e| format!("{:#}", e))?;
    save_report(&content, path).map_err(|e| format!("{:#}", e))
}

/// Run the open/save prompt until `exit` or EOF.
pub fn run_interactive_loop<R, W, F>(
    input: &mut R,
    output: &mut W,
    settings: &ScanSettings,
    username: &str,
    results: &[ScanResult],
    opener: F,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> io::Result<()>,
{
    loop {
        write!(
            output,
            "{} ",
            "Commands: [id] to open, [all] open all, [save] to file, [exit] to quit:".bold()
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match parse_command(&line, results.len()) {
            InteractiveCommand::Exit => return Ok(()),
            InteractiveCommand::Save => {
                let path = settings.save_path();
                match save_results(&path, settings.format, username, results) {
                    Ok(()) => writeln!(
                        output,
                        "{}",
                        format!("\nResults saved to '{}'", path.display()).green()
                    )?,
                    Err(e) => writeln!(output, "{} {}", "Error saving file:".red(), e)?,
                }
            }
            InteractiveCommand::OpenAll => {
                for result in found_results(results) {
                    if let Err(e) = opener(&result.url) {
                        writeln!(output, "{} {}: {}", "✗".red(), result.url, e)?;
                    }
                }
            }
            InteractiveCommand::Open(index) => {
                let url = &results[index].url;
                if let Err(e) = opener(url) {
                    writeln!(output, "{} {}: {}", "✗".red(), url, e)?;
                }
            }
            InteractiveCommand::Invalid => writeln!(output, "{}", "Invalid command.".red())?,
        }
    }
}

pub async fn handle_scan(settings: ScanSettings) {
    let registry = match load_registry(settings.sites_file.as_ref()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let username = match settings.username {
        Some(ref raw) => match Username::parse(raw) {
            Ok(username) => username,
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        None => {
            let stdin = io::stdin();
            match prompt_username(&mut stdin.lock(), &mut io::stdout()) {
                Some(username) => username,
                None => std::process::exit(1),
            }
        }
    };

    println!("\nScanning username \"{}\"...\n", username);

    let mut options = ScanOptions::new(username.as_str());
    options.registry = registry;
    options.config = settings.scanner_config();
    options.show_progress_bar = !settings.quiet;

    let results = match execute_scan(options, None).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{} Scan failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!("\n");
    print!("{}", generate_results_table(username.as_str(), &results));
    println!();

    if let Some(ref output) = settings.output {
        let path = expand_path(output);
        match save_results(&path, settings.format, username.as_str(), &results) {
            Ok(()) => println!(
                "{} Results saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
    }

    if settings.interactive {
        let stdin = io::stdin();
        if let Err(e) = run_interactive_loop(
            &mut stdin.lock(),
            &mut io::stdout(),
            &settings,
            username.as_str(),
            &results,
            open_in_browser,
        ) {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub fn handle_sites(args: &ArgMatches) {
    let registry = match load_registry(args.get_one::<PathBuf>("sites")) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "{}",
        format!(
            "{:<3} {:<14} {:<10} {:<12} {}",
            "ID", "SITE", "RELIABLE", "STRATEGY", "URL TEMPLATE"
        )
        .bold()
    );
    for (idx, site) in registry.list().iter().enumerate() {
        let reliable = if site.reliable {
            "yes".green()
        } else {
            "maybe".yellow()
        };
        println!(
            "{:<3} {:<14} {:<10} {:<12} {}",
            idx + 1,
            site.name,
            reliable,
            site.probe_strategy_id.as_str(),
            site.url_template
        );
    }
}

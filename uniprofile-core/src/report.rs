// Report generation for scan results

use anyhow::Context;
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uniprofile_scanner::{ScanResult, Verdict};

const STATUS_WIDTH: usize = 18;
const SITE_WIDTH: usize = 14;
const URL_WIDTH: usize = 58;
const CODE_WIDTH: usize = 12;

/// Default file written by the interactive `save` command.
pub const DEFAULT_RESULTS_FILE: &str = "results.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub confirmed: usize,
    pub ambiguous: usize,
    pub not_found: usize,
    pub blocked: usize,
    pub transport_error: usize,
}

impl VerdictCounts {
    pub fn from_results(results: &[ScanResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.verdict {
                Verdict::Confirmed => counts.confirmed += 1,
                Verdict::Ambiguous => counts.ambiguous += 1,
                Verdict::NotFound => counts.not_found += 1,
                Verdict::Blocked => counts.blocked += 1,
                Verdict::TransportError => counts.transport_error += 1,
            }
        }
        counts
    }

    pub fn found(&self) -> usize {
        self.confirmed + self.ambiguous
    }
}

/// Results whose verdict counts as a discovered profile, in registry order.
pub fn found_results(results: &[ScanResult]) -> Vec<&ScanResult> {
    results.iter().filter(|r| r.is_found()).collect()
}

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Confirmed => Color::Green,
        Verdict::Ambiguous | Verdict::Blocked => Color::Yellow,
        Verdict::NotFound | Verdict::TransportError => Color::Red,
    }
}

/// Render the `ID STATUS SITE URL CODE` table shown after a scan.
pub fn generate_results_table(username: &str, results: &[ScanResult]) -> String {
    let mut report = String::new();

    let header = format!(
        "{:<3} {:<sw$} {:<tw$} {:<uw$} {:<cw$}",
        "ID",
        "STATUS",
        "SITE",
        "URL",
        "CODE",
        sw = STATUS_WIDTH,
        tw = SITE_WIDTH,
        uw = URL_WIDTH,
        cw = CODE_WIDTH
    );
    report.push_str(&format!("{}\n", header.bold()));
    report.push_str(&"-".repeat(3 + STATUS_WIDTH + SITE_WIDTH + URL_WIDTH + CODE_WIDTH + 4));
    report.push('\n');

    for (idx, result) in results.iter().enumerate() {
        let status = format!("{:<width$}", result.verdict.label(), width = STATUS_WIDTH);
        let code = format!("(HTTP {})", result.status_code());
        report.push_str(&format!(
            "{:<3} {} {:<tw$} {:<uw$} {:>cw$}\n",
            idx + 1,
            status.color(verdict_color(result.verdict)),
            result.name(),
            result.url,
            code,
            tw = SITE_WIDTH,
            uw = URL_WIDTH,
            cw = CODE_WIDTH
        ));
    }

    let found = VerdictCounts::from_results(results).found();
    report.push('\n');
    report.push_str(&format!(
        "{}\n",
        format!("Total {} profiles found for '{}'", found, username)
            .cyan()
            .bold()
    ));

    report
}

/// Plain `name : url` listing of discovered profiles.
pub fn generate_text_report(username: &str, results: &[ScanResult]) -> String {
    let mut report = String::new();
    report.push_str(&format!("UniProfile Results for '{}'\n", username));
    report.push_str("----------------------------\n");
    for result in found_results(results) {
        report.push_str(&format!("{:<15} : {}\n", result.name(), result.url));
    }
    report
}

pub fn generate_json_report(
    username: &str,
    results: &[ScanResult],
) -> Result<String, serde_json::Error> {
    let counts = VerdictCounts::from_results(results);
    let entries: Vec<serde_json::Value> = results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            serde_json::json!({
                "id": idx + 1,
                "site": result.name(),
                "url": result.url,
                "status_code": result.status_code(),
                "verdict": result.verdict,
                "reliable": result.site.reliable,
            })
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "UniProfile",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "username": username,
            "summary": {
                "total_sites": results.len(),
                "found": counts.found(),
                "verdicts": counts
            },
            "results": entries
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(results: &[ScanResult]) -> String {
    let mut report = String::from("id,site,url,status_code,verdict\n");
    for (idx, result) in results.iter().enumerate() {
        report.push_str(&format!(
            "{},{},{},{},{}\n",
            idx + 1,
            csv_field(result.name()),
            csv_field(&result.url),
            result.status_code(),
            result.verdict.label()
        ));
    }
    report
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_report(
    format: ReportFormat,
    username: &str,
    results: &[ScanResult],
) -> anyhow::Result<String> {
    let content = match format {
        ReportFormat::Text => generate_text_report(username, results),
        ReportFormat::Json => generate_json_report(username, results)
            .context("Failed to serialize JSON report")?,
        ReportFormat::Csv => generate_csv_report(results),
    };
    Ok(content)
}

pub fn save_report(content: &str, path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

use crate::site::SiteDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw outcome of a single probe: the final HTTP status, or a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub status_code: u16,
    pub transport_error: bool,
}

impl ProbeOutcome {
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code,
            transport_error: false,
        }
    }

    /// No response was obtained (timeout, DNS failure, refused connection...).
    pub fn transport_failure() -> Self {
        Self {
            status_code: 0,
            transport_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Confirmed,
    Ambiguous,
    NotFound,
    Blocked,
    TransportError,
}

impl Verdict {
    /// Confirmed and ambiguous hits both count as discovered profiles.
    pub fn is_found(&self) -> bool {
        matches!(self, Verdict::Confirmed | Verdict::Ambiguous)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "CONFIRMED",
            Verdict::Ambiguous => "MAYBE",
            Verdict::NotFound => "not found",
            Verdict::Blocked => "blocked",
            Verdict::TransportError => "timeout/error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub site: SiteDescriptor,
    pub url: String,
    pub outcome: ProbeOutcome,
    pub verdict: Verdict,
}

impl ScanResult {
    pub fn new(site: SiteDescriptor, url: String, outcome: ProbeOutcome) -> Self {
        let verdict = crate::classify::classify(outcome, site.reliable);
        Self {
            site,
            url,
            outcome,
            verdict,
        }
    }

    pub fn name(&self) -> &str {
        &self.site.name
    }

    pub fn status_code(&self) -> u16 {
        self.outcome.status_code
    }

    pub fn is_found(&self) -> bool {
        self.verdict.is_found()
    }
}

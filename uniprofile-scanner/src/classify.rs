use crate::result::{ProbeOutcome, Verdict};

/// Map a probe outcome to a verdict.
///
/// Rows are checked in order: 404, success range (2xx/3xx) split on `reliable`,
/// transport failure, then everything else counts as blocked. Many sites answer
/// 200 for missing profiles when scraped anonymously, which is what `reliable`
/// captures.
pub fn classify(outcome: ProbeOutcome, reliable: bool) -> Verdict {
    match outcome.status_code {
        404 => Verdict::NotFound,
        200..=399 if reliable => Verdict::Confirmed,
        200..=399 => Verdict::Ambiguous,
        _ if outcome.transport_error || outcome.status_code == 0 => Verdict::TransportError,
        _ => Verdict::Blocked,
    }
}

pub mod classify;
pub mod error;
pub mod probe;
pub mod result;
pub mod scanner;
pub mod site;
pub mod username;

pub use classify::classify;
pub use error::{Result, ScanError};
pub use probe::{ApiProbe, GenericProbe, Probe, ProbeTable};
pub use result::{ProbeOutcome, ScanResult, Verdict};
pub use scanner::{ProgressCallback, ResultCallback, Scanner, ScannerConfig};
pub use site::{SiteDescriptor, SiteRegistry, StrategyId};
pub use username::Username;

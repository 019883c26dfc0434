//! Results reported back to the caller.

mod analysis;
mod scan;
mod status;

pub use analysis::AnalysisOutcome;
pub use scan::ScanSummary;
pub use status::CacheStatus;

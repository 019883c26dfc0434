//! Normalized issue records.
//!
//! An [`IssueRecord`] is produced by the GitHub fetcher, persisted by the
//! cache and borrowed (never mutated) by the analyzer.

mod label;
mod record;
mod state;

pub use label::Label;
pub use record::IssueRecord;
pub use state::IssueState;

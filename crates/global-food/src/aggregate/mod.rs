//! Search aggregation module.
//!
//! This module turns per-provider responses into one ranked list:
//! - Concurrent dispatch with a per-provider timeout
//! - Record validation
//! - Name normalization for duplicate detection
//! - Merge, attribute voting and ranking

mod aggregator;
mod merge;
mod normalize;
mod validator;

pub use aggregator::Aggregator;
pub use merge::{contributing_providers, merge_records, rank_records};
pub use normalize::name_key;
pub use validator::{RecordValidator, ValidationIssue, ValidationSeverity};

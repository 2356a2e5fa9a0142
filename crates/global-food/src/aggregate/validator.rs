//! Record validation.
//!
//! Checks normalized records before they are merged:
//! - Name present after trimming
//! - Coordinates finite and in range
//! - Rating within 0-5 (cleared, not dropped, when outside)
//! - Ids unique within one provider's batch

use std::collections::HashSet;

use log::{debug, warn};

use crate::models::{CanonicalRecord, ProviderKind};

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Drop the record.
    Hard,
    /// Keep the record with the offending field cleared.
    Soft,
}

/// A single problem found on a record.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Highest accepted canonical rating.
const MAX_RATING: f64 = 5.0;

/// Validates canonical records coming out of an adapter.
#[derive(Clone, Debug, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check one record, fixing soft issues in place.
    ///
    /// Returns the hard issues; an empty list means the record is kept.
    pub fn validate(&self, record: &mut CanonicalRecord) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.validate_name(record, &mut issues);
        self.validate_coordinates(record, &mut issues);
        self.validate_rating(record, &mut issues);

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Soft) {
            warn!("Record '{}': {}", record.id, issue.message);
        }
        issues.retain(|i| i.severity == ValidationSeverity::Hard);
        issues
    }

    /// Validate a provider's batch, dropping invalid records and repeated ids.
    pub fn validate_batch(
        &self,
        provider: ProviderKind,
        records: Vec<CanonicalRecord>,
    ) -> Vec<CanonicalRecord> {
        let mut seen = HashSet::new();
        let mut valid = Vec::with_capacity(records.len());

        for mut record in records {
            let hard = self.validate(&mut record);
            if !hard.is_empty() {
                let messages: Vec<_> = hard.iter().map(|i| i.message.as_str()).collect();
                debug!(
                    "Dropping record '{}' from '{}': {}",
                    record.id,
                    provider,
                    messages.join("; ")
                );
                continue;
            }
            if !seen.insert(record.id.clone()) {
                debug!("Dropping duplicate id '{}' from '{}'", record.id, provider);
                continue;
            }
            valid.push(record);
        }

        valid
    }

    fn validate_name(&self, record: &CanonicalRecord, issues: &mut Vec<ValidationIssue>) {
        if record.name.trim().is_empty() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: "Blank name".to_string(),
            });
        }
    }

    fn validate_coordinates(&self, record: &CanonicalRecord, issues: &mut Vec<ValidationIssue>) {
        if !record.coordinates.is_valid() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!(
                    "Invalid coordinates: ({}, {})",
                    record.coordinates.lat, record.coordinates.lng
                ),
            });
        }
    }

    fn validate_rating(&self, record: &mut CanonicalRecord, issues: &mut Vec<ValidationIssue>) {
        let Some(rating) = record.rating else {
            return;
        };
        if !rating.is_finite() || rating < 0.0 || rating > MAX_RATING {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: format!("Rating {} out of range, cleared", rating),
            });
            record.rating = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[test]
    fn test_drops_blank_names_and_bad_coordinates() {
        let validator = RecordValidator::new();
        let records = vec![
            record(ProviderKind::Yelp, "a", "Joe's Pizza", 40.73, -73.99, 0),
            record(ProviderKind::Yelp, "b", "   ", 40.73, -73.99, 1),
            record(ProviderKind::Yelp, "c", "Offshore", 95.0, -73.99, 2),
            record(ProviderKind::Yelp, "d", "Nan", f64::NAN, 0.0, 3),
        ];

        let valid = validator.validate_batch(ProviderKind::Yelp, records);
        let ids: Vec<_> = valid.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["yelp:a"]);
    }

    #[test]
    fn test_clears_out_of_range_rating() {
        let validator = RecordValidator::new();
        let mut rec =
            record(ProviderKind::Zomato, "1", "Dosa Hut", 12.9, 77.6, 0).with_rating(Some(7.5));

        assert!(validator.validate(&mut rec).is_empty());
        assert_eq!(rec.rating, None);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let validator = RecordValidator::new();
        let records = vec![
            record(ProviderKind::Factual, "x", "First", 1.0, 1.0, 0),
            record(ProviderKind::Factual, "x", "Second", 1.0, 1.0, 1),
        ];

        let valid = validator.validate_batch(ProviderKind::Factual, records);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].name, "First");
    }
}

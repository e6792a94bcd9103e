//! Split validation.
//!
//! Checks a computed split set against the transaction total. Errors and
//! warnings travel on independent channels: only errors invalidate the set,
//! warnings are informational and must not block submission.

use serde::{Deserialize, Serialize};

use crate::{MoneyCents, split::SplitCalculation};

/// Allowed rounding drift between the share sum and the transaction total.
pub const ROUNDING_TOLERANCE: MoneyCents = MoneyCents::new(1);

/// Outcome of validating a split set. Transient: never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitValidation {
    /// True iff `errors` is empty. Warnings never flip this.
    pub is_valid: bool,
    pub total_shares: MoneyCents,
    pub expected_total: MoneyCents,
    /// `total_shares - expected_total`, in cents.
    pub difference: MoneyCents,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validates `shares` against the expected transaction total.
///
/// - sum drift beyond [`ROUNDING_TOLERANCE`] → error
/// - negative share → error
/// - zero share → warning only
pub fn validate_splits(expected_total: MoneyCents, shares: &[SplitCalculation]) -> SplitValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for share in shares {
        if share.amount.is_negative() {
            errors.push(format!(
                "share for {} is negative ({})",
                share.participant.label(),
                share.amount
            ));
        } else if share.amount.is_zero() {
            warnings.push(format!(
                "share for {} is zero",
                share.participant.label()
            ));
        }
    }

    let total_shares: MoneyCents = shares.iter().map(|s| s.amount).sum();
    let difference = total_shares - expected_total;
    if difference.abs() > ROUNDING_TOLERANCE {
        errors.push(format!(
            "shares sum to {total_shares} but the transaction amount is {expected_total} \
             (difference {difference})"
        ));
    }

    SplitValidation {
        is_valid: errors.is_empty(),
        total_shares,
        expected_total,
        difference,
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Participant;

    fn share(cents: i64) -> SplitCalculation {
        SplitCalculation {
            participant: Participant::Registered {
                user_id: format!("user-{cents}"),
            },
            amount: MoneyCents::new(cents),
            percentage: None,
        }
    }

    #[test]
    fn accepts_exact_sum() {
        let report = validate_splits(MoneyCents::new(10000), &[share(6000), share(4000)]);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.difference, MoneyCents::ZERO);
    }

    #[test]
    fn accepts_one_cent_drift() {
        let report = validate_splits(MoneyCents::new(10000), &[share(5000), share(5001)]);
        assert!(report.is_valid);
        assert_eq!(report.difference.cents(), 1);
    }

    #[test]
    fn rejects_sum_mismatch() {
        let report = validate_splits(MoneyCents::new(10000), &[share(5000), share(4000)]);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.difference.cents(), -1000);
    }

    #[test]
    fn rejects_negative_share() {
        let report = validate_splits(
            MoneyCents::new(10000),
            &[share(6000), share(-1000), share(5000)],
        );
        assert!(!report.is_valid);
        assert!(!report.errors.is_empty());
    }

    #[test]
    fn zero_share_warns_without_invalidating() {
        let report = validate_splits(MoneyCents::new(10000), &[share(10000), share(0)]);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.errors.is_empty());
    }
}

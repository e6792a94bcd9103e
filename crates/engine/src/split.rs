//! Split computation.
//!
//! Pure share math: no store access, no side effects. Given a transaction
//! total and a strategy, produce one [`SplitCalculation`] per participant.
//! Consistency against the total is the validator's job, not the
//! calculator's.

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, Participant, ResultEngine};

/// Strategy used to derive per-participant shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Percentage,
    Custom,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for SplitType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "percentage" => Ok(Self::Percentage),
            "custom" => Ok(Self::Custom),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid split type: {other}"
            ))),
        }
    }
}

/// One computed share. Transient: never persisted as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitCalculation {
    pub participant: Participant,
    pub amount: MoneyCents,
    /// Only set for percentage splits, echoing the requested percentage.
    pub percentage: Option<f64>,
}

/// Splits `total` evenly over the participants.
///
/// Each share is `total / n` in whole cents; the rounding residual is added
/// entirely to the **first** participant, so the shares always sum to `total`
/// exactly. The tie-break is deliberate and stable: callers and tests rely on
/// participant order.
pub fn equal_shares(
    total: MoneyCents,
    participants: Vec<Participant>,
) -> ResultEngine<Vec<SplitCalculation>> {
    let (base, residual) = total.div_even(participants.len()).ok_or_else(|| {
        EngineError::InvalidAmount("an equal split needs at least one participant".to_string())
    })?;

    Ok(participants
        .into_iter()
        .enumerate()
        .map(|(i, participant)| SplitCalculation {
            participant,
            amount: if i == 0 { base + residual } else { base },
            percentage: None,
        })
        .collect())
}

/// Computes one share per `(participant, percentage)` pair.
///
/// Each share is `total * pct / 100` rounded to the nearest cent. The
/// percentages are taken as given and **not** normalized to 100; a mismatched
/// sum surfaces through validation, not here.
pub fn percentage_shares(
    total: MoneyCents,
    participants: Vec<(Participant, f64)>,
) -> ResultEngine<Vec<SplitCalculation>> {
    if participants.is_empty() {
        return Err(EngineError::InvalidAmount(
            "a percentage split needs at least one participant".to_string(),
        ));
    }

    participants
        .into_iter()
        .map(|(participant, pct)| {
            if !pct.is_finite() {
                return Err(EngineError::InvalidAmount(format!(
                    "invalid percentage for {}",
                    participant.label()
                )));
            }
            Ok(SplitCalculation {
                amount: total.percent_of(pct),
                percentage: Some(pct),
                participant,
            })
        })
        .collect()
}

/// Wraps caller-supplied amounts without touching them.
///
/// Custom splits are pure passthrough; the validator decides whether they
/// are acceptable.
pub fn custom_shares(participants: Vec<(Participant, MoneyCents)>) -> Vec<SplitCalculation> {
    participants
        .into_iter()
        .map(|(participant, amount)| SplitCalculation {
            participant,
            amount,
            percentage: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::Registered {
                user_id: format!("user-{i}"),
            })
            .collect()
    }

    #[test]
    fn equal_split_residual_goes_to_first() {
        let shares = equal_shares(MoneyCents::new(10000), people(3)).unwrap();
        let amounts: Vec<i64> = shares.iter().map(|s| s.amount.cents()).collect();
        assert_eq!(amounts, vec![3334, 3333, 3333]);
    }

    #[test]
    fn equal_split_sums_to_total_exactly() {
        for (total, n) in [(10000, 3), (1, 7), (9999, 2), (100, 1), (12345, 6)] {
            let shares = equal_shares(MoneyCents::new(total), people(n)).unwrap();
            let sum: MoneyCents = shares.iter().map(|s| s.amount).sum();
            assert_eq!(sum.cents(), total, "total {total} over {n} participants");
        }
    }

    #[test]
    fn equal_split_rejects_empty() {
        let err = equal_shares(MoneyCents::new(100), people(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn percentage_split_rounds_each_share() {
        let participants = people(3)
            .into_iter()
            .zip([33.3, 33.3, 33.4])
            .collect::<Vec<_>>();
        let shares = percentage_shares(MoneyCents::new(25000), participants).unwrap();
        let amounts: Vec<i64> = shares.iter().map(|s| s.amount.cents()).collect();
        assert_eq!(amounts, vec![8325, 8325, 8350]);

        let sum: i64 = amounts.iter().sum();
        assert!((sum - 25000).abs() <= 1);
        assert_eq!(shares[0].percentage, Some(33.3));
    }

    #[test]
    fn percentage_split_is_not_normalized() {
        // 60 + 60 > 100: the calculator reports what was asked for.
        let participants = people(2).into_iter().zip([60.0, 60.0]).collect::<Vec<_>>();
        let shares = percentage_shares(MoneyCents::new(10000), participants).unwrap();
        let sum: MoneyCents = shares.iter().map(|s| s.amount).sum();
        assert_eq!(sum.cents(), 12000);
    }

    #[test]
    fn percentage_split_rejects_non_finite() {
        let participants = people(1).into_iter().zip([f64::NAN]).collect::<Vec<_>>();
        assert!(percentage_shares(MoneyCents::new(100), participants).is_err());
    }

    #[test]
    fn custom_shares_pass_through() {
        let input = people(2)
            .into_iter()
            .zip([MoneyCents::new(7000), MoneyCents::new(3000)])
            .collect::<Vec<_>>();
        let shares = custom_shares(input);
        assert_eq!(shares[0].amount.cents(), 7000);
        assert_eq!(shares[1].amount.cents(), 3000);
    }
}

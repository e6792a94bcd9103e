//! Submission orchestration.
//!
//! Turns a [`SubmitSplitCmd`] into a transaction plus its split rows. Only
//! the insert itself is atomic; relationship linking (before) and balance
//! refresh (after) are best-effort phases whose per-task results are captured
//! in the outcome rather than raised as errors.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, SubmitSplitCmd, Transaction, TransactionSplit,
    participants::resolve_payer,
    split::{SplitCalculation, SplitType, custom_shares, equal_shares, percentage_shares},
    transaction_splits, transactions,
    util::parse_uuid,
    validation::{SplitValidation, validate_splits},
};

use super::{Engine, with_tx};

/// A participant whose relationship could not be linked. The split row was
/// still created, with no relationship reference.
#[derive(Debug)]
pub struct LinkFailure {
    pub participant: String,
    pub error: EngineError,
}

/// Result of one post-commit balance refresh.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub relationship_id: Uuid,
    pub result: Result<(), EngineError>,
}

/// What a submission produced.
///
/// `link_failures` and failed `refreshes` do not make the submission a
/// failure: the transaction and all its splits exist once this is returned.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub transaction_id: Uuid,
    pub validation: SplitValidation,
    pub link_failures: Vec<LinkFailure>,
    pub refreshes: Vec<RefreshOutcome>,
}

/// What settling a split produced. `settled` is false when the split had
/// already been settled (the call is then a no-op).
#[derive(Debug)]
pub struct SettlementOutcome {
    pub settled: bool,
    pub refresh: Option<RefreshOutcome>,
}

impl Engine {
    /// Creates a split transaction: validates the shares, resolves the payer,
    /// links relationships, and inserts the transaction with all split rows
    /// in one atomic store operation.
    ///
    /// Returns [`EngineError::Validation`] with the full report when the
    /// shares don't add up; relationship problems never fail the submission.
    pub async fn submit_split_transaction(
        &self,
        cmd: SubmitSplitCmd,
        user_id: &str,
    ) -> ResultEngine<SubmissionOutcome> {
        let total = MoneyCents::new(cmd.amount_minor);
        if !total.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            if let Some(group_id) = cmd.group_id {
                self.require_group_read(&db_tx, &group_id.to_string(), user_id)
                    .await?;
            }
            Ok::<_, EngineError>(())
        })?;

        let shares = compute_shares(total, &cmd)?;

        let report = validate_splits(total, &shares);
        if !report.is_valid {
            return Err(EngineError::Validation(report));
        }
        for warning in &report.warnings {
            tracing::debug!("split validation warning: {warning}");
        }

        let payer = resolve_payer(&shares, cmd.paid_by.as_deref(), user_id);

        // Best-effort relationship linking for registered, non-caller
        // participants. A failure here must never block the transaction.
        let mut links: HashMap<String, Uuid> = HashMap::new();
        let mut link_failures = Vec::new();
        for share in &shares {
            let Some(pid) = share.participant.user_id() else {
                continue;
            };
            if pid == user_id || links.contains_key(pid) {
                continue;
            }
            match self.find_or_create_relationship(user_id, pid).await {
                Ok(rel) => {
                    links.insert(pid.to_string(), rel.id);
                }
                Err(error) => {
                    tracing::warn!("relationship linking failed for {pid}: {error}");
                    link_failures.push(LinkFailure {
                        participant: pid.to_string(),
                        error,
                    });
                }
            }
        }

        let mut tx = Transaction::new(
            cmd.group_id,
            user_id.to_string(),
            total,
            cmd.note.clone(),
            cmd.occurred_at,
            cmd.split_type,
        )?;
        tx.split_count = shares.len() as i32;
        tx.has_splits = true;

        let splits: Vec<TransactionSplit> = shares
            .iter()
            .map(|share| {
                let relationship_id = share
                    .participant
                    .user_id()
                    .and_then(|pid| links.get(pid))
                    .copied();
                TransactionSplit::new(
                    tx.id,
                    cmd.group_id,
                    share.participant.clone(),
                    share.amount,
                    share.percentage,
                    cmd.split_type,
                    payer.clone(),
                    relationship_id,
                )
            })
            .collect();

        // The only atomic step: transaction + all split rows, all or nothing.
        with_tx!(self, |db_tx| {
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            for split in &splits {
                transaction_splits::ActiveModel::from(split)
                    .insert(&db_tx)
                    .await?;
            }
            Ok::<_, EngineError>(())
        })?;

        let refreshes = self.refresh_linked_balances(&splits).await;

        Ok(SubmissionOutcome {
            transaction_id: tx.id,
            validation: report,
            link_failures,
            refreshes,
        })
    }

    /// Marks a split as settled, then best-effort refreshes the linked
    /// relationship balance.
    pub async fn settle_split(
        &self,
        split_id: Uuid,
        method: &str,
        notes: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<SettlementOutcome> {
        let method = method.trim();
        if method.is_empty() {
            return Err(EngineError::InvalidAmount(
                "settlement method must not be empty".to_string(),
            ));
        }

        // None = the split was already settled; Some(link) = settled now.
        let settled_now: Option<Option<Uuid>> = with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = transaction_splits::Entity::find_by_id(split_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("split not exists".to_string()))?;

            if model.settled {
                Ok::<_, EngineError>(None)
            } else {
                let relationship_id = model
                    .relationship_id
                    .as_deref()
                    .map(|id| parse_uuid(id, "relationship"))
                    .transpose()?;

                let mut active: transaction_splits::ActiveModel = model.into();
                active.settled = ActiveValue::Set(true);
                active.settled_at = ActiveValue::Set(Some(Utc::now()));
                active.settlement_method = ActiveValue::Set(Some(method.to_string()));
                active.settlement_notes =
                    ActiveValue::Set(notes.map(str::trim).filter(|s| !s.is_empty()).map(String::from));
                active.update(&db_tx).await?;

                Ok(Some(relationship_id))
            }
        })?;

        let Some(relationship_id) = settled_now else {
            tracing::debug!("split {split_id} was already settled");
            return Ok(SettlementOutcome {
                settled: false,
                refresh: None,
            });
        };

        let refresh = match relationship_id {
            Some(rid) => {
                let result = self.refresh_relationship_balance(rid).await.map(|_| ());
                if let Err(err) = &result {
                    tracing::warn!("balance refresh failed for relationship {rid}: {err}");
                }
                Some(RefreshOutcome {
                    relationship_id: rid,
                    result,
                })
            }
            None => None,
        };

        Ok(SettlementOutcome {
            settled: true,
            refresh,
        })
    }

    /// Refreshes each distinct relationship linked by `splits`, one at a
    /// time, capturing every failure instead of propagating it.
    async fn refresh_linked_balances(&self, splits: &[TransactionSplit]) -> Vec<RefreshOutcome> {
        let mut seen = HashSet::new();
        let mut refreshes = Vec::new();
        for split in splits {
            let Some(rid) = split.relationship_id else {
                continue;
            };
            if !seen.insert(rid) {
                continue;
            }
            let result = self.refresh_relationship_balance(rid).await.map(|_| ());
            if let Err(err) = &result {
                tracing::warn!("balance refresh failed for relationship {rid}: {err}");
            }
            refreshes.push(RefreshOutcome {
                relationship_id: rid,
                result,
            });
        }
        refreshes
    }
}

fn compute_shares(total: MoneyCents, cmd: &SubmitSplitCmd) -> ResultEngine<Vec<SplitCalculation>> {
    match cmd.split_type {
        SplitType::Equal => equal_shares(
            total,
            cmd.shares.iter().map(|s| s.participant.clone()).collect(),
        ),
        SplitType::Percentage => {
            let pairs = cmd
                .shares
                .iter()
                .map(|s| {
                    let pct = s.percentage.ok_or_else(|| {
                        EngineError::InvalidAmount(format!(
                            "missing percentage for {}",
                            s.participant.label()
                        ))
                    })?;
                    Ok((s.participant.clone(), pct))
                })
                .collect::<ResultEngine<Vec<_>>>()?;
            percentage_shares(total, pairs)
        }
        SplitType::Custom => {
            let pairs = cmd
                .shares
                .iter()
                .map(|s| {
                    let amount = s.amount_minor.ok_or_else(|| {
                        EngineError::InvalidAmount(format!(
                            "missing amount for {}",
                            s.participant.label()
                        ))
                    })?;
                    Ok((s.participant.clone(), MoneyCents::new(amount)))
                })
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(custom_shares(pairs))
        }
    }
}

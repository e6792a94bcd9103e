//! Expense transactions.
//!
//! A `Transaction` is one recorded expense. When it is split, it owns one
//! [`TransactionSplit`](crate::TransactionSplit) row per participant; the
//! split bookkeeping fields (`split_count`, `split_type`, `has_splits`) are
//! stamped by the submission orchestrator before the atomic insert.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, split::SplitType, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    pub created_by: String,
    pub amount: MoneyCents,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub split_type: SplitType,
    pub split_count: i32,
    pub has_splits: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        group_id: Option<Uuid>,
        created_by: String,
        amount: MoneyCents,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
        split_type: SplitType,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            created_by,
            amount,
            note,
            occurred_at,
            split_type,
            split_count: 0,
            has_splits: false,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: Option<String>,
    pub created_by: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub split_type: String,
    pub split_count: i32,
    pub has_splits: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_splits::Entity")]
    TransactionSplits,
}

impl Related<super::transaction_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            group_id: ActiveValue::Set(tx.group_id.map(|id| id.to_string())),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            note: ActiveValue::Set(tx.note.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            split_type: ActiveValue::Set(tx.split_type.as_str().to_string()),
            split_count: ActiveValue::Set(tx.split_count),
            has_splits: ActiveValue::Set(tx.has_splits),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            group_id: model
                .group_id
                .as_deref()
                .map(|id| parse_uuid(id, "group"))
                .transpose()?,
            created_by: model.created_by,
            amount: MoneyCents::new(model.amount_minor),
            note: model.note,
            occurred_at: model.occurred_at,
            split_type: SplitType::try_from(model.split_type.as_str())?,
            split_count: model.split_count,
            has_splits: model.has_splits,
            created_at: model.created_at,
        })
    }
}

//! Per-participant split rows.
//!
//! One row per participant obligation. The row's own identity is either a
//! registered `user_id` or a guest contact bundle, never both; the payer
//! columns are transaction-level metadata duplicated across every row of the
//! batch and are orthogonal to the row's own identity.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, Participant, ResolvedPayer, split::SplitType, util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionSplit {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub participant: Participant,
    pub group_id: Option<Uuid>,
    pub amount: MoneyCents,
    pub share_percentage: Option<f64>,
    pub split_type: SplitType,
    pub payer: ResolvedPayer,
    pub relationship_id: Option<Uuid>,
    pub settled: bool,
    pub settled_at: Option<DateTime<Utc>>,
    pub settlement_method: Option<String>,
    pub settlement_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionSplit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_id: Uuid,
        group_id: Option<Uuid>,
        participant: Participant,
        amount: MoneyCents,
        share_percentage: Option<f64>,
        split_type: SplitType,
        payer: ResolvedPayer,
        relationship_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            participant,
            group_id,
            amount,
            share_percentage,
            split_type,
            payer,
            relationship_id,
            settled: false,
            settled_at: None,
            settlement_method: None,
            settlement_notes: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub is_guest: bool,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub group_id: Option<String>,
    pub amount_minor: i64,
    pub share_percentage: Option<f64>,
    pub split_type: String,
    pub paid_by: Option<String>,
    pub paid_by_guest_name: Option<String>,
    pub paid_by_guest_email: Option<String>,
    pub paid_by_guest_phone: Option<String>,
    pub relationship_id: Option<String>,
    pub settled: bool,
    pub settled_at: Option<DateTimeUtc>,
    pub settlement_method: Option<String>,
    pub settlement_notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransactionSplit> for ActiveModel {
    fn from(split: &TransactionSplit) -> Self {
        // The sum types guarantee row exclusivity: a guest row has no
        // user_id, a registered row has no guest bundle.
        let (is_guest, user_id, guest_name, guest_email, guest_phone) = match &split.participant {
            Participant::Registered { user_id } => {
                (false, Some(user_id.clone()), None, None, None)
            }
            Participant::Guest {
                name, email, phone, ..
            } => (true, None, Some(name.clone()), email.clone(), phone.clone()),
        };
        let (paid_by, paid_by_guest_name, paid_by_guest_email, paid_by_guest_phone) =
            match &split.payer {
                ResolvedPayer::Registered { user_id } => (Some(user_id.clone()), None, None, None),
                ResolvedPayer::Guest { name, email, phone } => {
                    (None, Some(name.clone()), email.clone(), phone.clone())
                }
            };

        Self {
            id: ActiveValue::Set(split.id.to_string()),
            transaction_id: ActiveValue::Set(split.transaction_id.to_string()),
            is_guest: ActiveValue::Set(is_guest),
            user_id: ActiveValue::Set(user_id),
            guest_name: ActiveValue::Set(guest_name),
            guest_email: ActiveValue::Set(guest_email),
            guest_phone: ActiveValue::Set(guest_phone),
            group_id: ActiveValue::Set(split.group_id.map(|id| id.to_string())),
            amount_minor: ActiveValue::Set(split.amount.cents()),
            share_percentage: ActiveValue::Set(split.share_percentage),
            split_type: ActiveValue::Set(split.split_type.as_str().to_string()),
            paid_by: ActiveValue::Set(paid_by),
            paid_by_guest_name: ActiveValue::Set(paid_by_guest_name),
            paid_by_guest_email: ActiveValue::Set(paid_by_guest_email),
            paid_by_guest_phone: ActiveValue::Set(paid_by_guest_phone),
            relationship_id: ActiveValue::Set(split.relationship_id.map(|id| id.to_string())),
            settled: ActiveValue::Set(split.settled),
            settled_at: ActiveValue::Set(split.settled_at),
            settlement_method: ActiveValue::Set(split.settlement_method.clone()),
            settlement_notes: ActiveValue::Set(split.settlement_notes.clone()),
            created_at: ActiveValue::Set(split.created_at),
        }
    }
}

impl TryFrom<Model> for TransactionSplit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let participant = if model.is_guest {
            Participant::Guest {
                id: None,
                name: model.guest_name.unwrap_or_default(),
                email: model.guest_email,
                phone: model.guest_phone,
            }
        } else {
            let user_id = model.user_id.ok_or_else(|| {
                EngineError::InvalidId("split row has neither account nor guest identity".to_string())
            })?;
            Participant::Registered { user_id }
        };

        let payer = match model.paid_by {
            Some(user_id) => ResolvedPayer::Registered { user_id },
            None => ResolvedPayer::Guest {
                name: model.paid_by_guest_name.ok_or_else(|| {
                    EngineError::InvalidId("split row is missing payer fields".to_string())
                })?,
                email: model.paid_by_guest_email,
                phone: model.paid_by_guest_phone,
            },
        };

        Ok(Self {
            id: parse_uuid(&model.id, "split")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            participant,
            group_id: model
                .group_id
                .as_deref()
                .map(|id| parse_uuid(id, "group"))
                .transpose()?,
            amount: MoneyCents::new(model.amount_minor),
            share_percentage: model.share_percentage,
            split_type: SplitType::try_from(model.split_type.as_str())?,
            payer,
            relationship_id: model
                .relationship_id
                .as_deref()
                .map(|id| parse_uuid(id, "relationship"))
                .transpose()?,
            settled: model.settled,
            settled_at: model.settled_at,
            settlement_method: model.settlement_method,
            settlement_notes: model.settlement_notes,
            created_at: model.created_at,
        })
    }
}

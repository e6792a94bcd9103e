use chrono::Utc;
use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FinancialRelationship, MoneyCents, ResultEngine,
    relationships::{self, ordered_pair},
    transaction_splits,
};

use super::{Engine, with_tx};

impl Engine {
    /// Finds or creates the bilateral relationship between two registered
    /// identities. Both sides must resolve to accounts.
    pub async fn find_or_create_relationship(
        &self,
        x: &str,
        y: &str,
    ) -> ResultEngine<FinancialRelationship> {
        if x == y {
            return Err(EngineError::InvalidAmount(
                "cannot relate an identity to itself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, x).await?;
            self.require_user_exists(&db_tx, y).await?;

            let (user_a, user_b) = ordered_pair(x, y);
            let existing = relationships::Entity::find()
                .filter(relationships::Column::UserA.eq(user_a.clone()))
                .filter(relationships::Column::UserB.eq(user_b.clone()))
                .one(&db_tx)
                .await?;

            match existing {
                Some(model) => FinancialRelationship::try_from(model),
                None => {
                    let rel = FinancialRelationship::new(x, y);
                    relationships::ActiveModel::from(&rel).insert(&db_tx).await?;
                    Ok(rel)
                }
            }
        })
    }

    /// Recomputes a relationship's cached balance from its unsettled split
    /// rows and stores it.
    ///
    /// The balance is derived from source rows, never incremented, so
    /// refreshing twice in a row yields the same value. Rows whose payer is a
    /// guest or a third party contribute nothing to this pair's ledger.
    pub async fn refresh_relationship_balance(
        &self,
        relationship_id: Uuid,
    ) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let model = relationships::Entity::find_by_id(relationship_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("relationship not exists".to_string())
                })?;
            let rel = FinancialRelationship::try_from(model.clone())?;

            let rows: Vec<transaction_splits::Model> = transaction_splits::Entity::find()
                .filter(
                    transaction_splits::Column::RelationshipId.eq(relationship_id.to_string()),
                )
                .filter(transaction_splits::Column::Settled.eq(false))
                .all(&db_tx)
                .await?;

            let mut balance = MoneyCents::ZERO;
            for row in rows {
                let (Some(payer), Some(ower)) = (row.paid_by.as_deref(), row.user_id.as_deref())
                else {
                    continue;
                };
                if let Some(delta) = rel.balance_delta(payer, ower, MoneyCents::new(row.amount_minor))
                {
                    balance += delta;
                }
            }

            let mut active: relationships::ActiveModel = model.into();
            active.balance_minor = ActiveValue::Set(balance.cents());
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;

            Ok(balance)
        })
    }

    /// Lists the relationships the caller is a party to, most recently
    /// touched first.
    pub async fn list_relationships(
        &self,
        user_id: &str,
    ) -> ResultEngine<Vec<FinancialRelationship>> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;

            let models: Vec<relationships::Model> = relationships::Entity::find()
                .filter(
                    Condition::any()
                        .add(relationships::Column::UserA.eq(user_id.to_string()))
                        .add(relationships::Column::UserB.eq(user_id.to_string())),
                )
                .order_by_desc(relationships::Column::UpdatedAt)
                .all(&db_tx)
                .await?;

            models
                .into_iter()
                .map(FinancialRelationship::try_from)
                .collect()
        })
    }
}

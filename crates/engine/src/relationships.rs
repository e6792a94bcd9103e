//! Bilateral financial relationships.
//!
//! A relationship is one ledger row per unordered pair of registered
//! identities. `balance` is a **cache**: it is recomputed from the split rows
//! (never incremented in place), so refreshing it is idempotent.
//!
//! Sign convention: positive `balance` means `user_b` owes `user_a`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRelationship {
    pub id: Uuid,
    /// Lexicographically smaller identity of the pair.
    pub user_a: String,
    /// Lexicographically larger identity of the pair.
    pub user_b: String,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical storage order for a pair of identities.
pub fn ordered_pair(x: &str, y: &str) -> (String, String) {
    if x <= y {
        (x.to_string(), y.to_string())
    } else {
        (y.to_string(), x.to_string())
    }
}

impl FinancialRelationship {
    pub fn new(x: &str, y: &str) -> Self {
        let (user_a, user_b) = ordered_pair(x, y);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_a,
            user_b,
            balance: MoneyCents::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Contribution of one split row to this relationship's balance.
    ///
    /// `payer` paid, `ower` owes `amount`. Returns `None` when the pair does
    /// not match this relationship (e.g. a third party or a guest payer).
    #[must_use]
    pub fn balance_delta(&self, payer: &str, ower: &str, amount: MoneyCents) -> Option<MoneyCents> {
        if payer == self.user_a && ower == self.user_b {
            Some(amount)
        } else if payer == self.user_b && ower == self.user_a {
            Some(-amount)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_relationships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_a: String,
    pub user_b: String,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FinancialRelationship> for ActiveModel {
    fn from(rel: &FinancialRelationship) -> Self {
        Self {
            id: ActiveValue::Set(rel.id.to_string()),
            user_a: ActiveValue::Set(rel.user_a.clone()),
            user_b: ActiveValue::Set(rel.user_b.clone()),
            balance_minor: ActiveValue::Set(rel.balance.cents()),
            created_at: ActiveValue::Set(rel.created_at),
            updated_at: ActiveValue::Set(rel.updated_at),
        }
    }
}

impl TryFrom<Model> for FinancialRelationship {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "relationship")?,
            user_a: model.user_a,
            user_b: model.user_b,
            balance: MoneyCents::new(model.balance_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_order_is_canonical() {
        assert_eq!(
            ordered_pair("bob", "alice"),
            ("alice".to_string(), "bob".to_string())
        );
        let rel = FinancialRelationship::new("bob", "alice");
        assert_eq!(rel.user_a, "alice");
        assert_eq!(rel.user_b, "bob");
    }

    #[test]
    fn balance_delta_signs() {
        let rel = FinancialRelationship::new("alice", "bob");
        let amount = MoneyCents::new(500);
        // alice paid, bob owes: positive (b owes a).
        assert_eq!(rel.balance_delta("alice", "bob", amount), Some(amount));
        // bob paid, alice owes: negative.
        assert_eq!(rel.balance_delta("bob", "alice", amount), Some(-amount));
        // third parties don't touch this ledger.
        assert_eq!(rel.balance_delta("carol", "bob", amount), None);
    }
}

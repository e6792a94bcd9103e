use std::collections::HashMap;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    MoneyCents, ResultEngine, group_members, transaction_splits, util::normalize_email,
};

use super::{Engine, with_tx};

/// Net position of one person across a group's unsettled splits.
///
/// Positive `net` means the group owes them, negative means they owe the
/// group. The positions of a group always sum to zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalance {
    /// Registered account id, when the position belongs to one. Guests have
    /// none and are identified by their display name.
    pub user_id: Option<String>,
    pub display_name: String,
    pub net: MoneyCents,
}

/// Aggregation key for one person: registered id, else normalized email,
/// else name. Guests with none of those can't be netted and are skipped.
fn identity_key(user_id: Option<&str>, email: Option<&str>, name: Option<&str>) -> Option<String> {
    if let Some(id) = user_id {
        return Some(format!("user:{id}"));
    }
    if let Some(email) = email {
        return Some(format!("guest:{}", normalize_email(email)));
    }
    name.map(|n| format!("guest:{}", n.trim().to_lowercase()))
}

impl Engine {
    /// Net balance per person over a group's unsettled splits.
    ///
    /// Each split row contributes `-amount` to its ower and `+amount` to its
    /// payer; a payer's own share therefore cancels out. Recomputed from
    /// source rows on every call, read-only.
    pub async fn group_balances(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<GroupBalance>> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            self.require_group_read(&db_tx, group_id, user_id).await?;

            let members: Vec<group_members::Model> = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;
            let rows: Vec<transaction_splits::Model> = transaction_splits::Entity::find()
                .filter(transaction_splits::Column::GroupId.eq(group_id.to_string()))
                .filter(transaction_splits::Column::Settled.eq(false))
                .all(&db_tx)
                .await?;

            let mut net: HashMap<String, MoneyCents> = HashMap::new();
            let mut display: HashMap<String, String> = HashMap::new();

            for row in &rows {
                let amount = MoneyCents::new(row.amount_minor);
                let ower = identity_key(
                    row.user_id.as_deref(),
                    row.guest_email.as_deref(),
                    row.guest_name.as_deref(),
                );
                let payer = identity_key(
                    row.paid_by.as_deref(),
                    row.paid_by_guest_email.as_deref(),
                    row.paid_by_guest_name.as_deref(),
                );

                if let Some(key) = ower {
                    *net.entry(key.clone()).or_default() -= amount;
                    if let Some(name) = row.guest_name.as_deref().or(row.user_id.as_deref()) {
                        display.entry(key).or_insert_with(|| name.to_string());
                    }
                }
                if let Some(key) = payer {
                    *net.entry(key.clone()).or_default() += amount;
                    if let Some(name) = row
                        .paid_by_guest_name
                        .as_deref()
                        .or(row.paid_by.as_deref())
                    {
                        display.entry(key).or_insert_with(|| name.to_string());
                    }
                }
            }

            // Roster display names win over whatever the split rows carried.
            for member in &members {
                let key = identity_key(
                    member.is_registered_user.then_some(member.user_id.as_str()),
                    member.email.as_deref(),
                    Some(member.display_name.as_str()),
                );
                if let Some(key) = key {
                    display.insert(key, member.display_name.clone());
                }
            }

            let mut out: Vec<GroupBalance> = net
                .into_iter()
                .map(|(key, net)| {
                    let display_name = display
                        .get(&key)
                        .cloned()
                        .unwrap_or_else(|| key.clone());
                    GroupBalance {
                        user_id: key.strip_prefix("user:").map(str::to_string),
                        display_name,
                        net,
                    }
                })
                .collect();
            out.sort_by(|a, b| a.display_name.cmp(&b.display_name));

            Ok(out)
        })
    }
}

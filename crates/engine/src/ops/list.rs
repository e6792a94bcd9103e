use std::collections::HashMap;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionSplit, transaction_splits, transactions,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ExpensesCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: String,
}

impl ExpensesCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))
    }
}

impl Engine {
    /// Lists a group's split transactions together with their split rows.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, transaction_id
    /// DESC)`; `cursor` is the opaque token returned by the previous page.
    pub async fn list_group_expenses(
        &self,
        group_id: &str,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<(Transaction, Vec<TransactionSplit>)>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            self.require_group_read(&db_tx, group_id, user_id).await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .filter(transactions::Column::HasSplits.eq(true))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = ExpensesCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }

            let rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let txs: Vec<Transaction> = rows
                .into_iter()
                .take(limit as usize)
                .map(Transaction::try_from)
                .collect::<ResultEngine<_>>()?;

            let tx_ids: Vec<String> = txs.iter().map(|tx| tx.id.to_string()).collect();
            let split_rows: Vec<transaction_splits::Model> = transaction_splits::Entity::find()
                .filter(transaction_splits::Column::TransactionId.is_in(tx_ids))
                .all(&db_tx)
                .await?;

            let mut by_tx: HashMap<Uuid, Vec<TransactionSplit>> = HashMap::new();
            for row in split_rows {
                let split = TransactionSplit::try_from(row)?;
                by_tx.entry(split.transaction_id).or_default().push(split);
            }

            let next_cursor = txs.last().map(|tx| ExpensesCursor {
                occurred_at: tx.occurred_at,
                transaction_id: tx.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            let out: Vec<(Transaction, Vec<TransactionSplit>)> = txs
                .into_iter()
                .map(|tx| {
                    let splits = by_tx.remove(&tx.id).unwrap_or_default();
                    (tx, splits)
                })
                .collect();

            Ok((out, next_cursor))
        })
    }
}

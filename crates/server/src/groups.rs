//! Group API endpoints

use api_types::group::{GroupNew, GroupUpdate, GroupView};
use api_types::balance::GroupBalanceView;
use api_types::split::{ExpenseList, ExpenseView, SplitView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{ServerError, server::ServerState, user};

pub(crate) fn group_view(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        description: group.description,
        owner_id: group.owner_id,
        active: group.active,
        created_at: group.created_at,
    }
}

fn split_view(split: engine::TransactionSplit) -> SplitView {
    let (user_id, guest_name) = match &split.participant {
        engine::Participant::Registered { user_id } => (Some(user_id.clone()), None),
        engine::Participant::Guest { name, .. } => (None, Some(name.clone())),
    };
    let (paid_by, paid_by_guest_name) = match &split.payer {
        engine::ResolvedPayer::Registered { user_id } => (Some(user_id.clone()), None),
        engine::ResolvedPayer::Guest { name, .. } => (None, Some(name.clone())),
    };
    SplitView {
        id: split.id,
        user_id,
        guest_name,
        amount_minor: split.amount.cents(),
        share_percentage: split.share_percentage,
        paid_by,
        paid_by_guest_name,
        settled: split.settled,
    }
}

fn map_split_type(split_type: engine::SplitType) -> api_types::SplitType {
    match split_type {
        engine::SplitType::Equal => api_types::SplitType::Equal,
        engine::SplitType::Percentage => api_types::SplitType::Percentage,
        engine::SplitType::Custom => api_types::SplitType::Custom,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group_id = state
        .engine
        .new_group(&payload.name, payload.description.as_deref(), &user.username)
        .await?;
    let group = state
        .engine
        .group(&group_id.to_string(), &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GroupView>>, ServerError> {
    let groups = state.engine.list_groups(&user.username).await?;
    Ok(Json(groups.into_iter().map(group_view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(&group_id, &user.username).await?;
    Ok(Json(group_view(group)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<GroupUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_group(
            &group_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .deactivate_group(&group_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(&group_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupBalanceView>>, ServerError> {
    let balances = state
        .engine
        .group_balances(&group_id, &user.username)
        .await?;
    Ok(Json(
        balances
            .into_iter()
            .map(|b| GroupBalanceView {
                user_id: b.user_id,
                display_name: b.display_name,
                net_minor: b.net.cents(),
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ExpensesQuery {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

pub async fn expenses(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Json<ExpenseList>, ServerError> {
    let limit = query.limit.unwrap_or(50);
    let (page, next_cursor) = state
        .engine
        .list_group_expenses(&group_id, &user.username, limit, query.cursor.as_deref())
        .await?;

    let expenses = page
        .into_iter()
        .map(|(tx, splits)| ExpenseView {
            transaction_id: tx.id,
            amount_minor: tx.amount.cents(),
            note: tx.note,
            occurred_at: tx.occurred_at,
            split_type: map_split_type(tx.split_type),
            splits: splits.into_iter().map(split_view).collect(),
        })
        .collect();

    Ok(Json(ExpenseList {
        expenses,
        next_cursor,
    }))
}

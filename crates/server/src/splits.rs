//! Split submission and settlement API endpoints

use api_types::relationship::RelationshipView;
use api_types::split::{SettleNew, SettleView, ShareNew, SplitNew, SubmissionView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_split_type(split_type: api_types::SplitType) -> engine::SplitType {
    match split_type {
        api_types::SplitType::Equal => engine::SplitType::Equal,
        api_types::SplitType::Percentage => engine::SplitType::Percentage,
        api_types::SplitType::Custom => engine::SplitType::Custom,
    }
}

fn share_input(share: ShareNew) -> engine::ShareInput {
    let participant = engine::Participant::classify(
        share.user_id,
        share.is_guest,
        share.guest_id,
        share.guest_name,
        share.guest_email,
        share.guest_phone,
    );
    let mut input = engine::ShareInput::new(participant);
    if let Some(amount_minor) = share.amount_minor {
        input = input.amount_minor(amount_minor);
    }
    if let Some(percentage) = share.percentage {
        input = input.percentage(percentage);
    }
    input
}

pub async fn submit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SplitNew>,
) -> Result<(StatusCode, Json<SubmissionView>), ServerError> {
    let mut cmd = engine::SubmitSplitCmd::new(
        payload.amount_minor,
        map_split_type(payload.split_type),
        payload.occurred_at.unwrap_or_else(Utc::now),
    );
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(group_id) = payload.group_id {
        cmd = cmd.group_id(group_id);
    }
    if let Some(paid_by) = payload.paid_by {
        cmd = cmd.paid_by(paid_by);
    }
    for share in payload.shares {
        cmd = cmd.share(share_input(share));
    }

    let outcome = state
        .engine
        .submit_split_transaction(cmd, &user.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionView {
            transaction_id: outcome.transaction_id,
            warnings: outcome.validation.warnings,
            link_failures: outcome
                .link_failures
                .into_iter()
                .map(|f| f.participant)
                .collect(),
            refresh_failures: outcome
                .refreshes
                .iter()
                .filter(|r| r.result.is_err())
                .map(|r| r.relationship_id)
                .collect(),
        }),
    ))
}

pub async fn settle(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(split_id): Path<Uuid>,
    Json(payload): Json<SettleNew>,
) -> Result<Json<SettleView>, ServerError> {
    let outcome = state
        .engine
        .settle_split(
            split_id,
            &payload.method,
            payload.notes.as_deref(),
            &user.username,
        )
        .await?;

    Ok(Json(SettleView {
        settled: outcome.settled,
    }))
}

pub async fn relationships(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<RelationshipView>>, ServerError> {
    let relationships = state.engine.list_relationships(&user.username).await?;
    Ok(Json(
        relationships
            .into_iter()
            .map(|rel| RelationshipView {
                id: rel.id,
                user_a: rel.user_a,
                user_b: rel.user_b,
                balance_minor: rel.balance.cents(),
            })
            .collect(),
    ))
}

//! Group roster API endpoints

use api_types::member::{MemberNew, MemberUpdate, MemberView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn member_view(member: engine::GroupMember) -> MemberView {
    MemberView {
        id: member.id,
        user_id: member.user_id,
        role: member.role.as_str().to_string(),
        display_name: member.display_name,
        email: member.email,
        phone: member.phone,
        relationship_label: member.relationship_label,
        is_registered_user: member.is_registered_user,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<MemberView>>, ServerError> {
    let members = state
        .engine
        .list_group_members(&group_id, &user.username)
        .await?;
    Ok(Json(members.into_iter().map(member_view).collect()))
}

pub async fn add(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let mut cmd = engine::NewMemberCmd::new(payload.name);
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    if let Some(phone) = payload.phone {
        cmd = cmd.phone(phone);
    }
    if let Some(label) = payload.relationship_label {
        cmd = cmd.relationship_label(label);
    }

    let member = state
        .engine
        .add_group_member(&group_id, cmd, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(String, Uuid)>,
    Json(payload): Json<MemberUpdate>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .update_group_member(
            &group_id,
            member_id,
            engine::UpdateMemberCmd {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                relationship_label: payload.relationship_label,
            },
            &user.username,
        )
        .await?;
    Ok(Json(member_view(member)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_group_member(&group_id, member_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

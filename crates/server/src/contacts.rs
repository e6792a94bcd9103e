//! Personal contacts API endpoints

use api_types::contact::{ContactNew, ContactUpdate, ContactView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn contact_view(contact: engine::Contact) -> ContactView {
    ContactView {
        id: contact.id,
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ContactView>>, ServerError> {
    let contacts = state.engine.list_contacts(&user.username).await?;
    Ok(Json(contacts.into_iter().map(contact_view).collect()))
}

pub async fn add(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ContactNew>,
) -> Result<(StatusCode, Json<ContactView>), ServerError> {
    let mut cmd = engine::NewContactCmd::new(payload.name, payload.email);
    if let Some(phone) = payload.phone {
        cmd = cmd.phone(phone);
    }

    let contact = state.engine.add_contact(cmd, &user.username).await?;
    Ok((StatusCode::CREATED, Json(contact_view(contact))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(contact_id): Path<Uuid>,
    Json(payload): Json<ContactUpdate>,
) -> Result<Json<ContactView>, ServerError> {
    let contact = state
        .engine
        .update_contact(
            contact_id,
            payload.name.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            &user.username,
        )
        .await?;
    Ok(Json(contact_view(contact)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(contact_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_contact(contact_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Personal address book.
//!
//! A contact is a lightweight entry owned by one user, unique per
//! `(owner, email)` and soft-deleted via the `active` flag.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(owner_id: String, name: String, email: String, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            email,
            phone,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "individual_contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Contact> for ActiveModel {
    fn from(contact: &Contact) -> Self {
        Self {
            id: ActiveValue::Set(contact.id.to_string()),
            owner_id: ActiveValue::Set(contact.owner_id.clone()),
            name: ActiveValue::Set(contact.name.clone()),
            email: ActiveValue::Set(contact.email.clone()),
            phone: ActiveValue::Set(contact.phone.clone()),
            active: ActiveValue::Set(contact.active),
            created_at: ActiveValue::Set(contact.created_at),
        }
    }
}

impl TryFrom<Model> for Contact {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "contact")?,
            owner_id: model.owner_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            active: model.active,
            created_at: model.created_at,
        })
    }
}

//! Group membership roster.
//!
//! A member either maps to a registered account (`is_registered_user`) or is
//! a guest provisioned with a freshly generated synthetic identity that
//! resolves to no real account. Display fields are denormalized onto the row
//! because a guest has no account record to join against.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Member,
    Admin,
}

impl GroupRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for GroupRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidRole(format!(
                "invalid member role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: String,
    pub role: GroupRole,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship_label: Option<String>,
    pub is_registered_user: bool,
    pub created_at: DateTime<Utc>,
}

impl GroupMember {
    /// A member backed by a real account.
    pub fn registered(
        group_id: Uuid,
        user_id: String,
        display_name: String,
        role: GroupRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            role,
            display_name,
            email: None,
            phone: None,
            relationship_label: None,
            is_registered_user: true,
            created_at: Utc::now(),
        }
    }

    /// A guest member: gets a synthetic identity that resolves to no account.
    pub fn guest(
        group_id: Uuid,
        display_name: String,
        email: Option<String>,
        phone: Option<String>,
        relationship_label: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id: Uuid::new_v4().to_string(),
            role: GroupRole::Member,
            display_name,
            email,
            phone,
            relationship_label,
            is_registered_user: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub role: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship_label: Option<String>,
    pub is_registered_user: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GroupMember> for ActiveModel {
    fn from(member: &GroupMember) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            group_id: ActiveValue::Set(member.group_id.to_string()),
            user_id: ActiveValue::Set(member.user_id.clone()),
            role: ActiveValue::Set(member.role.as_str().to_string()),
            display_name: ActiveValue::Set(member.display_name.clone()),
            email: ActiveValue::Set(member.email.clone()),
            phone: ActiveValue::Set(member.phone.clone()),
            relationship_label: ActiveValue::Set(member.relationship_label.clone()),
            is_registered_user: ActiveValue::Set(member.is_registered_user),
            created_at: ActiveValue::Set(member.created_at),
        }
    }
}

impl TryFrom<Model> for GroupMember {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "member")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            user_id: model.user_id,
            role: GroupRole::try_from(model.role.as_str())?,
            display_name: model.display_name,
            email: model.email,
            phone: model.phone,
            relationship_label: model.relationship_label,
            is_registered_user: model.is_registered_user,
            created_at: model.created_at,
        })
    }
}

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, GroupRole, ResultEngine, group_members, groups, users};

use super::Engine;

impl Engine {
    /// Requires a resolvable caller identity: non-empty and backed by an
    /// account row. Everything else in the engine runs after this check.
    pub(super) async fn require_caller(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        if user_id.trim().is_empty() {
            return Err(EngineError::Unauthenticated(
                "empty caller id".to_string(),
            ));
        }
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::Unauthenticated(format!("unknown caller {user_id}")))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    async fn find_group_by_id(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
    ) -> ResultEngine<Option<groups::Model>> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn member_role(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<Option<GroupRole>> {
        let row = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .filter(group_members::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| GroupRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Owner or any member. Missing groups and foreign groups are both
    /// reported as not found.
    pub(super) async fn require_group_read(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        let model = self
            .find_group_by_id(db, group_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;
        if model.owner_id != user_id
            && self.member_role(db, group_id, user_id).await?.is_none()
        {
            return Err(EngineError::KeyNotFound("group not exists".to_string()));
        }
        Ok(model)
    }

    /// Owner or an admin-role member.
    pub(super) async fn require_group_admin(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        let model = self.require_group_read(db, group_id, user_id).await?;
        if model.owner_id == user_id {
            return Ok(model);
        }
        match self.member_role(db, group_id, user_id).await? {
            Some(GroupRole::Admin) => Ok(model),
            _ => Err(EngineError::KeyNotFound("group not exists".to_string())),
        }
    }

    pub(super) async fn require_group_owner(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        let model = self
            .find_group_by_id(db, group_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;
        if model.owner_id != user_id {
            return Err(EngineError::KeyNotFound("group not exists".to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_member_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: &str,
        member_id: Uuid,
    ) -> ResultEngine<group_members::Model> {
        group_members::Entity::find_by_id(member_id.to_string())
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))
    }
}

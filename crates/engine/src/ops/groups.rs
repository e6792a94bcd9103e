use chrono::Utc;
use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Group, GroupMember, GroupRole, ResultEngine, group_members, groups};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Creates a group and enrolls the creator as its `admin` member.
    pub async fn new_group(
        &self,
        name: &str,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, user_id).await?;
            let name = normalize_required_name(name, "group")?;
            let description = normalize_optional_text(description);

            let group = Group::new(name, description, user_id.to_string());
            groups::ActiveModel::from(&group).insert(&db_tx).await?;

            let display_name = caller.display_name.unwrap_or(caller.username);
            let creator = GroupMember::registered(
                group.id,
                user_id.to_string(),
                display_name,
                GroupRole::Admin,
            );
            group_members::ActiveModel::from(&creator)
                .insert(&db_tx)
                .await?;

            Ok(group.id)
        })
    }

    /// Lists the caller's active groups: owned ones plus those they are
    /// enrolled in as a registered member.
    pub async fn list_groups(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;

            let member_rows: Vec<group_members::Model> = group_members::Entity::find()
                .filter(group_members::Column::UserId.eq(user_id.to_string()))
                .filter(group_members::Column::IsRegisteredUser.eq(true))
                .all(&db_tx)
                .await?;
            let member_group_ids: Vec<String> =
                member_rows.into_iter().map(|m| m.group_id).collect();

            let models: Vec<groups::Model> = groups::Entity::find()
                .filter(
                    Condition::any()
                        .add(groups::Column::OwnerId.eq(user_id.to_string()))
                        .add(groups::Column::Id.is_in(member_group_ids)),
                )
                .filter(groups::Column::Active.eq(true))
                .order_by_desc(groups::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            models.into_iter().map(Group::try_from).collect()
        })
    }

    /// Fetches one group the caller can read.
    pub async fn group(&self, group_id: &str, user_id: &str) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = self.require_group_read(&db_tx, group_id, user_id).await?;
            Group::try_from(model)
        })
    }

    /// Updates group metadata (admin-only).
    pub async fn update_group(
        &self,
        group_id: &str,
        name: Option<&str>,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = self.require_group_admin(&db_tx, group_id, user_id).await?;

            let mut active: groups::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(normalize_required_name(name, "group")?);
            }
            if let Some(description) = description {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Soft-deactivates a group (admin-only): hides it from listings while
    /// keeping the ledger history.
    pub async fn deactivate_group(&self, group_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = self.require_group_admin(&db_tx, group_id, user_id).await?;

            let mut active: groups::ActiveModel = model.into();
            active.active = ActiveValue::Set(false);
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Hard-deletes a group and its roster (owner-only).
    ///
    /// Split rows are ledger history owned by their transactions and are left
    /// untouched; only the group and its membership go away.
    pub async fn delete_group(&self, group_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = self.require_group_owner(&db_tx, group_id, user_id).await?;

            group_members::Entity::delete_many()
                .filter(group_members::Column::GroupId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            groups::Entity::delete_by_id(model.id).exec(&db_tx).await?;

            Ok(())
        })
    }

    /// Lists a group's roster.
    pub async fn list_group_members(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<GroupMember>> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            self.require_group_read(&db_tx, group_id, user_id).await?;

            let rows: Vec<group_members::Model> = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .order_by_asc(group_members::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            rows.into_iter().map(GroupMember::try_from).collect()
        })
    }
}

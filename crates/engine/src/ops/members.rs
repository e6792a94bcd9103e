use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, GroupMember, GroupRole, NewMemberCmd, ResultEngine, UpdateMemberCmd,
    group_members,
    util::{normalize_email, parse_uuid},
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Adds a guest member to a group (admin-only).
    ///
    /// Every member added here is provisioned with a freshly generated
    /// synthetic identity and `is_registered_user = false`; this subsystem
    /// never resolves an email to a real account. Duplicates are detected by
    /// `(group, normalized email)` — without an email there is nothing
    /// stable to dedupe on and the add proceeds.
    pub async fn add_group_member(
        &self,
        group_id: &str,
        cmd: NewMemberCmd,
        user_id: &str,
    ) -> ResultEngine<GroupMember> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            self.require_group_admin(&db_tx, group_id, user_id).await?;

            let name = normalize_required_name(&cmd.name, "member")?;
            let email = normalize_optional_text(cmd.email.as_deref());

            if let Some(email) = &email {
                let wanted = normalize_email(email);
                let existing: Vec<group_members::Model> = group_members::Entity::find()
                    .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                    .filter(group_members::Column::Email.is_not_null())
                    .all(&db_tx)
                    .await?;
                // Normalization is Unicode-aware, so compare in memory
                // rather than in SQL. Rosters are small.
                if existing
                    .iter()
                    .any(|m| m.email.as_deref().is_some_and(|e| normalize_email(e) == wanted))
                {
                    return Err(EngineError::Conflict(format!(
                        "a member with email {email} already exists in this group"
                    )));
                }
            }

            let member = GroupMember::guest(
                parse_uuid(group_id, "group")?,
                name,
                email,
                normalize_optional_text(cmd.phone.as_deref()),
                normalize_optional_text(cmd.relationship_label.as_deref()),
            );
            group_members::ActiveModel::from(&member)
                .insert(&db_tx)
                .await?;

            Ok(member)
        })
    }

    /// Edits a member's denormalized display fields (admin-only).
    pub async fn update_group_member(
        &self,
        group_id: &str,
        member_id: Uuid,
        cmd: UpdateMemberCmd,
        user_id: &str,
    ) -> ResultEngine<GroupMember> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            self.require_group_admin(&db_tx, group_id, user_id).await?;
            let model = self.require_member_in_group(&db_tx, group_id, member_id).await?;

            let mut active: group_members::ActiveModel = model.into();
            if let Some(name) = cmd.name.as_deref() {
                active.display_name = ActiveValue::Set(normalize_required_name(name, "member")?);
            }
            if let Some(email) = cmd.email.as_deref() {
                active.email = ActiveValue::Set(normalize_optional_text(Some(email)));
            }
            if let Some(phone) = cmd.phone.as_deref() {
                active.phone = ActiveValue::Set(normalize_optional_text(Some(phone)));
            }
            if let Some(label) = cmd.relationship_label.as_deref() {
                active.relationship_label = ActiveValue::Set(normalize_optional_text(Some(label)));
            }
            let updated = active.update(&db_tx).await?;

            GroupMember::try_from(updated)
        })
    }

    /// Removes a member from a group (admin-only). Admin rows cannot be
    /// removed through this operation.
    pub async fn remove_group_member(
        &self,
        group_id: &str,
        member_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            self.require_group_admin(&db_tx, group_id, user_id).await?;
            let model = self.require_member_in_group(&db_tx, group_id, member_id).await?;

            if GroupRole::try_from(model.role.as_str())? == GroupRole::Admin {
                return Err(EngineError::InvalidRole(
                    "cannot remove an admin member".to_string(),
                ));
            }

            group_members::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }
}

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Contact, EngineError, NewContactCmd, ResultEngine, contacts, util::normalize_email,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Adds a personal contact.
    ///
    /// Contacts are unique per `(owner, email)`. Adding an email that already
    /// exists returns the existing contact instead of erroring; a previously
    /// soft-deleted entry is reactivated.
    pub async fn add_contact(&self, cmd: NewContactCmd, user_id: &str) -> ResultEngine<Contact> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let name = normalize_required_name(&cmd.name, "contact")?;
            let email = normalize_email(&cmd.email);
            if email.is_empty() {
                return Err(EngineError::InvalidAmount(
                    "contact email must not be empty".to_string(),
                ));
            }

            let existing = contacts::Entity::find()
                .filter(contacts::Column::OwnerId.eq(user_id.to_string()))
                .filter(contacts::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;

            let contact = match existing {
                Some(model) if model.active => Contact::try_from(model)?,
                Some(model) => {
                    let mut active: contacts::ActiveModel = model.into();
                    active.active = ActiveValue::Set(true);
                    Contact::try_from(active.update(&db_tx).await?)?
                }
                None => {
                    let contact = Contact::new(
                        user_id.to_string(),
                        name,
                        email,
                        normalize_optional_text(cmd.phone.as_deref()),
                    );
                    contacts::ActiveModel::from(&contact).insert(&db_tx).await?;
                    contact
                }
            };

            Ok(contact)
        })
    }

    /// Edits a contact owned by the caller.
    pub async fn update_contact(
        &self,
        contact_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Contact> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = self.require_contact_owner(&db_tx, contact_id, user_id).await?;

            let mut active: contacts::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(normalize_required_name(name, "contact")?);
            }
            if let Some(email) = email {
                let email = normalize_email(email);
                let taken = contacts::Entity::find()
                    .filter(contacts::Column::OwnerId.eq(user_id.to_string()))
                    .filter(contacts::Column::Email.eq(email.clone()))
                    .filter(contacts::Column::Id.ne(contact_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::Conflict(format!(
                        "a contact with email {email} already exists"
                    )));
                }
                active.email = ActiveValue::Set(email);
            }
            if let Some(phone) = phone {
                active.phone = ActiveValue::Set(normalize_optional_text(Some(phone)));
            }
            let updated = active.update(&db_tx).await?;

            Contact::try_from(updated)
        })
    }

    /// Soft-deletes a contact owned by the caller.
    pub async fn remove_contact(&self, contact_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;
            let model = self.require_contact_owner(&db_tx, contact_id, user_id).await?;

            let mut active: contacts::ActiveModel = model.into();
            active.active = ActiveValue::Set(false);
            active.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Lists the caller's active contacts.
    pub async fn list_contacts(&self, user_id: &str) -> ResultEngine<Vec<Contact>> {
        with_tx!(self, |db_tx| {
            self.require_caller(&db_tx, user_id).await?;

            let rows: Vec<contacts::Model> = contacts::Entity::find()
                .filter(contacts::Column::OwnerId.eq(user_id.to_string()))
                .filter(contacts::Column::Active.eq(true))
                .order_by_asc(contacts::Column::Name)
                .all(&db_tx)
                .await?;

            rows.into_iter().map(Contact::try_from).collect()
        })
    }

    async fn require_contact_owner(
        &self,
        db: &sea_orm::DatabaseTransaction,
        contact_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<contacts::Model> {
        contacts::Entity::find_by_id(contact_id.to_string())
            .filter(contacts::Column::OwnerId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("contact not exists".to_string()))
    }
}

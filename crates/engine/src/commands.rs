//! Command structs for engine operations.
//!
//! These types group parameters for write operations (member management,
//! split submission), keeping call sites readable and avoiding long argument
//! lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Participant, split::SplitType};

/// Add a member to a group.
///
/// Members added this way are guests: they are provisioned with a synthetic
/// identity, never resolved to a real account.
#[derive(Clone, Debug)]
pub struct NewMemberCmd {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship_label: Option<String>,
}

impl NewMemberCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            relationship_label: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn relationship_label(mut self, label: impl Into<String>) -> Self {
        self.relationship_label = Some(label.into());
        self
    }
}

/// Edit a member's denormalized display fields. `None` leaves a field as-is.
#[derive(Clone, Debug, Default)]
pub struct UpdateMemberCmd {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship_label: Option<String>,
}

/// Add a personal contact.
#[derive(Clone, Debug)]
pub struct NewContactCmd {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewContactCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// One incoming share of a split submission.
///
/// `amount_minor` is only read for custom splits and `percentage` only for
/// percentage splits; the other strategies compute shares themselves.
#[derive(Clone, Debug)]
pub struct ShareInput {
    pub participant: Participant,
    pub amount_minor: Option<i64>,
    pub percentage: Option<f64>,
}

impl ShareInput {
    #[must_use]
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            amount_minor: None,
            percentage: None,
        }
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }
}

/// Create a split transaction.
#[derive(Clone, Debug)]
pub struct SubmitSplitCmd {
    pub amount_minor: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub group_id: Option<Uuid>,
    pub split_type: SplitType,
    /// Explicit payer id; defaults to the caller. May reference a guest
    /// share's request-local id.
    pub paid_by: Option<String>,
    pub shares: Vec<ShareInput>,
}

impl SubmitSplitCmd {
    #[must_use]
    pub fn new(amount_minor: i64, split_type: SplitType, occurred_at: DateTime<Utc>) -> Self {
        Self {
            amount_minor,
            note: None,
            occurred_at,
            group_id: None,
            split_type,
            paid_by: None,
            shares: Vec::new(),
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn paid_by(mut self, paid_by: impl Into<String>) -> Self {
        self.paid_by = Some(paid_by.into());
        self
    }

    #[must_use]
    pub fn share(mut self, share: ShareInput) -> Self {
        self.shares.push(share);
        self
    }
}

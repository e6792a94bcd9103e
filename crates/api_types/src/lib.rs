//! Wire types shared between the server and its clients.
//!
//! Amounts travel as signed integer minor units (`*_minor`), matching the
//! engine's representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Percentage,
    Custom,
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GroupUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub owner_id: String,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod member {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub relationship_label: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MemberUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub relationship_label: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub user_id: String,
        pub role: String,
        pub display_name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub relationship_label: Option<String>,
        pub is_registered_user: bool,
    }
}

pub mod contact {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactNew {
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ContactUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
    }
}

pub mod split {
    use super::*;

    /// One incoming share. A share is a guest when `is_guest` is set or when
    /// it carries a name/email without a `user_id`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ShareNew {
        pub user_id: Option<String>,
        #[serde(default)]
        pub is_guest: bool,
        /// Request-local guest id, used only for payer matching.
        pub guest_id: Option<String>,
        pub guest_name: Option<String>,
        pub guest_email: Option<String>,
        pub guest_phone: Option<String>,
        /// Only read for custom splits.
        pub amount_minor: Option<i64>,
        /// Only read for percentage splits.
        pub percentage: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitNew {
        pub amount_minor: i64,
        pub note: Option<String>,
        pub occurred_at: Option<DateTime<Utc>>,
        pub group_id: Option<Uuid>,
        pub split_type: SplitType,
        pub paid_by: Option<String>,
        pub shares: Vec<ShareNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubmissionView {
        pub transaction_id: Uuid,
        pub warnings: Vec<String>,
        /// Participants whose relationship could not be linked; their splits
        /// exist without a relationship reference.
        pub link_failures: Vec<String>,
        /// Relationships whose cached balance could not be refreshed.
        pub refresh_failures: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleNew {
        pub method: String,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleView {
        pub settled: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub id: Uuid,
        pub user_id: Option<String>,
        pub guest_name: Option<String>,
        pub amount_minor: i64,
        pub share_percentage: Option<f64>,
        pub paid_by: Option<String>,
        pub paid_by_guest_name: Option<String>,
        pub settled: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub transaction_id: Uuid,
        pub amount_minor: i64,
        pub note: Option<String>,
        pub occurred_at: DateTime<Utc>,
        pub split_type: SplitType,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub expenses: Vec<ExpenseView>,
        pub next_cursor: Option<String>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupBalanceView {
        pub user_id: Option<String>,
        pub display_name: String,
        pub net_minor: i64,
    }
}

pub mod relationship {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RelationshipView {
        pub id: Uuid,
        pub user_a: String,
        pub user_b: String,
        pub balance_minor: i64,
    }
}

pub mod validation {
    use super::*;

    /// Body of a 422 response for an invalid split set.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ValidationReport {
        pub is_valid: bool,
        pub total_shares_minor: i64,
        pub expected_total_minor: i64,
        pub difference_minor: i64,
        pub errors: Vec<String>,
        pub warnings: Vec<String>,
    }
}

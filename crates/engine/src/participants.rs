//! Participant classification and payer resolution.
//!
//! A split participant is either a registered account or a guest known only
//! by denormalized contact fields. The two shapes never mix: a guest carries
//! no account id and a registered participant carries no contact bundle.

use serde::{Deserialize, Serialize};

use crate::split::SplitCalculation;

/// One party to a split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    Registered {
        user_id: String,
    },
    Guest {
        /// Request-local identity (e.g. the synthetic member id of a group
        /// guest). Guests have no stable account identity, so this is only
        /// meaningful for payer matching within a single submission.
        id: Option<String>,
        name: String,
        email: Option<String>,
        phone: Option<String>,
    },
}

impl Participant {
    /// Classifies raw split fields into a participant.
    ///
    /// A split is a guest if it carries the explicit guest flag, or if it has
    /// a name/email but no resolvable account id.
    pub fn classify(
        user_id: Option<String>,
        is_guest: bool,
        guest_id: Option<String>,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Participant {
        match user_id {
            Some(user_id) if !is_guest => Participant::Registered { user_id },
            other => Participant::Guest {
                id: other.or(guest_id),
                name: name.unwrap_or_default(),
                email,
                phone,
            },
        }
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Participant::Guest { .. })
    }

    /// Registered account id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Participant::Registered { user_id } => Some(user_id),
            Participant::Guest { .. } => None,
        }
    }

    /// Human-readable label for error messages.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Participant::Registered { user_id } => user_id,
            Participant::Guest { name, .. } => name,
        }
    }

    fn matches_id(&self, id: &str) -> bool {
        match self {
            Participant::Registered { user_id } => user_id == id,
            Participant::Guest { id: local, .. } => local.as_deref() == Some(id),
        }
    }
}

/// Who actually paid a split transaction.
///
/// Exactly one payer exists per transaction: a registered account, or a guest
/// identified by the contact bundle copied from their own split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedPayer {
    Registered {
        user_id: String,
    },
    Guest {
        name: String,
        email: Option<String>,
        phone: Option<String>,
    },
}

impl ResolvedPayer {
    #[must_use]
    pub fn registered_user_id(&self) -> Option<&str> {
        match self {
            ResolvedPayer::Registered { user_id } => Some(user_id),
            ResolvedPayer::Guest { .. } => None,
        }
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, ResolvedPayer::Guest { .. })
    }
}

/// Resolves the payer for a batch of shares.
///
/// - No explicit payer: the caller paid.
/// - Explicit payer matching a guest share's request-local id: the guest
///   paid; their contact bundle becomes the payer identity.
/// - Anything else is treated as a registered payer id as given.
///
/// The result is transaction-level metadata: the orchestrator stamps it onto
/// every split row of the batch, not only the payer's own row.
pub fn resolve_payer(
    shares: &[SplitCalculation],
    paid_by: Option<&str>,
    caller: &str,
) -> ResolvedPayer {
    let Some(paid_by) = paid_by else {
        return ResolvedPayer::Registered {
            user_id: caller.to_string(),
        };
    };

    for share in shares {
        if let Participant::Guest {
            id: Some(local),
            name,
            email,
            phone,
        } = &share.participant
            && local == paid_by
        {
            return ResolvedPayer::Guest {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
            };
        }
    }

    ResolvedPayer::Registered {
        user_id: paid_by.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoneyCents, split::SplitCalculation};

    fn registered(id: &str) -> Participant {
        Participant::Registered {
            user_id: id.to_string(),
        }
    }

    fn guest(local_id: &str, name: &str) -> Participant {
        Participant::Guest {
            id: Some(local_id.to_string()),
            name: name.to_string(),
            email: Some(format!("{name}@example.com")),
            phone: None,
        }
    }

    fn share(participant: Participant) -> SplitCalculation {
        SplitCalculation {
            participant,
            amount: MoneyCents::new(100),
            percentage: None,
        }
    }

    #[test]
    fn classify_prefers_registered_identity() {
        let p = Participant::classify(
            Some("alice".to_string()),
            false,
            None,
            Some("Alice".to_string()),
            None,
            None,
        );
        assert_eq!(
            p,
            Participant::Registered {
                user_id: "alice".to_string()
            }
        );
    }

    #[test]
    fn classify_flag_wins_over_identity() {
        // An explicit guest flag makes the id request-local, not an account.
        let p = Participant::classify(
            Some("synthetic-id".to_string()),
            true,
            None,
            Some("Mario".to_string()),
            Some("mario@example.com".to_string()),
            None,
        );
        assert!(p.is_guest());
        assert_eq!(p.user_id(), None);
        assert_eq!(p.label(), "Mario");
    }

    #[test]
    fn classify_without_identity_is_guest() {
        let p = Participant::classify(None, false, None, Some("Mario".to_string()), None, None);
        assert!(p.is_guest());
    }

    #[test]
    fn default_payer_is_caller() {
        let shares = vec![share(registered("alice")), share(registered("bob"))];
        let payer = resolve_payer(&shares, None, "alice");
        assert_eq!(payer.registered_user_id(), Some("alice"));
    }

    #[test]
    fn explicit_registered_payer_is_kept() {
        let shares = vec![share(registered("alice")), share(registered("bob"))];
        let payer = resolve_payer(&shares, Some("bob"), "alice");
        assert_eq!(payer.registered_user_id(), Some("bob"));
    }

    #[test]
    fn guest_payer_copies_contact_bundle() {
        let shares = vec![share(registered("alice")), share(guest("g-1", "Mario"))];
        let payer = resolve_payer(&shares, Some("g-1"), "alice");
        assert_eq!(
            payer,
            ResolvedPayer::Guest {
                name: "Mario".to_string(),
                email: Some("Mario@example.com".to_string()),
                phone: None,
            }
        );
        assert_eq!(payer.registered_user_id(), None);
    }

    #[test]
    fn unknown_payer_id_falls_back_to_registered() {
        // Ids that match no guest share are taken as registered accounts.
        let shares = vec![share(guest("g-1", "Mario"))];
        let payer = resolve_payer(&shares, Some("carol"), "alice");
        assert_eq!(payer.registered_user_id(), Some("carol"));
    }
}

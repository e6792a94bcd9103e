//! Expense-split ledger engine.
//!
//! The engine turns "one payer, N participants, one amount" into validated
//! per-participant obligations, resolves who actually paid (including
//! guests), persists the transaction with all its split rows atomically, and
//! opportunistically keeps bilateral relationship balances in sync.

pub use commands::{NewContactCmd, NewMemberCmd, ShareInput, SubmitSplitCmd, UpdateMemberCmd};
pub use contacts::Contact;
pub use error::EngineError;
pub use group_members::{GroupMember, GroupRole};
pub use groups::Group;
pub use money::MoneyCents;
pub use ops::{
    Engine, EngineBuilder, GroupBalance, LinkFailure, RefreshOutcome, SettlementOutcome,
    SubmissionOutcome,
};
pub use participants::{Participant, ResolvedPayer, resolve_payer};
pub use relationships::{FinancialRelationship, ordered_pair};
pub use split::{SplitCalculation, SplitType, custom_shares, equal_shares, percentage_shares};
pub use transaction_splits::TransactionSplit;
pub use transactions::Transaction;
pub use validation::{ROUNDING_TOLERANCE, SplitValidation, validate_splits};

mod commands;
mod contacts;
mod error;
mod group_members;
mod groups;
mod money;
mod ops;
mod participants;
mod relationships;
mod split;
mod transaction_splits;
mod transactions;
mod users;
mod util;
mod validation;

type ResultEngine<T> = Result<T, EngineError>;

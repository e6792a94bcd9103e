//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: accounts
//! - `groups`: expense groups owned by users
//! - `group_members`: roster rows, registered or guest
//! - `individual_contacts`: per-user address book
//! - `transactions`: expense records with split bookkeeping
//! - `transaction_splits`: per-participant obligations
//! - `financial_relationships`: bilateral balance ledgers

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    DisplayName,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    Name,
    Description,
    OwnerId,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GroupMembers {
    Table,
    Id,
    GroupId,
    UserId,
    Role,
    DisplayName,
    Email,
    Phone,
    RelationshipLabel,
    IsRegisteredUser,
    CreatedAt,
}

#[derive(Iden)]
enum IndividualContacts {
    Table,
    Id,
    OwnerId,
    Name,
    Email,
    Phone,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    GroupId,
    CreatedBy,
    AmountMinor,
    Note,
    OccurredAt,
    SplitType,
    SplitCount,
    HasSplits,
    CreatedAt,
}

#[derive(Iden)]
enum TransactionSplits {
    Table,
    Id,
    TransactionId,
    IsGuest,
    UserId,
    GuestName,
    GuestEmail,
    GuestPhone,
    GroupId,
    AmountMinor,
    SharePercentage,
    SplitType,
    PaidBy,
    PaidByGuestName,
    PaidByGuestEmail,
    PaidByGuestPhone,
    RelationshipId,
    Settled,
    SettledAt,
    SettlementMethod,
    SettlementNotes,
    CreatedAt,
}

#[derive(Iden)]
enum FinancialRelationships {
    Table,
    Id,
    UserA,
    UserB,
    BalanceMinor,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::Description).string())
                    .col(ColumnDef::new(Groups::OwnerId).string().not_null())
                    .col(ColumnDef::new(Groups::Active).boolean().not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Groups::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-groups-owner_id")
                            .from(Groups::Table, Groups::OwnerId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-owner_id")
                    .table(Groups::Table)
                    .col(Groups::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMembers::GroupId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::UserId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::Role).string().not_null())
                    .col(
                        ColumnDef::new(GroupMembers::DisplayName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupMembers::Email).string())
                    .col(ColumnDef::new(GroupMembers::Phone).string())
                    .col(ColumnDef::new(GroupMembers::RelationshipLabel).string())
                    .col(
                        ColumnDef::new(GroupMembers::IsRegisteredUser)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupMembers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-group_id")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-user_id")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IndividualContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndividualContacts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IndividualContacts::OwnerId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IndividualContacts::Name).string().not_null())
                    .col(
                        ColumnDef::new(IndividualContacts::Email)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IndividualContacts::Phone).string())
                    .col(
                        ColumnDef::new(IndividualContacts::Active)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndividualContacts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-individual_contacts-owner_id")
                            .from(IndividualContacts::Table, IndividualContacts::OwnerId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-individual_contacts-owner_email")
                    .table(IndividualContacts::Table)
                    .col(IndividualContacts::OwnerId)
                    .col(IndividualContacts::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::GroupId).string())
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::SplitType).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::SplitCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::HasSplits)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-created_by")
                            .from(Transactions::Table, Transactions::CreatedBy)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-group_id")
                    .table(Transactions::Table)
                    .col(Transactions::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionSplits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionSplits::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionSplits::IsGuest)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionSplits::UserId).string())
                    .col(ColumnDef::new(TransactionSplits::GuestName).string())
                    .col(ColumnDef::new(TransactionSplits::GuestEmail).string())
                    .col(ColumnDef::new(TransactionSplits::GuestPhone).string())
                    .col(ColumnDef::new(TransactionSplits::GroupId).string())
                    .col(
                        ColumnDef::new(TransactionSplits::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionSplits::SharePercentage).double())
                    .col(
                        ColumnDef::new(TransactionSplits::SplitType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionSplits::PaidBy).string())
                    .col(ColumnDef::new(TransactionSplits::PaidByGuestName).string())
                    .col(ColumnDef::new(TransactionSplits::PaidByGuestEmail).string())
                    .col(ColumnDef::new(TransactionSplits::PaidByGuestPhone).string())
                    .col(ColumnDef::new(TransactionSplits::RelationshipId).string())
                    .col(
                        ColumnDef::new(TransactionSplits::Settled)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionSplits::SettledAt).timestamp())
                    .col(ColumnDef::new(TransactionSplits::SettlementMethod).string())
                    .col(ColumnDef::new(TransactionSplits::SettlementNotes).string())
                    .col(
                        ColumnDef::new(TransactionSplits::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_splits-transaction_id")
                            .from(TransactionSplits::Table, TransactionSplits::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_splits-transaction_id")
                    .table(TransactionSplits::Table)
                    .col(TransactionSplits::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_splits-relationship_id")
                    .table(TransactionSplits::Table)
                    .col(TransactionSplits::RelationshipId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_splits-group_id")
                    .table(TransactionSplits::Table)
                    .col(TransactionSplits::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinancialRelationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialRelationships::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialRelationships::UserA)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRelationships::UserB)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRelationships::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRelationships::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRelationships::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-financial_relationships-pair")
                    .table(FinancialRelationships::Table)
                    .col(FinancialRelationships::UserA)
                    .col(FinancialRelationships::UserB)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(FinancialRelationships::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionSplits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IndividualContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

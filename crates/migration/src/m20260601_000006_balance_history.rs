use sea_orm_migration::prelude::*;

use crate::m20260601_000001_users::Users;
use crate::m20260601_000002_members::Members;
use crate::m20260601_000004_deposits::Deposits;
use crate::m20260601_000005_cash_transactions::CashTransactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BalanceHistory {
    Table,
    Id,
    Number,
    MemberId,
    Direction,
    Category,
    AmountDeltaMinor,
    PointDelta,
    BalanceBeforeMinor,
    BalanceAfterMinor,
    PointsBefore,
    PointsAfter,
    DepositId,
    CashTransactionId,
    AdminId,
    OccurredAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BalanceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceHistory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BalanceHistory::Number)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BalanceHistory::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(BalanceHistory::Direction)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BalanceHistory::Category).string().not_null())
                    .col(
                        ColumnDef::new(BalanceHistory::AmountDeltaMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceHistory::PointDelta)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceHistory::BalanceBeforeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceHistory::BalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceHistory::PointsBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceHistory::PointsAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BalanceHistory::DepositId).string())
                    .col(ColumnDef::new(BalanceHistory::CashTransactionId).string())
                    .col(ColumnDef::new(BalanceHistory::AdminId).string().not_null())
                    .col(
                        ColumnDef::new(BalanceHistory::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_history-member_id")
                            .from(BalanceHistory::Table, BalanceHistory::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_history-deposit_id")
                            .from(BalanceHistory::Table, BalanceHistory::DepositId)
                            .to(Deposits::Table, Deposits::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_history-cash_transaction_id")
                            .from(BalanceHistory::Table, BalanceHistory::CashTransactionId)
                            .to(CashTransactions::Table, CashTransactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_history-admin_id")
                            .from(BalanceHistory::Table, BalanceHistory::AdminId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance_history-member_id-occurred_at")
                    .table(BalanceHistory::Table)
                    .col(BalanceHistory::MemberId)
                    .col(BalanceHistory::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance_history-direction-category")
                    .table(BalanceHistory::Table)
                    .col(BalanceHistory::Direction)
                    .col(BalanceHistory::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BalanceHistory::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

use crate::m20260601_000001_users::Users;
use crate::m20260601_000002_members::Members;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum CashTransactions {
    Table,
    Id,
    Number,
    Direction,
    Category,
    AmountMinor,
    MemberId,
    AdminId,
    OccurredAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CashTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::Number)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::Direction)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashTransactions::MemberId).string())
                    .col(ColumnDef::new(CashTransactions::AdminId).string().not_null())
                    .col(
                        ColumnDef::new(CashTransactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_transactions-member_id")
                            .from(CashTransactions::Table, CashTransactions::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_transactions-admin_id")
                            .from(CashTransactions::Table, CashTransactions::AdminId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_transactions-occurred_at")
                    .table(CashTransactions::Table)
                    .col(CashTransactions::OccurredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CashTransactions::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

use crate::m20260601_000001_users::Users;
use crate::m20260601_000002_members::Members;
use crate::m20260601_000003_waste_types::WasteTypes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Deposits {
    Table,
    Id,
    MemberId,
    WasteTypeId,
    AdminId,
    WeightGrams,
    PricePerKgMinor,
    PointsPerKg,
    TotalMinor,
    PointsEarned,
    OccurredAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deposits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deposits::MemberId).string().not_null())
                    .col(ColumnDef::new(Deposits::WasteTypeId).string().not_null())
                    .col(ColumnDef::new(Deposits::AdminId).string().not_null())
                    .col(
                        ColumnDef::new(Deposits::WeightGrams)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deposits::PricePerKgMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deposits::PointsPerKg)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deposits::TotalMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Deposits::PointsEarned)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deposits::OccurredAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deposits-member_id")
                            .from(Deposits::Table, Deposits::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deposits-waste_type_id")
                            .from(Deposits::Table, Deposits::WasteTypeId)
                            .to(WasteTypes::Table, WasteTypes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deposits-admin_id")
                            .from(Deposits::Table, Deposits::AdminId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deposits-member_id-occurred_at")
                    .table(Deposits::Table)
                    .col(Deposits::MemberId)
                    .col(Deposits::OccurredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum WasteTypes {
    Table,
    Id,
    Name,
    PricePerKgMinor,
    PointsPerKg,
    Active,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WasteTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WasteTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WasteTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(WasteTypes::PricePerKgMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WasteTypes::PointsPerKg)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WasteTypes::Active).boolean().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WasteTypes::Table).to_owned())
            .await
    }
}

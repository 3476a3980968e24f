use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Catalog of reusable consumables. `seq` keeps creation order; `id` is the
/// public identifier.
#[derive(Iden)]
pub enum Consumables {
    Table,
    Seq,
    Id,
    Name,
    DefaultPriceMinor,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Consumables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consumables::Seq)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Consumables::Id)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Consumables::Name).string().not_null())
                    .col(
                        ColumnDef::new(Consumables::DefaultPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Consumables::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consumables::Table).to_owned())
            .await
    }
}

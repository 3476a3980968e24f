use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Pours. Consumable line items are embedded by value as a JSON array in
/// `consumable_items`; `consumables_cost_minor` is their stored sum.
#[derive(Iden)]
pub enum Pours {
    Table,
    Seq,
    Id,
    PourId,
    Date,
    AreaHundredths,
    PricePerSqftMinor,
    LaborCostMinor,
    EquipmentCostMinor,
    FuelCostMinor,
    RepairsCostMinor,
    MiscCostMinor,
    LunchCostMinor,
    ConsumableItems,
    ConsumablesCostMinor,
    CreatedAt,
    UpdatedAt,
}

fn minor(col: Pours) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pours::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pours::Seq)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pours::Id).string().not_null().unique_key())
                    .col(ColumnDef::new(Pours::PourId).string().not_null())
                    .col(ColumnDef::new(Pours::Date).date().not_null())
                    .col(minor(Pours::AreaHundredths))
                    .col(minor(Pours::PricePerSqftMinor))
                    .col(minor(Pours::LaborCostMinor))
                    .col(minor(Pours::EquipmentCostMinor))
                    .col(minor(Pours::FuelCostMinor))
                    .col(minor(Pours::RepairsCostMinor))
                    .col(minor(Pours::MiscCostMinor))
                    .col(minor(Pours::LunchCostMinor))
                    .col(
                        ColumnDef::new(Pours::ConsumableItems)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(minor(Pours::ConsumablesCostMinor))
                    .col(ColumnDef::new(Pours::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Pours::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pours-date")
                    .table(Pours::Table)
                    .col(Pours::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pours::Table).to_owned())
            .await
    }
}

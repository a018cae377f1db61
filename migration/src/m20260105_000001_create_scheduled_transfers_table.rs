use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(ScheduledTransfer::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ScheduledTransfer::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key()
                )
                .col(ColumnDef::new(ScheduledTransfer::TransferId).uuid().not_null().unique_key())
                .col(ColumnDef::new(ScheduledTransfer::OwnerAddress).string_len(64).not_null())
                .col(ColumnDef::new(ScheduledTransfer::RecipientAddress).string_len(64).not_null())
                .col(ColumnDef::new(ScheduledTransfer::RecipientName).string_len(64).not_null())
                .col(ColumnDef::new(ScheduledTransfer::Amount).string_len(50).not_null())
                .col(ColumnDef::new(ScheduledTransfer::IntervalSeconds).big_integer().not_null())
                .col(ColumnDef::new(ScheduledTransfer::Memo).text().null())
                .col(ColumnDef::new(ScheduledTransfer::IsActive).boolean().not_null().default(true))
                .col(
                    ColumnDef::new(ScheduledTransfer::LastExecutedAt)
                        .timestamp_with_time_zone()
                        .null()
                )
                .col(
                    ColumnDef::new(ScheduledTransfer::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(
                    ColumnDef::new(ScheduledTransfer::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        // Create indexes
        manager.create_index(
            Index::create()
                .name("idx_scheduled_transfers_owner")
                .table(ScheduledTransfer::Table)
                .col(ScheduledTransfer::OwnerAddress)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ScheduledTransfer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ScheduledTransfer {
    #[sea_orm(iden = "scheduled_transfers")]
    Table,
    Id,
    TransferId,
    OwnerAddress,
    RecipientAddress,
    RecipientName,
    Amount,
    IntervalSeconds,
    Memo,
    IsActive,
    LastExecutedAt,
    CreatedAt,
    UpdatedAt,
}

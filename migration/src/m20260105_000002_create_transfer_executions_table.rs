use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TransferExecution::Table)
                .if_not_exists()
                .col(ColumnDef::new(TransferExecution::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TransferExecution::TransferId).uuid().not_null())
                .col(ColumnDef::new(TransferExecution::OwnerAddress).string_len(64).not_null())
                .col(ColumnDef::new(TransferExecution::ExecutionIndex).big_integer().not_null())
                .col(ColumnDef::new(TransferExecution::AttemptNumber).big_integer().not_null())
                .col(ColumnDef::new(TransferExecution::Amount).string_len(50).not_null())
                .col(ColumnDef::new(TransferExecution::Fee).string_len(50).null())
                .col(ColumnDef::new(TransferExecution::TransactionId).string().null())
                .col(ColumnDef::new(TransferExecution::Status).string_len(20).not_null())
                .col(ColumnDef::new(TransferExecution::ErrorMessage).text().null())
                .col(
                    ColumnDef::new(TransferExecution::ExecutedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .name("idx_transfer_executions_transfer")
                .table(TransferExecution::Table)
                .col(TransferExecution::OwnerAddress)
                .col(TransferExecution::TransferId)
                .col(TransferExecution::AttemptNumber)
                .unique()
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TransferExecution::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TransferExecution {
    #[sea_orm(iden = "transfer_executions")]
    Table,
    Id,
    TransferId,
    OwnerAddress,
    ExecutionIndex,
    AttemptNumber,
    Amount,
    Fee,
    TransactionId,
    Status,
    ErrorMessage,
    ExecutedAt,
}

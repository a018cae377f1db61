use std::str::FromStr;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    prelude::Decimal,
};
use uuid::Uuid;

use super::entity::{ scheduled_transfer, transfer_execution };
use super::TransferStore;
use crate::enums::ExecutionStatus;
use crate::error::{ AppError, Result };
use crate::models::{ ExecutionRecord, ScheduledTransfer };

/// SeaORM-backed store (Postgres in production, SQLite for local runs).
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(
        &self,
        owner: &str,
        transfer_id: Uuid
    ) -> Result<Option<scheduled_transfer::Model>> {
        let model = scheduled_transfer::Entity
            ::find()
            .filter(scheduled_transfer::Column::OwnerAddress.eq(owner))
            .filter(scheduled_transfer::Column::TransferId.eq(transfer_id))
            .one(&self.db).await?;

        Ok(model)
    }
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e|
        AppError::Internal(format!("Stored amount '{}' is not a decimal: {}", value, e))
    )
}

fn to_transfer(model: scheduled_transfer::Model) -> Result<ScheduledTransfer> {
    Ok(ScheduledTransfer {
        transfer_id: model.transfer_id,
        owner_address: model.owner_address,
        recipient_address: model.recipient_address,
        recipient_name: model.recipient_name,
        amount: parse_decimal(&model.amount)?,
        interval_seconds: model.interval_seconds,
        created_at: model.created_at,
        last_execution: model.last_executed_at.into(),
        is_active: model.is_active,
        memo: model.memo,
    })
}

fn to_record(model: transfer_execution::Model) -> Result<ExecutionRecord> {
    Ok(ExecutionRecord {
        id: model.id,
        transfer_id: model.transfer_id,
        owner_address: model.owner_address,
        execution_index: model.execution_index,
        attempt_number: model.attempt_number,
        amount: parse_decimal(&model.amount)?,
        fee: model.fee.as_deref().map(parse_decimal).transpose()?,
        transaction_id: model.transaction_id,
        status: model.status.parse::<ExecutionStatus>()?,
        error_message: model.error_message,
        executed_at: model.executed_at,
    })
}

#[async_trait]
impl TransferStore for TransferRepository {
    async fn create(&self, transfer: ScheduledTransfer) -> Result<ScheduledTransfer> {
        let model = scheduled_transfer::ActiveModel {
            id: ActiveValue::NotSet,
            transfer_id: ActiveValue::Set(transfer.transfer_id),
            owner_address: ActiveValue::Set(transfer.owner_address),
            recipient_address: ActiveValue::Set(transfer.recipient_address),
            recipient_name: ActiveValue::Set(transfer.recipient_name),
            amount: ActiveValue::Set(transfer.amount.to_string()),
            interval_seconds: ActiveValue::Set(transfer.interval_seconds),
            memo: ActiveValue::Set(transfer.memo),
            is_active: ActiveValue::Set(transfer.is_active),
            last_executed_at: ActiveValue::Set(transfer.last_execution.at()),
            created_at: ActiveValue::Set(transfer.created_at),
            updated_at: ActiveValue::Set(transfer.created_at),
        };

        let model = model.insert(&self.db).await?;
        to_transfer(model)
    }

    async fn list(&self, owner: &str) -> Result<Vec<ScheduledTransfer>> {
        let models = scheduled_transfer::Entity
            ::find()
            .filter(scheduled_transfer::Column::OwnerAddress.eq(owner))
            .order_by_asc(scheduled_transfer::Column::Id)
            .all(&self.db).await?;

        models.into_iter().map(to_transfer).collect()
    }

    async fn get(&self, owner: &str, transfer_id: Uuid) -> Result<ScheduledTransfer> {
        self.find_model(owner, transfer_id).await?
            .ok_or(AppError::TransferNotFound)
            .and_then(to_transfer)
    }

    async fn record_execution(
        &self,
        owner: &str,
        transfer_id: Uuid,
        executed_at: DateTime<Utc>
    ) -> Result<ScheduledTransfer> {
        let model = self
            .find_model(owner, transfer_id).await?
            .ok_or(AppError::TransferNotFound)?;

        if executed_at < model.created_at {
            return Err(
                AppError::InvalidInput("Execution time precedes transfer creation".to_string())
            );
        }

        let mut active: scheduled_transfer::ActiveModel = model.into();
        active.last_executed_at = ActiveValue::Set(Some(executed_at));
        active.updated_at = ActiveValue::Set(Utc::now());
        let model = active.update(&self.db).await?;

        to_transfer(model)
    }

    async fn remove(&self, owner: &str, transfer_id: Uuid) -> Result<()> {
        // Conditional update so two racing cancels cannot both succeed
        let result = scheduled_transfer::Entity
            ::update_many()
            .col_expr(scheduled_transfer::Column::IsActive, Expr::value(false))
            .col_expr(scheduled_transfer::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(scheduled_transfer::Column::OwnerAddress.eq(owner))
            .filter(scheduled_transfer::Column::TransferId.eq(transfer_id))
            .filter(scheduled_transfer::Column::IsActive.eq(true))
            .exec(&self.db).await?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        match self.find_model(owner, transfer_id).await? {
            Some(_) => Err(AppError::TransferInactive),
            None => Err(AppError::TransferNotFound),
        }
    }

    async fn append_execution(&self, record: ExecutionRecord) -> Result<ExecutionRecord> {
        let model = transfer_execution::ActiveModel {
            id: ActiveValue::Set(record.id),
            transfer_id: ActiveValue::Set(record.transfer_id),
            owner_address: ActiveValue::Set(record.owner_address),
            execution_index: ActiveValue::Set(record.execution_index),
            attempt_number: ActiveValue::Set(record.attempt_number),
            amount: ActiveValue::Set(record.amount.to_string()),
            fee: ActiveValue::Set(record.fee.map(|fee| fee.to_string())),
            transaction_id: ActiveValue::Set(record.transaction_id),
            status: ActiveValue::Set(record.status.to_string()),
            error_message: ActiveValue::Set(record.error_message),
            executed_at: ActiveValue::Set(record.executed_at),
        };

        let model = model.insert(&self.db).await?;
        to_record(model)
    }

    async fn list_executions(&self, owner: &str, transfer_id: Uuid) -> Result<Vec<ExecutionRecord>> {
        let models = transfer_execution::Entity
            ::find()
            .filter(transfer_execution::Column::OwnerAddress.eq(owner))
            .filter(transfer_execution::Column::TransferId.eq(transfer_id))
            .order_by_desc(transfer_execution::Column::ExecutedAt)
            .order_by_desc(transfer_execution::Column::AttemptNumber)
            .all(&self.db).await?;

        models.into_iter().map(to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LastExecution;
    use crate::testing::{ sample_transfer, OWNER, RECIPIENT, t0 };
    use chrono::Duration;
    use migration::{ Migrator, MigratorTrait };
    use sea_orm::{ ConnectOptions, Database };

    async fn repository() -> TransferRepository {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        TransferRepository::new(db)
    }

    #[tokio::test]
    async fn test_create_and_list_in_insertion_order() {
        let repo = repository().await;
        let first = repo.create(sample_transfer(OWNER, 86_400)).await.unwrap();
        let second = repo.create(sample_transfer(OWNER, 3_600)).await.unwrap();
        repo.create(sample_transfer(RECIPIENT, 3_600)).await.unwrap();

        let listed = repo.list(OWNER).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].transfer_id, first.transfer_id);
        assert_eq!(listed[1].transfer_id, second.transfer_id);
        assert_eq!(listed[0], first);
    }

    #[tokio::test]
    async fn test_get_is_scoped_by_owner() {
        let repo = repository().await;
        let created = repo.create(sample_transfer(OWNER, 86_400)).await.unwrap();

        assert!(repo.get(OWNER, created.transfer_id).await.is_ok());
        assert!(
            matches!(
                repo.get(RECIPIENT, created.transfer_id).await,
                Err(AppError::TransferNotFound)
            )
        );
    }

    #[tokio::test]
    async fn test_record_execution_keeps_amount() {
        let repo = repository().await;
        let created = repo.create(sample_transfer(OWNER, 86_400)).await.unwrap();
        let executed_at = t0() + Duration::days(1);

        let updated = repo.record_execution(OWNER, created.transfer_id, executed_at).await.unwrap();
        assert_eq!(updated.last_execution, LastExecution::At(executed_at));
        assert_eq!(updated.amount, created.amount);

        let stored = repo.get(OWNER, created.transfer_id).await.unwrap();
        assert_eq!(stored.last_execution, LastExecution::At(executed_at));
    }

    #[tokio::test]
    async fn test_record_execution_rejects_time_before_creation() {
        let repo = repository().await;
        let created = repo.create(sample_transfer(OWNER, 86_400)).await.unwrap();

        let result = repo.record_execution(
            OWNER,
            created.transfer_id,
            t0() - Duration::seconds(1)
        ).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_remove_twice_is_an_error() {
        let repo = repository().await;
        let created = repo.create(sample_transfer(OWNER, 86_400)).await.unwrap();

        repo.remove(OWNER, created.transfer_id).await.unwrap();
        assert!(!repo.get(OWNER, created.transfer_id).await.unwrap().is_active);
        assert!(
            matches!(
                repo.remove(OWNER, created.transfer_id).await,
                Err(AppError::TransferInactive)
            )
        );
        assert!(
            matches!(repo.remove(OWNER, Uuid::new_v4()).await, Err(AppError::TransferNotFound))
        );
    }

    #[tokio::test]
    async fn test_execution_history_newest_first() {
        let repo = repository().await;
        let created = repo.create(sample_transfer(OWNER, 3_600)).await.unwrap();

        for index in 1..=2 {
            repo.append_execution(ExecutionRecord {
                id: Uuid::new_v4(),
                transfer_id: created.transfer_id,
                owner_address: OWNER.to_string(),
                execution_index: index,
                attempt_number: index,
                amount: created.amount,
                fee: Some(Decimal::new(5, 2)),
                transaction_id: Some(format!("tx_{}", index)),
                status: ExecutionStatus::Completed,
                error_message: None,
                executed_at: t0() + Duration::hours(index),
            }).await.unwrap();
        }

        let history = repo.list_executions(OWNER, created.transfer_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].execution_index, 2);
        assert_eq!(history[0].fee, Some(Decimal::new(5, 2)));
        assert!(repo.list_executions(RECIPIENT, created.transfer_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_ties_break_on_attempt_number() {
        let repo = repository().await;
        let created = repo.create(sample_transfer(OWNER, 3_600)).await.unwrap();
        let executed_at = t0() + Duration::hours(1);

        for (attempt_number, status) in [
            (1, ExecutionStatus::Failed),
            (2, ExecutionStatus::Completed),
        ] {
            repo.append_execution(ExecutionRecord {
                id: Uuid::new_v4(),
                transfer_id: created.transfer_id,
                owner_address: OWNER.to_string(),
                execution_index: 1,
                attempt_number,
                amount: created.amount,
                fee: None,
                transaction_id: None,
                status,
                error_message: None,
                executed_at,
            }).await.unwrap();
        }

        let history = repo.list_executions(OWNER, created.transfer_id).await.unwrap();
        assert_eq!(history[0].attempt_number, 2);
        assert_eq!(history[0].status, ExecutionStatus::Completed);
        assert_eq!(history[1].status, ExecutionStatus::Failed);
    }
}

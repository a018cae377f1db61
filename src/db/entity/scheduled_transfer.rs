use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scheduled_transfers")]
pub struct Model {
    /// Row sequence; preserves insertion order for listing.
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub transfer_id: Uuid,
    pub owner_address: String,
    pub recipient_address: String,
    pub recipient_name: String,
    pub amount: String, // decimal string, USDC
    pub interval_seconds: i64,
    pub memo: Option<String>,
    pub is_active: bool,
    pub last_executed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

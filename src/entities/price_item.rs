//! Price item entity - One row of the reference price database.
//!
//! Price items are a standalone lookup table; services never reference them by key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price reference database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_database")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reference code (e.g., "01.001")
    pub code: String,
    pub description: String,
    pub unit: String,
    /// Unit price
    pub price: f64,
    /// Where the price came from (e.g., "SINAPI")
    pub source: String,
    /// Date the price was collected
    pub reference_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

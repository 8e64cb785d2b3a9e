//! Service entity - A priced line item inside a chapter.
//!
//! `total_price` is computed once as `quantity * unit_price` when the row is created and
//! is never recomputed afterwards.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning chapter
    pub chapter_id: i64,
    /// Service code, often copied from a price reference
    pub code: String,
    /// What is being done or supplied
    pub description: String,
    /// Unit of measure label (e.g., "m²", "un")
    pub unit: String,
    /// Amount of units, never negative
    pub quantity: f64,
    /// Price of one unit, never negative
    pub unit_price: f64,
    /// Snapshot of `quantity * unit_price` at creation
    pub total_price: f64,
}

/// Defines relationships between Service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each service belongs to one chapter
    #[sea_orm(
        belongs_to = "super::chapter::Entity",
        from = "Column::ChapterId",
        to = "super::chapter::Column::Id"
    )]
    Chapter,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

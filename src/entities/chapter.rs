//! Chapter entity - A named grouping of services inside a budget.
//!
//! `sequence` is the 1-based display position and equals insertion order.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chapter database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
    /// Unique identifier for the chapter
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning budget
    pub budget_id: i64,
    /// User-defined grouping label (e.g., "01")
    pub code: String,
    /// Chapter title (e.g., "Fundações")
    pub title: String,
    /// Display order within the budget, starting at 1
    pub sequence: i32,
}

/// Defines relationships between Chapter and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each chapter belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
    /// One chapter has many services
    #[sea_orm(has_many = "super::service::Entity")]
    Services,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

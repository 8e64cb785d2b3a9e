//! Budget entity - A cost estimate document owned by one user.
//!
//! Each budget has a title, optional description, a BDI markup percentage and the
//! running total of all its services. Chapters hang off a budget.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable title (e.g., "Reforma apartamento 302")
    pub title: String,
    /// Free-form notes about the estimate
    pub description: Option<String>,
    /// Overhead-and-profit markup, as a percentage
    pub bdi: f64,
    /// Identity provider user id of the creator
    pub owner_id: String,
    /// When the budget was first saved
    pub created_at: DateTimeUtc,
    /// Sum of `total_price` across every service of the budget
    pub total_value: f64,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One budget has many chapters
    #[sea_orm(has_many = "super::chapter::Entity")]
    Chapters,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

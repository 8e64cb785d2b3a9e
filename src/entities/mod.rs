//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod chapter;
pub mod price_item;
pub mod service;
pub mod user;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use chapter::{Column as ChapterColumn, Entity as Chapter, Model as ChapterModel};
pub use price_item::{Column as PriceItemColumn, Entity as PriceItem, Model as PriceItemModel};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};

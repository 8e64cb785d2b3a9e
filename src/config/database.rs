//! Database configuration module for Costbook.
//!
//! This module handles the relational store connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions through `Schema::create_table_from_entity`,
//! so the database schema always matches the Rust structs without hand-written SQL.

use crate::entities::{Budget, Chapter, PriceItem, Service, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Fallback connection string when neither `DATABASE_URL` nor config.toml provide one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://costbook.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every table the application needs, skipping tables that already exist.
///
/// Parents are created before children so foreign keys resolve: users, budgets,
/// chapters, services, then the standalone price database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, User).await?;
    create_table(db, Budget).await?;
    create_table(db, Chapter).await?;
    create_table(db, Service).await?;
    create_table(db, PriceItem).await?;

    info!("Database tables ensured.");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

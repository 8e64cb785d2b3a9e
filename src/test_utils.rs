//! Shared test utilities for Costbook.
//!
//! In-memory `SQLite` stores and small fixtures with sensible defaults.

use crate::{
    config::{AuthSettings, PriceItemConfig},
    core::{budget, catalog, chapter, service::ServiceInput},
    entities,
    errors::Result,
    session::{DatabaseIdentityProvider, Session, SessionHandle, SessionState, UserIdentity},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Owner id of every fixture budget and of [`signed_in_state`].
pub const TEST_OWNER: &str = "test-owner";

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// [`setup_test_db`] behind an `Arc`, the way views and the app hold it.
pub async fn setup_shared_db() -> Result<Arc<DatabaseConnection>> {
    Ok(Arc::new(setup_test_db().await?))
}

/// Creates a budget owned by [`TEST_OWNER`] with no description and a zero BDI.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::budget::Model> {
    budget::create_budget(db, TEST_OWNER, title, None, 0.0).await
}

/// Fresh store with one budget holding chapter `01` at sequence 1.
pub async fn setup_with_chapter() -> Result<(
    DatabaseConnection,
    entities::budget::Model,
    entities::chapter::Model,
)> {
    let db = setup_test_db().await?;
    let budget = create_test_budget(&db, "Test Budget").await?;
    let chapter = chapter::create_chapter(&db, budget.id, "01", "Test Chapter", 1).await?;
    Ok((db, budget, chapter))
}

/// A service line with fixed code and unit.
pub fn service_input(description: &str, quantity: f64, unit_price: f64) -> ServiceInput {
    ServiceInput {
        code: "SRV-01".to_string(),
        description: description.to_string(),
        unit: "m2".to_string(),
        quantity,
        unit_price,
    }
}

/// Inserts two reference prices: `01.001 Concreto` and `02.010 Tijolo`.
pub async fn seed_test_catalog(db: &DatabaseConnection) -> Result<usize> {
    let reference_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
    let items = [("01.001", "Concreto", "m3", 512.4), ("02.010", "Tijolo", "un", 1.35)]
        .map(|(code, description, unit, price)| PriceItemConfig {
            code: code.to_string(),
            description: description.to_string(),
            unit: unit.to_string(),
            price,
            source: "SINAPI".to_string(),
            reference_date,
        });
    catalog::seed_price_catalog(db, &items).await
}

/// Identity provider over its own in-memory store, with cheap hashing.
pub async fn setup_test_provider() -> Result<DatabaseIdentityProvider> {
    let db = setup_shared_db().await?;
    let settings = AuthSettings {
        pbkdf2_iterations: 1_000,
        ..AuthSettings::default()
    };
    Ok(DatabaseIdentityProvider::new(db, settings))
}

/// A finished session load for [`TEST_OWNER`].
pub fn signed_in_state() -> SessionState {
    signed_in_state_for(TEST_OWNER)
}

/// A finished session load for the user `id`.
pub fn signed_in_state_for(id: &str) -> SessionState {
    SessionState {
        session: Some(Session {
            access_token: format!("token-{id}"),
            user: UserIdentity {
                id: id.to_string(),
                email: format!("{id}@example.com"),
            },
        }),
        loading: false,
    }
}

/// A fixed handle signed in as [`TEST_OWNER`].
pub fn signed_in_handle() -> SessionHandle {
    SessionHandle::fixed(signed_in_state())
}

//! Service business logic - Creation and lookup of priced line items.
//!
//! A service's `total_price` is `quantity * unit_price`, computed here once and stored.
//! The owning budget's `total_value` is bumped in the same transaction as the insert.

use crate::{
    core::{budget::add_to_total_value, validation::require_text},
    entities::{Service, chapter, service},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, instrument};

/// Already-parsed values for a new service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInput {
    /// Service code
    pub code: String,
    /// What is being done or supplied
    pub description: String,
    /// Unit of measure label
    pub unit: String,
    /// Amount of units
    pub quantity: f64,
    /// Price of one unit
    pub unit_price: f64,
}

impl ServiceInput {
    /// `quantity * unit_price`, without rounding.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Inserts a service into `chapter` and adds its total to the chapter's budget.
///
/// Both writes commit together; on failure neither is visible.
#[instrument(skip(db, chapter), fields(chapter_id = chapter.id))]
pub async fn create_service(
    db: &DatabaseConnection,
    chapter: &chapter::Model,
    input: ServiceInput,
) -> Result<service::Model> {
    let code = require_text("code", &input.code)?;
    let description = require_text("description", &input.description)?;
    let unit = require_text("unit", &input.unit)?;

    if !input.quantity.is_finite() || input.quantity < 0.0 {
        return Err(Error::validation("quantity", "must be a non-negative number"));
    }
    if !input.unit_price.is_finite() || input.unit_price < 0.0 {
        return Err(Error::validation(
            "unit_price",
            "must be a non-negative number",
        ));
    }

    let total_price = input.total_price();
    if !total_price.is_finite() {
        return Err(Error::validation(
            "total_price",
            "quantity times unit price is too large",
        ));
    }

    let service = service::ActiveModel {
        chapter_id: Set(chapter.id),
        code: Set(code.to_string()),
        description: Set(description.to_string()),
        unit: Set(unit.to_string()),
        quantity: Set(input.quantity),
        unit_price: Set(input.unit_price),
        total_price: Set(total_price),
        ..Default::default()
    };

    let txn = db.begin().await?;
    let created = service.insert(&txn).await?;
    add_to_total_value(&txn, chapter.budget_id, total_price).await?;
    txn.commit().await?;

    debug!(service_id = created.id, total_price, "Service created");
    Ok(created)
}

/// Retrieves the services of the given chapters in insertion order.
pub async fn get_services_for_chapters(
    db: &DatabaseConnection,
    chapter_ids: &[i64],
) -> Result<Vec<service::Model>> {
    if chapter_ids.is_empty() {
        return Ok(Vec::new());
    }

    Service::find()
        .filter(service::Column::ChapterId.is_in(chapter_ids.iter().copied()))
        .order_by_asc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

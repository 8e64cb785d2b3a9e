//! Budget business logic - Handles all budget-related store operations.
//!
//! Provides functions for creating, updating and listing budgets and for keeping the
//! stored `total_value` in step with the services added to a budget. Budgets are always
//! scoped to their owner: a user never sees another user's rows.

use crate::{
    entities::{Budget, budget},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Inserts a new budget row owned by `owner_id`.
///
/// The title must not be blank; it and the description are stored trimmed. A blank
/// description is stored as `NULL`. The total starts at zero.
#[instrument(skip(db, description))]
pub async fn create_budget(
    db: &DatabaseConnection,
    owner_id: &str,
    title: &str,
    description: Option<&str>,
    bdi: f64,
) -> Result<budget::Model> {
    let title = crate::core::validation::require_text("title", title)?;

    let budget = budget::ActiveModel {
        title: Set(title.to_string()),
        description: Set(normalize_description(description)),
        bdi: Set(bdi),
        owner_id: Set(owner_id.to_string()),
        created_at: Set(Utc::now()),
        total_value: Set(0.0),
        ..Default::default()
    };

    let created = budget.insert(db).await?;
    debug!(budget_id = created.id, "Budget created");
    Ok(created)
}

/// Rewrites title, description and BDI of an existing budget in place.
///
/// Only the owner may update a budget; anyone else gets [`Error::BudgetNotFound`].
#[instrument(skip(db, description))]
pub async fn update_budget(
    db: &DatabaseConnection,
    budget_id: i64,
    owner_id: &str,
    title: &str,
    description: Option<&str>,
    bdi: f64,
) -> Result<budget::Model> {
    let title = crate::core::validation::require_text("title", title)?;

    let existing = get_budget_for_owner(db, budget_id, owner_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    let mut active: budget::ActiveModel = existing.into();
    active.title = Set(title.to_string());
    active.description = Set(normalize_description(description));
    active.bdi = Set(bdi);

    active.update(db).await.map_err(Into::into)
}

/// Finds a budget by id, returning None when it does not exist or belongs to someone else.
pub async fn get_budget_for_owner(
    db: &DatabaseConnection,
    budget_id: i64,
    owner_id: &str,
) -> Result<Option<budget::Model>> {
    Budget::find_by_id(budget_id)
        .filter(budget::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the owner's budgets, newest first. Backs the dashboard.
pub async fn list_recent_budgets(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<budget::Model>> {
    Budget::find()
        .filter(budget::Column::OwnerId.eq(owner_id))
        .order_by_desc(budget::Column::CreatedAt)
        .order_by_desc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds `amount_delta` to a budget's `total_value` with a single UPDATE statement:
/// `UPDATE budgets SET total_value = total_value + amount WHERE id = ?`
///
/// Accepts a transaction so the bump can commit together with the service insert.
pub async fn add_to_total_value<C>(db: &C, budget_id: i64, amount_delta: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Budget::update_many()
        .col_expr(
            budget::Column::TotalValue,
            Expr::col(budget::Column::TotalValue).add(amount_delta),
        )
        .filter(budget::Column::Id.eq(budget_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::BudgetNotFound { id: budget_id });
    }
    Ok(())
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

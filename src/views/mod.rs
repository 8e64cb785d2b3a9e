//! View layer - the state behind each screen.
//!
//! Each view holds only what its screen renders plus an alert banner. Failures are caught
//! here: the error's message becomes the alert, which stays until the next attempt.

/// Budget editor: the budget → chapters → services tree
pub mod budget_editor;
/// Dashboard: the user's budgets, newest first
pub mod dashboard;
/// Price database browser and importer
pub mod price_database;
/// Budget report rollup
pub mod reports;

pub use budget_editor::{BudgetEditor, BudgetForm, ChapterNode, EditorState, NewService};
pub use dashboard::DashboardView;
pub use price_database::PriceDatabaseView;
pub use reports::ReportsView;

use crate::errors::Result;
use tracing::warn;

/// Stores a failed result's message in `alert`, passing the result through.
pub(crate) fn record_alert<T>(alert: &mut Option<String>, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!("{e}");
        *alert = Some(e.to_string());
    }
    result
}

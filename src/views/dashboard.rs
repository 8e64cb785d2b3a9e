//! Dashboard view - lists the signed-in user's budgets.

use crate::{
    core::budget::list_recent_budgets, entities::budget, errors::Result, session::SessionHandle,
    views::record_alert,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// State behind the `/` screen.
#[derive(Debug)]
pub struct DashboardView {
    db: Arc<DatabaseConnection>,
    session: SessionHandle,
    budgets: Vec<budget::Model>,
    alert: Option<String>,
}

impl DashboardView {
    /// An empty dashboard; call [`DashboardView::load`] to fill it.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, session: SessionHandle) -> Self {
        Self {
            db,
            session,
            budgets: Vec::new(),
            alert: None,
        }
    }

    /// Reloads the budget list, newest first.
    pub async fn load(&mut self) -> Result<usize> {
        self.alert = None;
        let result = match self.session.require_user() {
            Ok(user) => list_recent_budgets(&self.db, &user.id).await,
            Err(e) => Err(e),
        };

        let budgets = record_alert(&mut self.alert, result)?;
        self.budgets = budgets;
        Ok(self.budgets.len())
    }

    /// The signed-in user's budgets from the last load.
    #[must_use]
    pub fn budgets(&self) -> &[budget::Model] {
        &self.budgets
    }

    /// Message from the last failed load
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }
}

//! Reports view - budget summaries with chapter and service counts.

use crate::{
    core::report::{BudgetSummary, load_summaries},
    errors::Result,
    session::SessionHandle,
    views::record_alert,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// State behind the `/reports` screen.
#[derive(Debug)]
pub struct ReportsView {
    db: Arc<DatabaseConnection>,
    session: SessionHandle,
    summaries: Vec<BudgetSummary>,
    alert: Option<String>,
}

impl ReportsView {
    /// An empty report; call [`ReportsView::load_summaries`] to fill it.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, session: SessionHandle) -> Self {
        Self {
            db,
            session,
            summaries: Vec::new(),
            alert: None,
        }
    }

    /// Rebuilds the summaries from the store. Read-only.
    pub async fn load_summaries(&mut self) -> Result<&[BudgetSummary]> {
        self.alert = None;
        let result = match self.session.require_user() {
            Ok(user) => load_summaries(&self.db, &user.id).await,
            Err(e) => Err(e),
        };

        self.summaries = record_alert(&mut self.alert, result)?;
        Ok(&self.summaries)
    }

    /// One summary per budget, newest first.
    #[must_use]
    pub fn summaries(&self) -> &[BudgetSummary] {
        &self.summaries
    }

    /// Message from the last failed load
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }
}

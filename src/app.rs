//! Application context - the store connection plus the session gate.
//!
//! Navigation asks the gate first. Only a route the gate lets through builds its view,
//! so a redirected request never touches the store.

use crate::{
    errors::Result,
    routes::{Access, Route},
    session::{IdentityProvider, SessionGate, SessionHandle},
    views::{BudgetEditor, DashboardView, PriceDatabaseView, ReportsView},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{debug, instrument};

/// What a navigation request produced.
#[derive(Debug)]
pub enum Screen {
    /// Session still loading; render nothing
    Pending,
    /// Navigate to this route instead
    Redirect(Route),
    /// Unknown path
    NotFound,
    /// The sign-in form
    Login,
    /// The budget list, loaded
    Dashboard(DashboardView),
    /// A new or opened budget
    BudgetEditor(Box<BudgetEditor>),
    /// The whole price catalog, loaded
    PriceDatabase(PriceDatabaseView),
    /// Budget summaries, loaded
    Reports(ReportsView),
}

/// Shared data available to every view.
#[derive(Debug)]
pub struct App<P> {
    /// Relational store for all view reads and writes
    pub database: Arc<DatabaseConnection>,
    /// Session gate owning the current user
    pub gate: SessionGate<P>,
}

impl<P: IdentityProvider> App<P> {
    /// Creates the application context. Call `gate.initialize()` before navigating.
    #[must_use]
    pub const fn new(database: Arc<DatabaseConnection>, gate: SessionGate<P>) -> Self {
        Self { database, gate }
    }

    /// A read-only handle on the current session.
    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.gate.handle()
    }

    /// Resolves `path` to a screen, loading the view's data when access is granted.
    ///
    /// List views keep load failures in their alert banner; opening a budget that does
    /// not exist is returned as an error.
    #[instrument(skip(self))]
    pub async fn navigate(&self, path: &str) -> Result<Screen> {
        let Some(route) = Route::parse(path) else {
            return Ok(Screen::NotFound);
        };

        let session = self.session();
        match session.access(&route) {
            Access::Pending => Ok(Screen::Pending),
            Access::Redirect(target) => {
                debug!(%route, %target, "Redirecting");
                Ok(Screen::Redirect(target))
            }
            Access::Render => self.render(route, session).await,
        }
    }

    async fn render(&self, route: Route, session: SessionHandle) -> Result<Screen> {
        let db = Arc::clone(&self.database);
        let screen = match route {
            Route::Login => Screen::Login,
            Route::Dashboard => {
                let mut view = DashboardView::new(db, session);
                view.load().await.ok();
                Screen::Dashboard(view)
            }
            Route::BudgetEditor { budget_id: None } => {
                Screen::BudgetEditor(Box::new(BudgetEditor::new(db, session)))
            }
            Route::BudgetEditor {
                budget_id: Some(id),
            } => Screen::BudgetEditor(Box::new(BudgetEditor::open(db, session, id).await?)),
            Route::PriceDatabase => {
                let mut view = PriceDatabaseView::new(db);
                view.search("").await.ok();
                Screen::PriceDatabase(view)
            }
            Route::Reports => {
                let mut view = ReportsView::new(db, session);
                view.load_summaries().await.ok();
                Screen::Reports(view)
            }
        };
        Ok(screen)
    }
}

//! Price database view - search and CSV import over the reference price table.
//!
//! The view keeps the last result list it received. Searches are not coalesced: whichever
//! call finishes last decides what is shown.

use crate::{
    core::catalog::{import_price_list, search_price_items},
    entities::price_item,
    errors::Result,
    views::record_alert,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::path::Path;
use tracing::info;

/// State behind the `/price-database` screen.
#[derive(Debug)]
pub struct PriceDatabaseView {
    db: Arc<DatabaseConnection>,
    search_term: String,
    items: Vec<price_item::Model>,
    alert: Option<String>,
    notice: Option<String>,
}

impl PriceDatabaseView {
    /// An empty browser; call [`PriceDatabaseView::search`] to fill it.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            search_term: String::new(),
            items: Vec::new(),
            alert: None,
            notice: None,
        }
    }

    /// Replaces the shown items with those matching `term`. A blank term shows all.
    pub async fn search(&mut self, term: &str) -> Result<usize> {
        self.alert = None;
        self.search_term = term.to_string();

        let result = search_price_items(&self.db, term).await;
        self.items = record_alert(&mut self.alert, result)?;
        Ok(self.items.len())
    }

    /// Imports a price list given as text, then shows the full catalog.
    pub async fn import_from_delimited_text(&mut self, contents: &str) -> Result<usize> {
        self.alert = None;
        self.notice = None;

        let result = import_price_list(&self.db, contents).await;
        let imported = record_alert(&mut self.alert, result)?;

        self.notice = Some(format!("Imported {imported} price items."));
        self.search("").await?;
        Ok(imported)
    }

    /// Reads a price list file and imports it.
    pub async fn import_file(&mut self, path: &Path) -> Result<usize> {
        self.alert = None;
        self.notice = None;

        info!("Importing price list from {}", path.display());
        let read: Result<String> = tokio::fs::read_to_string(path).await.map_err(Into::into);
        let contents = record_alert(&mut self.alert, read)?;
        self.import_from_delimited_text(&contents).await
    }

    /// Items matching the current search term.
    #[must_use]
    pub fn items(&self) -> &[price_item::Model] {
        &self.items
    }

    /// The term the shown items were searched with
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Message from the last failed search or import
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Success message from the last import
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

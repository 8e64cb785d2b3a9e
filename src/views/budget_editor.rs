//! Budget editor - the in-memory budget → chapters → services tree.
//!
//! Every mutation is written to the store first and applied to memory only once the
//! store confirms it, so a failed write leaves the tree exactly as it was. Writes are
//! independent: a chapter whose first service failed to save simply has no services.
//!
//! The editor starts in [`EditorState::Draft`]. Adding a chapter to a draft first saves
//! the budget from the form, moving the editor to [`EditorState::Persisted`].

use crate::{
    core::{
        budget, chapter,
        report::apply_bdi,
        service::{self, ServiceInput},
        validation::{parse_non_negative, require_text},
    },
    entities::{budget as budget_entity, chapter as chapter_entity, service as service_entity},
    errors::{Error, Result},
    session::SessionHandle,
    views::record_alert,
};
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, instrument};

/// The budget header form, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetForm {
    /// Budget title; must not be blank
    pub title: String,
    /// Free text; blank means none
    pub description: String,
    /// BDI percentage text
    pub bdi: String,
}

impl Default for BudgetForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            bdi: "0".to_string(),
        }
    }
}

/// The add-service form, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewService {
    /// Service code, usually a catalog code
    pub code: String,
    /// What the service is; must not be blank
    pub description: String,
    /// Unit of measure
    pub unit: String,
    /// Quantity text
    pub quantity: String,
    /// Unit price text
    pub unit_price: String,
}

impl Default for NewService {
    fn default() -> Self {
        Self {
            code: String::new(),
            description: String::new(),
            unit: String::new(),
            quantity: "0".to_string(),
            unit_price: "0".to_string(),
        }
    }
}

/// A chapter with the services saved under it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterNode {
    /// The chapter row
    pub chapter: chapter_entity::Model,
    /// Its services, in insertion order
    pub services: Vec<service_entity::Model>,
}

impl ChapterNode {
    /// Sum of the chapter's service totals.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.services.iter().map(|s| s.total_price).sum()
    }
}

/// Whether the budget exists in the store yet.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    /// Nothing saved; only the form exists
    Draft,
    /// The active budget row
    Persisted(budget_entity::Model),
}

/// State behind the `/budget-editor` screens.
#[derive(Debug)]
pub struct BudgetEditor {
    db: Arc<DatabaseConnection>,
    session: SessionHandle,
    /// Header form contents
    pub form: BudgetForm,
    state: EditorState,
    chapters: Vec<ChapterNode>,
    alert: Option<String>,
}

impl BudgetEditor {
    /// An editor for a new, unsaved budget.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, session: SessionHandle) -> Self {
        Self {
            db,
            session,
            form: BudgetForm::default(),
            state: EditorState::Draft,
            chapters: Vec::new(),
            alert: None,
        }
    }

    /// An editor over an existing budget owned by the signed-in user, with its chapters
    /// in sequence order and services in insertion order.
    #[instrument(skip(db, session))]
    pub async fn open(
        db: Arc<DatabaseConnection>,
        session: SessionHandle,
        budget_id: i64,
    ) -> Result<Self> {
        let user = session.require_user()?;
        let budget = budget::get_budget_for_owner(&db, budget_id, &user.id)
            .await?
            .ok_or(Error::BudgetNotFound { id: budget_id })?;

        let chapters = chapter::get_chapters_for_budget(&db, budget.id).await?;
        let chapter_ids: Vec<i64> = chapters.iter().map(|c| c.id).collect();
        let mut services_by_chapter: HashMap<i64, Vec<service_entity::Model>> = HashMap::new();
        for service in service::get_services_for_chapters(&db, &chapter_ids).await? {
            services_by_chapter
                .entry(service.chapter_id)
                .or_default()
                .push(service);
        }

        let chapters = chapters
            .into_iter()
            .map(|chapter| ChapterNode {
                services: services_by_chapter.remove(&chapter.id).unwrap_or_default(),
                chapter,
            })
            .collect();

        let form = BudgetForm {
            title: budget.title.clone(),
            description: budget.description.clone().unwrap_or_default(),
            bdi: budget.bdi.to_string(),
        };

        debug!(budget_id, "Budget opened");
        Ok(Self {
            db,
            session,
            form,
            state: EditorState::Persisted(budget),
            chapters,
            alert: None,
        })
    }

    /// Inserts a new budget from the form and makes it the active budget.
    ///
    /// This always creates a new row, even when a budget is already active; use
    /// [`BudgetEditor::update_budget`] to change the active one. A new budget has no
    /// chapters, so the tree is cleared.
    pub async fn save_budget(&mut self) -> Result<budget_entity::Model> {
        self.alert = None;
        let result = self.create_from_form().await;
        record_alert(&mut self.alert, result)
    }

    /// Writes the form's title, description and BDI to the active budget.
    pub async fn update_budget(&mut self) -> Result<budget_entity::Model> {
        self.alert = None;
        let result = self.update_from_form().await;
        record_alert(&mut self.alert, result)
    }

    /// Appends a chapter at the next sequence number, saving a draft budget first.
    pub async fn add_chapter(&mut self, code: &str, title: &str) -> Result<chapter_entity::Model> {
        self.alert = None;
        let result = self.insert_chapter(code, title).await;
        record_alert(&mut self.alert, result)
    }

    /// Saves a service under `chapter_id` and appends it to that chapter.
    pub async fn add_service(
        &mut self,
        chapter_id: i64,
        new_service: &NewService,
    ) -> Result<service_entity::Model> {
        self.alert = None;
        let result = self.insert_service(chapter_id, new_service).await;
        record_alert(&mut self.alert, result)
    }

    /// Whether a budget is active yet.
    #[must_use]
    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    /// Id of the active budget, if saved.
    #[must_use]
    pub const fn budget_id(&self) -> Option<i64> {
        match &self.state {
            EditorState::Draft => None,
            EditorState::Persisted(budget) => Some(budget.id),
        }
    }

    /// The chapter tree of the active budget, in sequence order.
    #[must_use]
    pub fn chapters(&self) -> &[ChapterNode] {
        &self.chapters
    }

    /// Message from the last failed action, if the latest attempt failed.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Sum of every service total in the tree.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.chapters.iter().map(ChapterNode::total).sum()
    }

    /// [`BudgetEditor::total`] with the active budget's BDI applied.
    #[must_use]
    pub fn total_with_bdi(&self) -> f64 {
        match &self.state {
            EditorState::Draft => self.total(),
            EditorState::Persisted(budget) => apply_bdi(self.total(), budget.bdi),
        }
    }

    #[instrument(skip(self))]
    async fn create_from_form(&mut self) -> Result<budget_entity::Model> {
        let user = self.session.require_user()?;
        let title = require_text("title", &self.form.title)?;
        let bdi = parse_non_negative("bdi", &self.form.bdi)?;

        let created = budget::create_budget(
            &self.db,
            &user.id,
            title,
            Some(&self.form.description),
            bdi,
        )
        .await?;

        info!(budget_id = created.id, "Budget saved");
        self.state = EditorState::Persisted(created.clone());
        self.chapters.clear();
        Ok(created)
    }

    async fn update_from_form(&mut self) -> Result<budget_entity::Model> {
        let user = self.session.require_user()?;
        let Some(budget_id) = self.budget_id() else {
            return Err(Error::validation(
                "budget",
                "save the budget before updating it",
            ));
        };
        let title = require_text("title", &self.form.title)?;
        let bdi = parse_non_negative("bdi", &self.form.bdi)?;

        let updated = budget::update_budget(
            &self.db,
            budget_id,
            &user.id,
            title,
            Some(&self.form.description),
            bdi,
        )
        .await?;

        self.state = EditorState::Persisted(updated.clone());
        Ok(updated)
    }

    async fn ensure_persisted(&mut self) -> Result<i64> {
        if let Some(budget_id) = self.budget_id() {
            return Ok(budget_id);
        }

        debug!("Draft budget; saving before adding a chapter");
        Ok(self.create_from_form().await?.id)
    }

    async fn insert_chapter(&mut self, code: &str, title: &str) -> Result<chapter_entity::Model> {
        let code = require_text("code", code)?;
        let title = require_text("title", title)?;
        let budget_id = self.ensure_persisted().await?;

        let sequence = i32::try_from(self.chapters.len() + 1)
            .map_err(|_| Error::validation("chapter", "too many chapters"))?;
        let created = chapter::create_chapter(&self.db, budget_id, code, title, sequence).await?;

        self.chapters.push(ChapterNode {
            chapter: created.clone(),
            services: Vec::new(),
        });
        Ok(created)
    }

    async fn insert_service(
        &mut self,
        chapter_id: i64,
        new_service: &NewService,
    ) -> Result<service_entity::Model> {
        let index = self
            .chapters
            .iter()
            .position(|node| node.chapter.id == chapter_id)
            .ok_or(Error::ChapterNotFound { id: chapter_id })?;

        let input = ServiceInput {
            code: require_text("code", &new_service.code)?.to_string(),
            description: require_text("description", &new_service.description)?.to_string(),
            unit: require_text("unit", &new_service.unit)?.to_string(),
            quantity: parse_non_negative("quantity", &new_service.quantity)?,
            unit_price: parse_non_negative("unit_price", &new_service.unit_price)?,
        };

        let created =
            service::create_service(&self.db, &self.chapters[index].chapter, input).await?;

        if let EditorState::Persisted(budget) = &mut self.state {
            budget.total_value += created.total_price;
        }
        self.chapters[index].services.push(created.clone());
        Ok(created)
    }
}

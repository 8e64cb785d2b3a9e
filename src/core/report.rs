//! Report generation business logic.
//!
//! This module rolls budgets up into summaries (chapter and service counts) and provides
//! the display helpers used by the report and dashboard listings. All functions are
//! framework-agnostic and return structured data that the view layer formats.

use crate::{
    core::budget::list_recent_budgets,
    entities::{Chapter, Service, budget, chapter, service},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QuerySelect, prelude::*, sea_query::Expr};
use std::collections::HashMap;
use tracing::instrument;

/// One row of the budget report.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    /// The budget being summarised
    pub budget: budget::Model,
    /// Number of chapters in the budget
    pub chapter_count: u64,
    /// Number of services across all of the budget's chapters
    pub service_count: u64,
}

impl BudgetSummary {
    /// Budget total with the BDI markup applied: `total * (1 + bdi / 100)`.
    #[must_use]
    pub fn total_with_bdi(&self) -> f64 {
        apply_bdi(self.budget.total_value, self.budget.bdi)
    }
}

/// Loads a summary for every budget the owner has, newest first.
///
/// Chapters are counted per budget and service counts are summed across a budget's
/// chapters. Budgets without chapters report zero for both.
#[instrument(skip(db))]
pub async fn load_summaries(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<BudgetSummary>> {
    let budgets = list_recent_budgets(db, owner_id).await?;
    if budgets.is_empty() {
        return Ok(Vec::new());
    }

    let budget_ids: Vec<i64> = budgets.iter().map(|b| b.id).collect();
    let chapter_rows: Vec<(i64, i64)> = Chapter::find()
        .select_only()
        .column(chapter::Column::Id)
        .column(chapter::Column::BudgetId)
        .filter(chapter::Column::BudgetId.is_in(budget_ids))
        .into_tuple()
        .all(db)
        .await?;

    let chapter_ids: Vec<i64> = chapter_rows.iter().map(|(id, _)| *id).collect();
    let services_per_chapter: HashMap<i64, i64> = if chapter_ids.is_empty() {
        HashMap::new()
    } else {
        Service::find()
            .select_only()
            .column(service::Column::ChapterId)
            .column_as(Expr::col(service::Column::Id).count(), "service_count")
            .filter(service::Column::ChapterId.is_in(chapter_ids))
            .group_by(service::Column::ChapterId)
            .into_tuple::<(i64, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect()
    };

    let mut counts: HashMap<i64, (u64, u64)> = HashMap::new();
    for (chapter_id, budget_id) in chapter_rows {
        let services = services_per_chapter.get(&chapter_id).copied().unwrap_or(0);
        let entry = counts.entry(budget_id).or_default();
        entry.0 += 1;
        entry.1 += u64::try_from(services).unwrap_or(0);
    }

    Ok(budgets
        .into_iter()
        .map(|budget| {
            let (chapter_count, service_count) = counts.get(&budget.id).copied().unwrap_or_default();
            BudgetSummary {
                budget,
                chapter_count,
                service_count,
            }
        })
        .collect())
}

/// Applies a BDI percentage to a total.
#[must_use]
pub fn apply_bdi(total: f64, bdi_percent: f64) -> f64 {
    total * (1.0 + bdi_percent / 100.0)
}

/// Formats a value as Brazilian reais, e.g. `R$ 1.234,56` or `-R$ 0,50`.
///
/// Rounds to the nearest cent.
#[must_use]
pub fn format_brl(value: f64) -> String {
    // Cast safety: only display-sized budgets reach here; rounding to cents is intended.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents = (value.abs() * 100.0).round() as u64;
    let reais = (cents / 100).to_string();
    let centavos = cents % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (index, digit) in reais.chars().enumerate() {
        if index > 0 && (reais.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{centavos:02}")
}

/// Formats a timestamp as a `dd/mm/yyyy` date.
#[must_use]
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y").to_string()
}

/// Generates a summary line for a report row.
///
/// Format: "Reforma | 3 capítulos | 12 serviços | R$ 10.000,00 (BDI 25.0%)"
#[must_use]
pub fn format_summary_line(summary: &BudgetSummary) -> String {
    format!(
        "{} | {} capítulos | {} serviços | {} (BDI {:.1}%)",
        summary.budget.title,
        summary.chapter_count,
        summary.service_count,
        format_brl(summary.budget.total_value),
        summary.budget.bdi
    )
}

//! Chapter business logic - Creation and lookup of chapters within a budget.

use crate::{
    core::validation::require_text,
    entities::{Chapter, chapter},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::instrument;

/// Inserts a chapter under `budget_id` at position `sequence`.
///
/// Code and title must not be blank. The budget must already exist; the foreign key
/// rejects orphans.
#[instrument(skip(db))]
pub async fn create_chapter(
    db: &DatabaseConnection,
    budget_id: i64,
    code: &str,
    title: &str,
    sequence: i32,
) -> Result<chapter::Model> {
    let code = require_text("code", code)?;
    let title = require_text("title", title)?;

    let chapter = chapter::ActiveModel {
        budget_id: Set(budget_id),
        code: Set(code.to_string()),
        title: Set(title.to_string()),
        sequence: Set(sequence),
        ..Default::default()
    };

    chapter.insert(db).await.map_err(Into::into)
}

/// Retrieves the chapters of a budget in display order.
pub async fn get_chapters_for_budget(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Vec<chapter::Model>> {
    Chapter::find()
        .filter(chapter::Column::BudgetId.eq(budget_id))
        .order_by_asc(chapter::Column::Sequence)
        .order_by_asc(chapter::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_chapter_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let budget = create_test_budget(&db, "Obra").await?;

        let chapter = create_chapter(&db, budget.id, " 01 ", "Fundações", 1).await?;
        assert_eq!(chapter.budget_id, budget.id);
        assert_eq!(chapter.code, "01");
        assert_eq!(chapter.title, "Fundações");
        assert_eq!(chapter.sequence, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_chapter_requires_code_and_title() -> Result<()> {
        let db = setup_test_db().await?;
        let budget = create_test_budget(&db, "Obra").await?;

        let no_code = create_chapter(&db, budget.id, "", "Fundações", 1).await;
        assert!(matches!(no_code, Err(Error::Validation { field, .. }) if field == "code"));

        let no_title = create_chapter(&db, budget.id, "01", " ", 1).await;
        assert!(matches!(no_title, Err(Error::Validation { field, .. }) if field == "title"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_chapter_without_budget_fails() -> Result<()> {
        let db = setup_test_db().await?;

        let orphan = create_chapter(&db, 4242, "01", "Órfão", 1).await;
        assert!(matches!(orphan, Err(Error::Database(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_chapters_for_budget_in_sequence_order() -> Result<()> {
        let db = setup_test_db().await?;
        let budget = create_test_budget(&db, "Obra").await?;
        let other = create_test_budget(&db, "Outra").await?;

        create_chapter(&db, budget.id, "02", "Estrutura", 2).await?;
        create_chapter(&db, budget.id, "01", "Fundações", 1).await?;
        create_chapter(&db, other.id, "01", "Outra obra", 1).await?;

        let chapters = get_chapters_for_budget(&db, budget.id).await?;
        let sequences: Vec<i32> = chapters.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(chapters[0].title, "Fundações");
        Ok(())
    }
}

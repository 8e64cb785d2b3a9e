//! Price catalog business logic - Search and bulk import of reference prices.
//!
//! Search is a Unicode case-insensitive substring match on code or description, ordered
//! by code. Imports read comma-separated text with a header row and six positional columns:
//! `code,description,unit,price,source,reference_date`. Fields may be quoted to carry
//! embedded commas. Every row is validated before anything is written, and all rows are
//! inserted in one transaction.

use crate::{
    config::PriceItemConfig,
    core::validation::parse_non_negative,
    entities::{PriceItem, price_item},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Number of positional columns in an import file.
pub const IMPORT_COLUMNS: usize = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One validated row of a price list, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    /// Catalog code, e.g. `01.001`
    pub code: String,
    /// Item description
    pub description: String,
    /// Unit of measure
    pub unit: String,
    /// Unit price in BRL
    pub price: f64,
    /// Price table the row came from
    pub source: String,
    /// Date the price refers to
    pub reference_date: NaiveDate,
}

impl From<PriceRow> for price_item::ActiveModel {
    fn from(row: PriceRow) -> Self {
        Self {
            code: Set(row.code),
            description: Set(row.description),
            unit: Set(row.unit),
            price: Set(row.price),
            source: Set(row.source),
            reference_date: Set(row.reference_date),
            ..Default::default()
        }
    }
}

impl From<&PriceItemConfig> for PriceRow {
    fn from(config: &PriceItemConfig) -> Self {
        Self {
            code: config.code.clone(),
            description: config.description.clone(),
            unit: config.unit.clone(),
            price: config.price,
            source: config.source.clone(),
            reference_date: config.reference_date,
        }
    }
}

/// Finds price items whose code or description contains `term`, ignoring case.
///
/// A blank term returns the whole catalog. Results are ordered by code. Both sides are
/// lower-cased with Unicode rules in Rust, so accented capitals such as `ESCAVAÇÃO`
/// match `escavação`; `SQLite`'s own `LOWER()` only folds ASCII.
#[instrument(skip(db))]
pub async fn search_price_items(
    db: &DatabaseConnection,
    term: &str,
) -> Result<Vec<price_item::Model>> {
    let items = PriceItem::find()
        .order_by_asc(price_item::Column::Code)
        .order_by_asc(price_item::Column::Id)
        .all(db)
        .await?;

    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(items);
    }

    let matches: Vec<price_item::Model> = items
        .into_iter()
        .filter(|item| {
            item.code.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        })
        .collect();
    debug!(matches = matches.len(), "Price search finished");
    Ok(matches)
}

/// Parses the contents of a price list file into validated rows.
///
/// The first row is a header and is discarded. Blank lines are skipped. A row with the
/// wrong number of fields, an unreadable price, or a date not written `YYYY-MM-DD`
/// fails the whole parse with [`Error::ImportFormat`] naming its line.
pub fn parse_price_list(contents: &str) -> Result<Vec<PriceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);

        if record.iter().all(str::is_empty) {
            continue;
        }

        if record.len() != IMPORT_COLUMNS {
            return Err(Error::ImportFormat {
                line,
                message: format!(
                    "expected {IMPORT_COLUMNS} fields, found {}",
                    record.len()
                ),
            });
        }

        let field = |index: usize| record.get(index).unwrap_or_default().to_string();

        let price = parse_non_negative("price", &field(3)).map_err(|e| Error::ImportFormat {
            line,
            message: e.to_string(),
        })?;

        let raw_date = field(5);
        let reference_date =
            NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|_| Error::ImportFormat {
                line,
                message: format!("reference date '{raw_date}' is not YYYY-MM-DD"),
            })?;

        rows.push(PriceRow {
            code: field(0),
            description: field(1),
            unit: field(2),
            price,
            source: field(4),
            reference_date,
        });
    }

    if rows.is_empty() {
        return Err(Error::ImportFormat {
            line: 1,
            message: "file contains no data rows".to_string(),
        });
    }

    Ok(rows)
}

/// Parses `contents` and inserts every row in a single transaction.
///
/// Returns the number of rows inserted. Nothing is written if any row is malformed or
/// the store rejects any insert.
#[instrument(skip(db, contents), fields(bytes = contents.len()))]
pub async fn import_price_list(db: &DatabaseConnection, contents: &str) -> Result<usize> {
    let rows = parse_price_list(contents)?;
    let count = insert_rows(db, rows).await?;
    info!("Imported {count} price items.");
    Ok(count)
}

/// Inserts the configured seed prices when the catalog is empty.
///
/// Returns how many items were inserted; zero when the catalog already had rows or the
/// configuration lists none.
pub async fn seed_price_catalog(db: &DatabaseConnection, items: &[PriceItemConfig]) -> Result<usize> {
    if items.is_empty() {
        return Ok(0);
    }

    let existing = PriceItem::find().count(db).await?;
    if existing > 0 {
        debug!("Price catalog already holds {existing} items; skipping seed.");
        return Ok(0);
    }

    insert_rows(db, items.iter().map(PriceRow::from).collect()).await
}

async fn insert_rows(db: &DatabaseConnection, rows: Vec<PriceRow>) -> Result<usize> {
    let count = rows.len();
    let models: Vec<price_item::ActiveModel> = rows.into_iter().map(Into::into).collect();

    let txn = db.begin().await?;
    PriceItem::insert_many(models).exec(&txn).await?;
    txn.commit().await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    const SAMPLE: &str = "code,description,unit,price,source,reference_date
01.001,Concreto usinado,m3,512.40,SINAPI,2024-03-01
02.010,Tijolo cerâmico,un,1.35,SINAPI,2024-03-01
";

    #[test]
    fn test_parse_price_list() {
        let rows = parse_price_list(SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "01.001");
        assert_eq!(rows[0].description, "Concreto usinado");
        assert_eq!(rows[0].unit, "m3");
        assert_eq!(rows[0].price, 512.40);
        assert_eq!(rows[0].source, "SINAPI");
        assert_eq!(
            rows[0].reference_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_price_list_quoted_commas_and_blank_lines() {
        let contents = "code,description,unit,price,source,reference_date\r\n\
\r\n\
03.100,\"Argamassa, traço 1:3\",m3 , 420 ,SINAPI,2023-11-30\r\n\
\r\n";
        let rows = parse_price_list(contents).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Argamassa, traço 1:3");
        assert_eq!(rows[0].unit, "m3");
        assert_eq!(rows[0].price, 420.0);
    }

    #[test]
    fn test_parse_price_list_wrong_field_count() {
        let contents = "code,description,unit,price,source,reference_date
01.001,Concreto usinado,m3,512.40,SINAPI,2024-03-01
02.010,Tijolo, cerâmico,un,1.35,SINAPI,2024-03-01
";
        let err = parse_price_list(contents).unwrap_err();
        assert!(matches!(err, Error::ImportFormat { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_parse_price_list_bad_price_and_date() {
        let bad_price = "h\n01.001,Concreto,m3,abc,SINAPI,2024-03-01\n";
        assert!(matches!(
            parse_price_list(bad_price),
            Err(Error::ImportFormat { line: 2, .. })
        ));

        let bad_date = "h\n01.001,Concreto,m3,10,SINAPI,01/03/2024\n";
        let err = parse_price_list(bad_date).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Import failed at line 2: reference date '01/03/2024' is not YYYY-MM-DD"
        );
    }

    #[test]
    fn test_parse_price_list_without_rows() {
        assert!(matches!(
            parse_price_list(""),
            Err(Error::ImportFormat { .. })
        ));
        assert!(matches!(
            parse_price_list("code,description,unit,price,source,reference_date\n"),
            Err(Error::ImportFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_import_then_search_everything() -> Result<()> {
        let db = setup_test_db().await?;

        let imported = import_price_list(&db, SAMPLE).await?;
        assert_eq!(imported, 2);

        let all = search_price_items(&db, "").await?;
        let codes: Vec<&str> = all.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["01.001", "02.010"]);

        let blank = search_price_items(&db, "   ").await?;
        assert_eq!(blank, all);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_on_code_and_description() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_catalog(&db).await?;

        let concrete = search_price_items(&db, "concre").await?;
        assert_eq!(concrete.len(), 1);
        assert_eq!(concrete[0].code, "01.001");

        let upper = search_price_items(&db, "TIJOLO").await?;
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].code, "02.010");

        let by_code = search_price_items(&db, "02.0").await?;
        assert_eq!(by_code.len(), 1);

        assert!(search_price_items(&db, "madeira").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_folds_accented_capitals() -> Result<()> {
        let db = setup_test_db().await?;
        let contents = "code,description,unit,price,source,reference_date
93358,ESCAVAÇÃO MANUAL DE VALA,m3,71.20,SINAPI,2024-03-01
00.100,Água potável,m3,9.80,SINAPI,2024-03-01
";
        import_price_list(&db, contents).await?;

        for term in ["escavação", "ESCAVAÇÃO", "Escavação Manual"] {
            let found = search_price_items(&db, term).await?;
            assert_eq!(found.len(), 1, "term {term}");
            assert_eq!(found[0].code, "93358");
        }

        let water = search_price_items(&db, "ÁGUA").await?;
        assert_eq!(water.len(), 1);
        assert_eq!(water[0].code, "00.100");
        assert_eq!(search_price_items(&db, "água").await?, water);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_catalog(&db).await?;

        assert!(search_price_items(&db, "%").await?.is_empty());
        assert!(search_price_items(&db, "_").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_import_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let contents = "code,description,unit,price,source,reference_date
01.001,Concreto usinado,m3,512.40,SINAPI,2024-03-01
02.010,Tijolo,un,não sei,SINAPI,2024-03-01
";
        assert!(import_price_list(&db, contents).await.is_err());
        assert!(search_price_items(&db, "").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_only_fills_empty_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        let items = vec![PriceItemConfig {
            code: "09.999".to_string(),
            description: "Limpeza final".to_string(),
            unit: "m2".to_string(),
            price: 4.5,
            source: "Própria".to_string(),
            reference_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }];

        assert_eq!(seed_price_catalog(&db, &items).await?, 1);
        assert_eq!(seed_price_catalog(&db, &items).await?, 0);
        assert_eq!(seed_price_catalog(&db, &[]).await?, 0);
        assert_eq!(search_price_items(&db, "").await?.len(), 1);
        Ok(())
    }
}

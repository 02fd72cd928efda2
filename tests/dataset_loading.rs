//! Loading the journal list from workbooks and selecting from it.

use journal_ratings::dataset::{Dataset, DatasetCache};
use journal_ratings::error::DataError;
use journal_ratings::lookup::{LookupOutcome, PivotRow, lookup};
use journal_ratings::record::Source;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test helper: write an XLSX with the given header and rows. Numeric-looking
/// AJG/CNRS grades are written as numbers, as they usually are in the source
/// workbook.
fn write_workbook(dir: &Path, header: &[&str], rows: &[[&str; 3]]) -> PathBuf {
    let path = dir.join("Journals.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (c, title) in header.iter().enumerate() {
        worksheet.write_string(0, c as u16, *title).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, value) in row.iter().enumerate() {
            match value.parse::<f64>() {
                Ok(number) => worksheet.write_number(r, c as u16, number).unwrap(),
                Err(_) if value.is_empty() => continue,
                Err(_) => worksheet.write_string(r, c as u16, *value).unwrap(),
            };
        }
    }

    workbook.save(&path).unwrap();
    path
}

fn sample_workbook() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(
        dir.path(),
        &["Revista", "Origen", "Rating"],
        &[
            ["Journal of Testing", "AJG", "4"],
            ["Journal of Testing", "CNU", "B"],
            ["Other Journal", "VHB", "A"],
            ["journal of testing ", "CNRS", "1"],
            ["Strategic Letters", "ABDC", "A*"],
            ["Strategic Letters", "AJG", "4*"],
        ],
    );
    (dir, path)
}

#[test]
fn workbook_rows_load_in_sheet_order() {
    let (_dir, path) = sample_workbook();
    let dataset = Dataset::load(&path).unwrap();

    assert_eq!(dataset.len(), 6);
    let first = &dataset.records()[0];
    assert_eq!(first.journal, "Journal of Testing");
    assert_eq!(first.source(), Some(Source::Ajg));
    // Stored as the number 4 in the workbook
    assert_eq!(first.rating, "4");
    assert_eq!(dataset.records()[5].rating, "4*");
}

#[test]
fn title_index_lists_each_spelling_once() {
    let (_dir, path) = sample_workbook();
    let dataset = Dataset::load(&path).unwrap();

    assert_eq!(
        dataset.titles(),
        [
            "Journal of Testing",
            "Other Journal",
            "Strategic Letters",
            "journal of testing ",
        ]
    );
}

#[test]
fn spellings_that_normalize_alike_are_all_selected() {
    let (_dir, path) = sample_workbook();
    let dataset = Dataset::load(&path).unwrap();

    let LookupOutcome::Table(rows) = lookup(&dataset, &["JOURNAL OF TESTING"]) else {
        panic!("expected a table");
    };
    // Rows group by the original spelling
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].journal, "Journal of Testing");
    assert_eq!(rows[0].rating(Source::Ajg), "4");
    assert_eq!(rows[0].rating(Source::Cnu), "B");
    assert_eq!(rows[1].journal, "journal of testing ");
    assert_eq!(rows[1].rating(Source::Cnrs), "1");
}

#[test]
fn multi_selection_keeps_fixed_columns() {
    let (_dir, path) = sample_workbook();
    let dataset = Dataset::load(&path).unwrap();

    let outcome = lookup(&dataset, &["Other Journal", "strategic letters"]);
    let mut other = PivotRow::empty("Other Journal");
    other.ratings[Source::Vhb.index()] = "A".to_string();
    let mut strategic = PivotRow::empty("Strategic Letters");
    strategic.ratings[Source::Ajg.index()] = "4*".to_string();
    strategic.ratings[Source::Abdc.index()] = "A*".to_string();

    assert_eq!(outcome, LookupOutcome::Table(vec![other, strategic]));
}

#[test]
fn workbook_without_rating_column_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(
        dir.path(),
        &["Revista", "Origen"],
        &[["Journal of Testing", "AJG", ""]],
    );

    assert!(matches!(
        Dataset::load(&path),
        Err(DataError::MissingColumn("Rating"))
    ));
}

#[test]
fn cache_hands_out_one_shared_dataset() {
    let (_dir, path) = sample_workbook();
    let cache = DatasetCache::new(&path);

    let a = cache.get_or_load().unwrap();
    let b = cache.get_or_load().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.path(), path.as_path());
}

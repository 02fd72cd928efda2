//! Selection and pivot of rating records.
//!
//! The functions here are pure: they borrow the loaded records and return new
//! values, so every request recomputes its table from the shared dataset.

use crate::dataset::Dataset;
use crate::record::{RatingRecord, Source, normalize_title};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Header of the journal column in every table.
pub const JOURNAL_HEADER: &str = "Journal";

/// One journal with a cell per rating source. Missing ratings are `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub journal: String,
    pub ratings: [String; 5],
}

impl PivotRow {
    pub fn empty(journal: impl Into<String>) -> Self {
        PivotRow {
            journal: journal.into(),
            ratings: Default::default(),
        }
    }

    pub fn rating(&self, source: Source) -> &str {
        &self.ratings[source.index()]
    }

    /// The six cells in column order: journal, AJG, CNRS, CNU, VHB, ABDC.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.journal,
            &self.ratings[0],
            &self.ratings[1],
            &self.ratings[2],
            &self.ratings[3],
            &self.ratings[4],
        ]
    }
}

/// Column headers matching [`PivotRow::cells`].
pub fn header() -> [&'static str; 6] {
    [
        JOURNAL_HEADER,
        Source::Ajg.code(),
        Source::Cnrs.code(),
        Source::Cnu.code(),
        Source::Vhb.code(),
        Source::Abdc.code(),
    ]
}

/// Records whose normalized title matches one of `selected`, in input order.
///
/// An empty selection selects nothing.
pub fn select<'a, S: AsRef<str>>(
    records: &'a [RatingRecord],
    selected: &[S],
) -> Vec<&'a RatingRecord> {
    let wanted: HashSet<String> = selected
        .iter()
        .map(|title| normalize_title(title.as_ref()))
        .collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| wanted.contains(record.normalized_key()))
        .collect()
}

/// Reshape records into one row per journal title, sorted by title.
///
/// For each source the first record (in input order) carrying a non-empty
/// rating fills the cell; later duplicates are ignored. Records from unknown
/// sources still produce a row for their journal.
pub fn pivot(records: &[&RatingRecord]) -> Vec<PivotRow> {
    let mut rows: BTreeMap<&str, PivotRow> = BTreeMap::new();

    for record in records {
        let row = rows
            .entry(record.journal.as_str())
            .or_insert_with(|| PivotRow::empty(record.journal.as_str()));

        let Some(source) = record.source() else {
            continue;
        };
        let cell = &mut row.ratings[source.index()];
        if cell.is_empty() && !record.rating.is_empty() {
            cell.clone_from(&record.rating);
        }
    }

    rows.into_values().collect()
}

/// What a selection produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Nothing was selected; show nothing.
    NoSelection,
    /// Titles were selected but none matched; warn the user.
    NoMatches,
    Table(Vec<PivotRow>),
}

impl LookupOutcome {
    pub fn rows(&self) -> &[PivotRow] {
        match self {
            LookupOutcome::Table(rows) => rows,
            _ => &[],
        }
    }
}

/// Select and pivot in one step.
pub fn lookup<S: AsRef<str>>(dataset: &Dataset, selected: &[S]) -> LookupOutcome {
    if selected.iter().all(|title| title.as_ref().trim().is_empty()) {
        return LookupOutcome::NoSelection;
    }

    let matched = select(dataset.records(), selected);
    if matched.is_empty() {
        return LookupOutcome::NoMatches;
    }
    LookupOutcome::Table(pivot(&matched))
}

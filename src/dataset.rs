use crate::error::DataError;
use crate::loader;
use crate::record::RatingRecord;
use log::info;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The immutable journal list: every rating record in load order plus the
/// sorted index of distinct titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<RatingRecord>,
    titles: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<RatingRecord>) -> Self {
        let titles = title_index(&records);
        Dataset { records, titles }
    }

    /// Read the spreadsheet at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let records = loader::load_records(path)?;
        Ok(Dataset::new(records))
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    /// Distinct journal titles as they appear in the data, sorted.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sorted distinct titles of `records`.
///
/// Titles are compared exactly: two spellings that normalize to the same key
/// are both listed, and either one selects the journal.
pub fn title_index(records: &[RatingRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.journal.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Load-once handle to the journal list.
///
/// The first successful [`DatasetCache::get_or_load`] reads the file; later
/// calls return the same shared dataset. A failed load is not remembered, so
/// the next call reads the file again. There is no invalidation.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetCache {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_or_load(&self) -> Result<Arc<Dataset>, DataError> {
        self.cell
            .get_or_try_init(|| {
                let dataset = Dataset::load(&self.path)?;
                info!(
                    "Loaded {} ratings for {} journals from {}",
                    dataset.len(),
                    dataset.titles().len(),
                    self.path.display()
                );
                Ok(Arc::new(dataset))
            })
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

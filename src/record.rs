use serde::{Deserialize, Serialize};
use std::fmt;

/// A rating body whose grades appear in the journal list.
///
/// The declaration order is the column order of every table this crate
/// produces.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    Ajg,
    Cnrs,
    Cnu,
    Vhb,
    Abdc,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Ajg,
        Source::Cnrs,
        Source::Cnu,
        Source::Vhb,
        Source::Abdc,
    ];

    /// Parse an `Origen` cell. Unknown codes yield `None`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Source::ALL
            .into_iter()
            .find(|source| source.code().eq_ignore_ascii_case(code))
    }

    pub fn code(self) -> &'static str {
        match self {
            Source::Ajg => "AJG",
            Source::Cnrs => "CNRS",
            Source::Cnu => "CNU",
            Source::Vhb => "VHB",
            Source::Abdc => "ABDC",
        }
    }

    /// Grades of this source, best first.
    pub fn scale(self) -> &'static [&'static str] {
        match self {
            Source::Ajg => &["4*", "4", "3", "2", "1"],
            Source::Cnrs => &["1*", "1", "2", "3", "4"],
            Source::Cnu => &["A", "B", "C"],
            Source::Vhb => &["A+", "A", "B", "C", "D"],
            Source::Abdc => &["A*", "A", "B", "C"],
        }
    }

    /// The scale as a display string, e.g. `"A, B, C"`.
    pub fn legend(self) -> String {
        self.scale().join(", ")
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Lowercased, trimmed form of a journal title used for matching.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// One (journal, source, rating) row of the dataset.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RatingRecord {
    pub journal: String,
    /// Raw `Origen` value; may name a source outside [`Source::ALL`].
    pub origin: String,
    pub rating: String,
    normalized: String,
}

impl RatingRecord {
    pub fn new(
        journal: impl Into<String>,
        origin: impl Into<String>,
        rating: impl Into<String>,
    ) -> Self {
        let journal = journal.into();
        let normalized = normalize_title(&journal);
        RatingRecord {
            journal,
            origin: origin.into(),
            rating: rating.into(),
            normalized,
        }
    }

    pub fn normalized_key(&self) -> &str {
        &self.normalized
    }

    pub fn source(&self) -> Option<Source> {
        Source::parse(&self.origin)
    }
}

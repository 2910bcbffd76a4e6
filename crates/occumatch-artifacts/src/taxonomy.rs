//! Occupation metadata table loaded from CSV.
//!
//! The table carries both classification schemes per occupation: NCO-2015
//! (current, `XXXX.XXXX`) and NCO-2004 (legacy, `XXXX.XX`). Row order is the
//! table's identity — row *i* pairs with vector *i* in the index.

use std::path::Path;

use crate::errors::{ArtifactError, Result};

/// CSV column holding the current-scheme code.
pub const COL_CODE_2015: &str = "NCO-2015";
/// CSV column holding the legacy-scheme code.
pub const COL_CODE_2004: &str = "NCO-2004";
/// CSV column holding the occupation title.
pub const COL_TITLE: &str = "Title";
/// CSV column holding the occupation description.
pub const COL_DESCRIPTION: &str = "Description";

/// A single occupation with its codes under both classification schemes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupationRecord {
    /// Current-scheme code (NCO-2015).
    pub code_2015: String,
    /// Legacy-scheme code (NCO-2004).
    pub code_2004: String,
    /// Occupation title.
    pub title: String,
    /// Free-text description.
    pub description: String,
}

/// The occupation table, in file order.
#[derive(Clone, Debug, Default)]
pub struct OccupationTable {
    records: Vec<OccupationRecord>,
}

impl OccupationTable {
    /// Load the table from a CSV file.
    ///
    /// The header must contain the `NCO-2015`, `NCO-2004`, `Title` and
    /// `Description` columns; a missing column is a malformed artifact.
    /// Row order is preserved exactly as read.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers = reader.headers()?.clone();
        let find = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ArtifactError::Malformed(format!(
                    "occupation table is missing the {name} column: {}",
                    path.display()
                ))
            })
        };
        let idx_2015 = find(COL_CODE_2015)?;
        let idx_2004 = find(COL_CODE_2004)?;
        let idx_title = find(COL_TITLE)?;
        let idx_description = find(COL_DESCRIPTION)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(idx).unwrap_or_default().to_string();
            records.push(OccupationRecord {
                code_2015: field(idx_2015),
                code_2004: field(idx_2004),
                title: field(idx_title),
                description: field(idx_description),
            });
        }

        Ok(Self { records })
    }

    /// Build a table directly from records, preserving their order.
    pub fn from_records(records: Vec<OccupationRecord>) -> Self {
        Self { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `position`, or `None` when out of range.
    pub fn get(&self, position: usize) -> Option<&OccupationRecord> {
        self.records.get(position)
    }
}

//! `SQLite`-backed vector index with brute-force KNN search.
//!
//! File schema:
//! - `index_meta(dimensions INTEGER NOT NULL)` — single row
//! - `vectors(position INTEGER PRIMARY KEY, embedding BLOB NOT NULL)` —
//!   positions contiguous from 0, each blob `dimensions` little-endian f32s
//!
//! The whole index is read into a flat in-memory buffer at open time; search
//! scores by inner product, which equals cosine similarity for the unit
//! vectors the build pipeline stores. Non-unit vectors produce out-of-range
//! scores and are passed through unmodified.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::errors::{ArtifactError, Result};

/// Convert an f32 slice to a byte blob for storage.
pub fn f32_slice_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a byte blob back to an f32 vector.
pub fn blob_to_f32_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// A single nearest-neighbor match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Position of the matched vector in the index's own ordering.
    pub position: usize,
    /// Raw similarity score (inner product with the query).
    pub score: f32,
}

/// In-memory vector index loaded from a `SQLite` artifact file.
#[derive(Debug)]
pub struct VectorIndex {
    dims: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Open and fully read an index file, validating its layout.
    ///
    /// Positions must be contiguous from 0 and every blob must hold exactly
    /// `dimensions` f32 values; violations are malformed-artifact errors.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        let dims: i64 = conn.query_row("SELECT dimensions FROM index_meta", [], |row| row.get(0))?;
        if dims <= 0 {
            return Err(ArtifactError::Malformed(format!(
                "index reports non-positive dimensions: {dims}"
            )));
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let dims = dims as usize;

        let mut stmt =
            conn.prepare("SELECT position, embedding FROM vectors ORDER BY position")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut data = Vec::new();
        let mut expected_position = 0i64;
        for row in rows {
            let (position, blob) = row?;
            if position != expected_position {
                return Err(ArtifactError::Malformed(format!(
                    "non-contiguous vector positions: expected {expected_position}, found {position}"
                )));
            }
            if blob.len() != dims * 4 {
                return Err(ArtifactError::Malformed(format!(
                    "vector {position} has {} bytes, expected {}",
                    blob.len(),
                    dims * 4
                )));
            }
            data.extend(blob_to_f32_vec(&blob));
            expected_position += 1;
        }

        Ok(Self { dims, data })
    }

    /// Write a new index file. Every vector must have `dimensions` components.
    ///
    /// Expects a fresh path; used by the offline index builder and by tests.
    pub fn save(path: &Path, dimensions: usize, vectors: &[Vec<f32>]) -> Result<()> {
        if dimensions == 0 {
            return Err(ArtifactError::Malformed(
                "cannot save an index with zero dimensions".into(),
            ));
        }
        for v in vectors {
            if v.len() != dimensions {
                return Err(ArtifactError::Dimensions {
                    expected: dimensions,
                    got: v.len(),
                });
            }
        }

        let mut conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE index_meta (dimensions INTEGER NOT NULL);
             CREATE TABLE vectors (position INTEGER PRIMARY KEY, embedding BLOB NOT NULL);",
        )?;

        let tx = conn.transaction()?;
        #[allow(clippy::cast_possible_wrap)]
        {
            let _ = tx.execute(
                "INSERT INTO index_meta (dimensions) VALUES (?1)",
                params![dimensions as i64],
            )?;
            for (position, v) in vectors.iter().enumerate() {
                let _ = tx.execute(
                    "INSERT INTO vectors (position, embedding) VALUES (?1, ?2)",
                    params![position as i64, f32_slice_to_blob(v)],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Total number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dims
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimensions each stored vector has.
    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Stored vector at `position`, or `None` when out of range.
    pub fn get(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dims)?;
        self.data.get(start..start + self.dims)
    }

    /// Exact k-nearest-neighbor search by inner product.
    ///
    /// Returns up to `k` matches in descending score order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dims {
            return Err(ArtifactError::Dimensions {
                expected: self.dims,
                got: query.len(),
            });
        }

        let mut results: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dims)
            .enumerate()
            .map(|(position, stored)| Neighbor {
                position,
                score: dot(query, stored),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }
}

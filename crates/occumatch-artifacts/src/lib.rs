//! # occumatch-artifacts
//!
//! Typed read-only handles over the three OccuMatch artifact files:
//! - `nco_index.db` — `SQLite` vector index (`index_meta` + `vectors` tables)
//! - `nco_meta.csv` — occupation metadata table (NCO-2015 / NCO-2004 / Title / Description)
//! - `model_name.txt` — identifier of the embedding model the index was built with
//!
//! Row *i* of the metadata table corresponds to vector *i* of the index; the
//! loaders here preserve input order so that positional join stays valid.
//!
//! ## Crate Position
//!
//! Standalone (no occumatch crate dependencies).
//! Depended on by: occumatch-search.

#![deny(unsafe_code)]

pub mod errors;
pub mod index;
pub mod paths;
pub mod taxonomy;

pub use errors::{ArtifactError, Result};
pub use index::{Neighbor, VectorIndex};
pub use paths::{read_model_name, ArtifactPaths};
pub use taxonomy::{OccupationRecord, OccupationTable};

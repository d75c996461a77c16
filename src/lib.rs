//! RO-Crate Evidence Graph Library
//!
//! This library derives provenance "evidence graphs" for the entities of
//! an RO-Crate metadata document that uses the EVI vocabulary.
//!
//! # Overview
//!
//! Entities in a crate point at their provenance through three fields:
//! `generatedBy` (datasets and software), `usedDataset` and `usedSoftware`
//! (computations). Building evidence graphs:
//!
//! 1. Indexes every entity by its `@id` (or legacy `guid`)
//! 2. Infers missing `generatedBy` links from computations' `generated` lists
//! 3. Expands each entity's provenance references recursively, replacing
//!    cyclic or unknown references with `{"@id": ...}` stubs
//! 4. Appends one `EVI:EvidenceGraph` node per entity and links each entity
//!    to its node through `hasEvidenceGraph`
//! 5. Points the document's own `hasEvidenceGraph` at the evidence graph of
//!    the entity with the deepest recorded expansion
//!
//! Evidence graph ids reuse the ARK prefix of the entity id:
//! `ark:59852/dataset-x` becomes `ark:59852/evidence-graph-dataset-x`.
//!
//! # Usage
//!
//! ```ignore
//! use rocrate_evidence::{build_evidence_graphs, read_metadata, EvidenceOptions};
//!
//! let mut document = read_metadata(Path::new("./my-crate"))?;
//! let stats = build_evidence_graphs(&mut document, &EvidenceOptions::default())?;
//! println!("deepest: {:?}", stats.deepest_id);
//! ```

pub mod build;
pub mod collect;
pub mod depth;
pub mod error;
pub mod expand;
pub mod id;
pub mod infer;
pub mod loader;
pub mod vocab;

// Re-export main types for convenience
pub use crate::build::{
    build_evidence_graphs, generate_evidence_graphs, EvidenceOptions, EvidenceStats,
    MissingIdPolicy,
};
pub use crate::depth::{DepthPolicy, DepthTable};
pub use crate::error::EvidenceError;
pub use crate::expand::DEFAULT_DEPTH_LIMIT;
pub use crate::id::{canonical_id, evidence_graph_id};
pub use crate::loader::{
    append_entities, ensure_context, load_document, read_metadata, registered_files,
    to_json_string, write_metadata, CrateSource, RegisteredFile,
};
pub use crate::vocab::{DEFAULT_ARK_PREFIX, EVIDENCE_GRAPH_TYPE, HAS_EVIDENCE_GRAPH};

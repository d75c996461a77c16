//! Vocabulary definitions for evidence graphs
//!
//! Field names and types from the EVI provenance vocabulary that the
//! builder reads and writes.

/// Base namespace of the EVI vocabulary
pub const EVI_NS: &str = "https://w3id.org/EVI#";

/// Full type IRI of a computation entity
pub const COMPUTATION_TYPE: &str = "https://w3id.org/EVI#Computation";

/// Compact type given to generated evidence graph nodes
pub const EVIDENCE_GRAPH_TYPE: &str = "EVI:EvidenceGraph";

/// Type of the metadata descriptor and other non-file works
pub const CREATIVE_WORK_TYPE: &str = "CreativeWork";

/// Link from an entity (or the whole document) to its evidence graph
pub const HAS_EVIDENCE_GRAPH: &str = "hasEvidenceGraph";

pub const GENERATED_BY: &str = "generatedBy";
pub const USED_DATASET: &str = "usedDataset";
pub const USED_SOFTWARE: &str = "usedSoftware";

/// Forward link on computations, only used to infer `generatedBy`
pub const GENERATED: &str = "generated";

/// Provenance fields that are expanded, in expansion order
pub const PROVENANCE_FIELDS: [&str; 3] = [GENERATED_BY, USED_DATASET, USED_SOFTWARE];

/// JSON-LD identifier key
pub const ID_KEY: &str = "@id";

/// Legacy identifier key written by older producers
pub const GUID_KEY: &str = "guid";

pub const TYPE_KEY: &str = "@type";
pub const GRAPH_KEY: &str = "@graph";

/// ARK prefix used when an id carries none
pub const DEFAULT_ARK_PREFIX: &str = "ark:59852";

/// Standard metadata descriptor filename
pub const METADATA_DESCRIPTOR_ID: &str = "ro-crate-metadata.json";

pub const CONTEXT_KEY: &str = "@context";

/// SHACL namespace, used by schema entities
pub const SHACL_NS: &str = "http://www.w3.org/ns/shacl#";

/// Default `@context` for crates using the EVI vocabulary
pub fn default_context() -> serde_json::Value {
    serde_json::json!({
        "@vocab": "https://schema.org/",
        "sh": SHACL_NS,
        "EVI": EVI_NS
    })
}

//! Identifier handling for evidence graphs
//!
//! Resolves entity ids from either `@id` or the legacy `guid` field,
//! splits ARK identifiers into prefix and remainder, and derives the
//! evidence graph id of an entity.

use serde_json::Value;

use crate::vocab::{GUID_KEY, ID_KEY, METADATA_DESCRIPTOR_ID};

/// Classification of an entity id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdKind {
    /// ARK identifier with a numeric authority: "ark:59852/dataset-x"
    Ark,
    /// Metadata descriptor: "ro-crate-metadata.json" or variants
    MetadataDescriptor,
    /// Anything else: relative paths, URLs, fragments
    Other,
}

/// Classify an id string
pub fn classify_id(id: &str) -> IdKind {
    if split_ark(id).is_some() {
        IdKind::Ark
    } else if id.ends_with(METADATA_DESCRIPTOR_ID) {
        IdKind::MetadataDescriptor
    } else {
        IdKind::Other
    }
}

/// Canonical id of an entity: `@id`, falling back to `guid`
///
/// Empty strings count as absent so that an empty `@id` still falls
/// through to `guid`.
pub fn canonical_id(entity: &Value) -> Option<&str> {
    [ID_KEY, GUID_KEY]
        .iter()
        .filter_map(|key| entity.get(*key).and_then(|v| v.as_str()))
        .find(|id| !id.is_empty())
}

/// Split "ark:<digits>/<rest>" into ("ark:<digits>", "<rest>")
pub fn split_ark(id: &str) -> Option<(&str, &str)> {
    let after_scheme = id.strip_prefix("ark:")?;
    let slash = after_scheme.find('/')?;
    let naan = &after_scheme[..slash];
    if naan.is_empty() || !naan.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let prefix_len = "ark:".len() + slash;
    Some((&id[..prefix_len], &id[prefix_len + 1..]))
}

/// Derive the evidence graph id for an entity id
///
/// "ark:1234/ds-1" -> "ark:1234/evidence-graph-ds-1"
/// "./data.csv" -> "<default_prefix>/evidence-graph-./data.csv"
pub fn evidence_graph_id(id: &str, default_prefix: &str) -> String {
    match split_ark(id) {
        Some((prefix, rest)) => format!("{}/evidence-graph-{}", prefix, rest),
        None => format!("{}/evidence-graph-{}", default_prefix, id),
    }
}

/// Normalize a provenance field value into the list of ids it references
///
/// Accepts a single id string, an `{"@id": ...}` reference, or an array
/// mixing both. Entries that carry no id are dropped.
pub fn reference_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(single_reference).collect(),
        other => single_reference(other).into_iter().collect(),
    }
}

fn single_reference(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => canonical_id(value).map(String::from),
        _ => None,
    }
}

/// Bare reference object emitted for unresolved or cyclic ids
pub fn stub(id: &str) -> Value {
    serde_json::json!({ ID_KEY: id })
}

//! Evidence graph construction
//!
//! Runs the full pipeline over one RO-Crate document: index, back-link
//! inference, per-entity expansion and deepest-root selection.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::collect::{display_name, field_present, EntityIndex};
use crate::depth::{DepthPolicy, DepthTable};
use crate::error::EvidenceError;
use crate::expand::{Expander, DEFAULT_DEPTH_LIMIT};
use crate::id::{canonical_id, evidence_graph_id};
use crate::infer::infer_generated_by;
use crate::vocab::{
    DEFAULT_ARK_PREFIX, EVIDENCE_GRAPH_TYPE, GRAPH_KEY, HAS_EVIDENCE_GRAPH, ID_KEY,
    PROVENANCE_FIELDS, TYPE_KEY,
};

/// What to do with entities that have neither `@id` nor `guid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingIdPolicy {
    /// Name them `_:entity-<position>` so they still get an evidence graph
    #[default]
    Placeholder,
    /// Fail with [`EvidenceError::MissingIdentifier`]
    Reject,
}

/// Options for evidence graph construction
#[derive(Debug, Clone)]
pub struct EvidenceOptions {
    /// How repeated depth recordings for one id are combined
    pub depth_policy: DepthPolicy,
    /// Prefix used for evidence graph ids of entities without an ARK id
    pub default_prefix: String,
    /// Handling of entities without an identifier
    pub missing_ids: MissingIdPolicy,
    /// Reference lists this deep are emitted as stubs instead of expanded
    pub depth_limit: usize,
}

impl Default for EvidenceOptions {
    fn default() -> Self {
        Self {
            depth_policy: DepthPolicy::default(),
            default_prefix: DEFAULT_ARK_PREFIX.to_string(),
            missing_ids: MissingIdPolicy::default(),
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

/// Statistics from one build
#[derive(Debug, Default, Clone, Serialize)]
pub struct EvidenceStats {
    /// Entities in the input graph
    pub entities: usize,
    /// `generatedBy` links added by inference
    pub inferred_links: usize,
    /// Stub references emitted for cycles and unresolved ids
    pub stub_references: usize,
    /// Stubs emitted because the depth limit was reached
    pub truncated_references: usize,
    /// Entities that had no identifier
    pub missing_ids: usize,
    /// Id whose evidence graph the document points at
    pub deepest_id: Option<String>,
    /// Depth recorded for `deepest_id`
    pub max_depth: Option<usize>,
}

/// Build evidence graphs for `document` in place
///
/// Side effects on the document:
/// - entities listed in a computation's `generated` gain `generatedBy`
///   when they had none,
/// - every original entity gains `hasEvidenceGraph`,
/// - one `EVI:EvidenceGraph` node per original entity is appended to
///   `@graph`, in original order,
/// - the document gains a top-level `hasEvidenceGraph` when any entity
///   had provenance to expand.
pub fn build_evidence_graphs(
    document: &mut Value,
    options: &EvidenceOptions,
) -> Result<EvidenceStats, EvidenceError> {
    let doc = document.as_object_mut().ok_or_else(|| {
        EvidenceError::InvalidStructure("document must be a JSON object".to_string())
    })?;
    let graph = match doc.get_mut(GRAPH_KEY) {
        Some(Value::Array(graph)) => graph,
        Some(_) => {
            return Err(EvidenceError::InvalidStructure(
                "@graph must be an array".to_string(),
            ))
        }
        None => {
            return Err(EvidenceError::InvalidStructure(
                "document has no @graph".to_string(),
            ))
        }
    };

    let mut stats = EvidenceStats {
        entities: graph.len(),
        ..Default::default()
    };

    let ids = resolve_ids(graph, options.missing_ids, &mut stats)?;
    let index = EntityIndex::build(graph);
    stats.inferred_links = infer_generated_by(graph, &index);
    debug!(
        entities = stats.entities,
        indexed = index.len(),
        inferred = stats.inferred_links,
        "indexed graph"
    );

    let mut depths = DepthTable::new(options.depth_policy);
    let mut evidence_graphs = Vec::with_capacity(graph.len());

    // Entities are processed in order and each gains hasEvidenceGraph right
    // after its node is built, so expansions of later entities copy that
    // field for earlier ones.
    for (pos, id) in ids.iter().enumerate() {
        let evidence_id = evidence_graph_id(id, &options.default_prefix);
        let (node, stubs, truncated) = {
            let mut expander = Expander::new(&graph[..], &index, &mut depths)
                .with_depth_limit(options.depth_limit);
            let node = evidence_graph_node(&graph[pos], id, &evidence_id, &mut expander);
            (node, expander.stubs(), expander.truncated())
        };
        stats.stub_references += stubs;
        stats.truncated_references += truncated;

        if let Some(entity) = graph[pos].as_object_mut() {
            entity.insert(HAS_EVIDENCE_GRAPH.to_string(), json!(evidence_id));
        }
        evidence_graphs.push(node);
    }

    if stats.truncated_references > 0 {
        warn!(
            truncated = stats.truncated_references,
            depth_limit = options.depth_limit,
            "provenance chains exceeded the depth limit"
        );
    }

    if let Some((deepest, depth)) = depths.deepest() {
        let pointer = evidence_graph_id(deepest, &options.default_prefix);
        debug!(deepest, depth, evidence_graph = %pointer, "selected deepest evidence graph");
        stats.deepest_id = Some(deepest.to_string());
        stats.max_depth = Some(depth);
        doc.insert(HAS_EVIDENCE_GRAPH.to_string(), json!(pointer));
    }

    if let Some(Value::Array(graph)) = doc.get_mut(GRAPH_KEY) {
        graph.extend(evidence_graphs);
    }

    Ok(stats)
}

/// Build evidence graphs and return the updated document
///
/// Same as [`build_evidence_graphs`] for callers that pass documents by
/// value.
pub fn generate_evidence_graphs(
    mut document: Value,
    options: &EvidenceOptions,
) -> Result<Value, EvidenceError> {
    build_evidence_graphs(&mut document, options)?;
    Ok(document)
}

/// Resolve the id of every entity, applying the missing id policy
///
/// Placeholders never reuse an id already present in the graph.
fn resolve_ids(
    graph: &[Value],
    policy: MissingIdPolicy,
    stats: &mut EvidenceStats,
) -> Result<Vec<String>, EvidenceError> {
    let mut taken: HashSet<String> = graph
        .iter()
        .filter_map(canonical_id)
        .map(String::from)
        .collect();

    graph
        .iter()
        .enumerate()
        .map(|(index, entity)| match canonical_id(entity) {
            Some(id) => Ok(id.to_string()),
            None => match policy {
                MissingIdPolicy::Reject => Err(EvidenceError::MissingIdentifier { index }),
                MissingIdPolicy::Placeholder => {
                    let id = placeholder_id(index, &taken);
                    warn!(index, placeholder = %id, "entity has no @id or guid, using placeholder");
                    stats.missing_ids += 1;
                    taken.insert(id.clone());
                    Ok(id)
                }
            },
        })
        .collect()
}

fn placeholder_id(index: usize, taken: &HashSet<String>) -> String {
    let base = format!("_:entity-{}", index);
    if !taken.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

/// Create the evidence graph node for one entity
fn evidence_graph_node(
    entity: &Value,
    id: &str,
    evidence_id: &str,
    expander: &mut Expander<'_>,
) -> Value {
    let name = display_name(entity, id);

    let mut node = Map::new();
    node.insert(ID_KEY.to_string(), json!(evidence_id));
    node.insert(TYPE_KEY.to_string(), json!(EVIDENCE_GRAPH_TYPE));
    node.insert("name".to_string(), json!(name));
    node.insert("description".to_string(), json!(name));

    for field in PROVENANCE_FIELDS {
        if let Some(value) = field_present(entity, field) {
            let expanded = expander.expand_field(value);
            node.insert(field.to_string(), Value::Array(expanded));
        }
    }

    Value::Object(node)
}

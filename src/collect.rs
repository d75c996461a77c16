//! Entity indexing for evidence graph construction
//!
//! Builds the id lookup over a crate's `@graph` and provides the small
//! entity helpers shared by inference and expansion.

use serde_json::Value;
use std::collections::HashMap;

use crate::id::canonical_id;
use crate::vocab::{COMPUTATION_TYPE, GENERATED, TYPE_KEY};

/// Lookup from canonical id to position in the graph
///
/// Positions are stored instead of references so the graph itself can be
/// mutated between passes while the index stays valid.
#[derive(Debug, Default)]
pub struct EntityIndex {
    positions: HashMap<String, usize>,
}

impl EntityIndex {
    /// Index every entity that has an id. A later entity with the same id
    /// replaces the earlier one.
    pub fn build(graph: &[Value]) -> Self {
        let mut positions = HashMap::with_capacity(graph.len());
        for (pos, entity) in graph.iter().enumerate() {
            if let Some(id) = canonical_id(entity) {
                positions.insert(id.to_string(), pos);
            }
        }
        Self { positions }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Resolve an id to its entity in `graph`
    pub fn get<'g>(&self, graph: &'g [Value], id: &str) -> Option<&'g Value> {
        self.position(id).and_then(|pos| graph.get(pos))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Extract @type as a list of type names
pub fn extract_types(entity: &Value) -> Vec<String> {
    match entity.get(TYPE_KEY) {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => vec![],
    }
}

/// Check if an entity has a specific @type
pub fn has_type(entity: &Value, type_name: &str) -> bool {
    extract_types(entity).iter().any(|t| t == type_name)
}

/// Check if an entity is an EVI computation with a `generated` list
pub fn is_generating_computation(entity: &Value) -> bool {
    has_type(entity, COMPUTATION_TYPE) && field_present(entity, GENERATED).is_some()
}

/// Whether a field counts as set
///
/// Crates written by older tooling use `null`, `""` or `false` for
/// unset references, so only those (and 0) are treated as absent. Empty
/// arrays and objects count as present.
pub fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Get a field only if it is set
pub fn field_present<'a>(entity: &'a Value, key: &str) -> Option<&'a Value> {
    entity.get(key).filter(|v| is_set(v))
}

/// Display name of an entity: its `name`, or the given id
///
/// Any set `name` is rendered the way older JavaScript producers wrote
/// it: `true` as `"true"`, arrays joined with `,`, objects as
/// `"[object Object]"`.
pub fn display_name(entity: &Value, id: &str) -> String {
    match field_present(entity, "name") {
        Some(name) => js_string(name),
        None => id.to_string(),
    }
}

fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_types() {
        let single = json!({"@type": "Dataset"});
        assert_eq!(extract_types(&single), vec!["Dataset"]);

        let multiple = json!({"@type": ["Dataset", "https://w3id.org/EVI#ROCrate"]});
        assert_eq!(
            extract_types(&multiple),
            vec!["Dataset", "https://w3id.org/EVI#ROCrate"]
        );
        assert!(extract_types(&json!({})).is_empty());
    }

    #[test]
    fn test_index_uses_id_and_guid() {
        let graph = vec![
            json!({"@id": "ark:1/a"}),
            json!({"guid": "ark:1/b"}),
            json!({"name": "no id"}),
        ];
        let index = EntityIndex::build(&graph);
        assert_eq!(index.len(), 2);
        assert_eq!(index.position("ark:1/a"), Some(0));
        assert_eq!(index.position("ark:1/b"), Some(1));
        assert_eq!(index.get(&graph, "ark:1/b"), Some(&graph[1]));
        assert!(index.get(&graph, "ark:1/missing").is_none());
    }

    #[test]
    fn test_index_last_duplicate_wins() {
        let graph = vec![
            json!({"@id": "ark:1/a", "name": "first"}),
            json!({"@id": "ark:1/a", "name": "second"}),
        ];
        let index = EntityIndex::build(&graph);
        assert_eq!(index.position("ark:1/a"), Some(1));
    }

    #[test]
    fn test_is_generating_computation() {
        let comp = json!({
            "@id": "ark:1/c",
            "@type": "https://w3id.org/EVI#Computation",
            "generated": ["ark:1/d"]
        });
        assert!(is_generating_computation(&comp));

        let typed_list = json!({
            "@type": ["https://w3id.org/EVI#Computation"],
            "generated": ["ark:1/d"]
        });
        assert!(is_generating_computation(&typed_list));

        let no_output = json!({"@type": "https://w3id.org/EVI#Computation"});
        assert!(!is_generating_computation(&no_output));

        let null_output = json!({
            "@type": "https://w3id.org/EVI#Computation",
            "generated": null
        });
        assert!(!is_generating_computation(&null_output));

        let dataset = json!({"@type": "Dataset", "generated": ["ark:1/d"]});
        assert!(!is_generating_computation(&dataset));
    }

    #[test]
    fn test_is_set() {
        assert!(!is_set(&json!(null)));
        assert!(!is_set(&json!("")));
        assert!(!is_set(&json!(false)));
        assert!(!is_set(&json!(0)));
        assert!(is_set(&json!([])));
        assert!(is_set(&json!({})));
        assert!(is_set(&json!("ark:1/a")));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&json!({"name": "Raw reads"}), "ark:1/a"), "Raw reads");
        assert_eq!(display_name(&json!({"name": ""}), "ark:1/a"), "ark:1/a");
        assert_eq!(display_name(&json!({}), "ark:1/a"), "ark:1/a");
        assert_eq!(display_name(&json!({"name": ["a", "b"]}), "ark:1/a"), "a,b");
    }

    #[test]
    fn test_display_name_stringifies_other_values() {
        assert_eq!(display_name(&json!({"name": true}), "ark:1/a"), "true");
        assert_eq!(display_name(&json!({"name": false}), "ark:1/a"), "ark:1/a");
        assert_eq!(display_name(&json!({"name": 7}), "ark:1/a"), "7");
        assert_eq!(
            display_name(&json!({"name": {"x": 1}}), "ark:1/b"),
            "[object Object]"
        );
        assert_eq!(
            display_name(&json!({"name": ["a", null, {"x": 1}]}), "ark:1/c"),
            "a,,[object Object]"
        );
    }
}

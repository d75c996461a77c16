//! Back-link inference for `generatedBy`
//!
//! Computations record their outputs in `generated`, but the outputs do
//! not always point back. This pass restores the missing `generatedBy`
//! links so expansion can walk from an output to its computation.

use serde_json::Value;
use tracing::trace;

use crate::collect::{field_present, is_generating_computation, is_set, EntityIndex};
use crate::id::{canonical_id, reference_ids};
use crate::vocab::{GENERATED, GENERATED_BY};

/// Fill `generatedBy` on every entity a computation lists in `generated`
///
/// Entities that already have a `generatedBy` keep it, so when several
/// computations claim the same output the first one in graph order wins.
/// Returns the number of links added.
pub fn infer_generated_by(graph: &mut [Value], index: &EntityIndex) -> usize {
    let mut inferred = 0;

    for comp_pos in 0..graph.len() {
        let (comp_id, outputs) = {
            let comp = &graph[comp_pos];
            if !is_generating_computation(comp) {
                continue;
            }
            let Some(comp_id) = canonical_id(comp) else {
                continue;
            };
            let outputs = field_present(comp, GENERATED)
                .map(reference_ids)
                .unwrap_or_default();
            (comp_id.to_string(), outputs)
        };

        for output_id in outputs {
            let Some(pos) = index.position(&output_id) else {
                continue;
            };
            let Some(output) = graph[pos].as_object_mut() else {
                continue;
            };
            let already_linked = output
                .get(GENERATED_BY)
                .map(is_set)
                .unwrap_or(false);
            if already_linked {
                continue;
            }
            trace!(output = %output_id, computation = %comp_id, "inferred generatedBy");
            output.insert(GENERATED_BY.to_string(), Value::String(comp_id.clone()));
            inferred += 1;
        }
    }

    inferred
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn computation(id: &str, generated: Value) -> Value {
        json!({
            "@id": id,
            "@type": "https://w3id.org/EVI#Computation",
            "generated": generated
        })
    }

    #[test]
    fn test_infers_missing_link() {
        let mut graph = vec![
            computation("ark:1/comp-1", json!(["ark:1/ds-1"])),
            json!({"@id": "ark:1/ds-1", "name": "D"}),
        ];
        let index = EntityIndex::build(&graph);

        let added = infer_generated_by(&mut graph, &index);

        assert_eq!(added, 1);
        assert_eq!(graph[1]["generatedBy"], json!("ark:1/comp-1"));
    }

    #[test]
    fn test_existing_link_preserved() {
        let mut graph = vec![
            computation("ark:1/comp-1", json!(["ark:1/ds-1"])),
            json!({"@id": "ark:1/ds-1", "generatedBy": "ark:1/comp-2"}),
        ];
        let index = EntityIndex::build(&graph);

        let added = infer_generated_by(&mut graph, &index);

        assert_eq!(added, 0);
        assert_eq!(graph[1]["generatedBy"], json!("ark:1/comp-2"));
    }

    #[test]
    fn test_first_computation_wins() {
        let mut graph = vec![
            computation("ark:1/comp-a", json!(["ark:1/ds"])),
            computation("ark:1/comp-b", json!(["ark:1/ds"])),
            json!({"@id": "ark:1/ds"}),
        ];
        let index = EntityIndex::build(&graph);

        infer_generated_by(&mut graph, &index);

        assert_eq!(graph[2]["generatedBy"], json!("ark:1/comp-a"));
    }

    #[test]
    fn test_unknown_outputs_and_guid_targets() {
        let mut graph = vec![
            computation("ark:1/comp-1", json!(["ark:1/missing", "ark:1/legacy"])),
            json!({"guid": "ark:1/legacy"}),
        ];
        let index = EntityIndex::build(&graph);

        let added = infer_generated_by(&mut graph, &index);

        assert_eq!(added, 1);
        assert_eq!(graph[1]["generatedBy"], json!("ark:1/comp-1"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_non_computation_generated_ignored() {
        let mut graph = vec![
            json!({"@id": "ark:1/sw", "@type": "SoftwareSourceCode", "generated": ["ark:1/ds"]}),
            json!({"@id": "ark:1/ds"}),
        ];
        let index = EntityIndex::build(&graph);

        assert_eq!(infer_generated_by(&mut graph, &index), 0);
        assert!(graph[1].get("generatedBy").is_none());
    }

    #[test]
    fn test_null_generated_by_is_filled() {
        let mut graph = vec![
            computation("ark:1/comp-1", json!("ark:1/ds")),
            json!({"@id": "ark:1/ds", "generatedBy": null}),
        ];
        let index = EntityIndex::build(&graph);

        assert_eq!(infer_generated_by(&mut graph, &index), 1);
        assert_eq!(graph[1]["generatedBy"], json!("ark:1/comp-1"));
    }
}

//! Attributed-graph serialization.
//!
//! Two interchange forms: DOT (see [`FusedGraph::to_dot`]) and a JSON
//! attributed-graph document handled here. The JSON form is round-trippable:
//! re-importing an exported graph yields the same composition. Import
//! validates the graph invariants (closed kind set, no dangling edges) and
//! rejects files violating them.

use crate::errors::{FusionError, FusionResult};
use crate::graph::{FusedGraph, GraphKind};
use crate::vertex::{Vertex, VertexId, VertexKind, VertexPayload};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: u64,
    kind: VertexKind,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphDoc {
    program: String,
    kind: GraphKind,
    nodes: Vec<NodeRecord>,
    edges: Vec<(u64, u64)>,
}

impl From<&Vertex> for NodeRecord {
    fn from(vertex: &Vertex) -> Self {
        let (signature, resource_id, resource_name) = match vertex.payload() {
            VertexPayload::Procedure(p) => (Some(p.signature()), None, None),
            VertexPayload::Statement(p, _) => (Some(p.signature()), None, None),
            VertexPayload::Control(c) => (
                None,
                Some(c.resource_id()),
                Some(c.resource_name().to_string()),
            ),
            VertexPayload::None => (None, None, None),
        };
        Self {
            id: vertex.id().raw(),
            kind: vertex.kind(),
            label: vertex.label().to_string(),
            signature,
            resource_id,
            resource_name,
        }
    }
}

/// Serializes the graph to its JSON attributed-graph form.
pub fn to_json(graph: &FusedGraph) -> FusionResult<String> {
    let doc = GraphDoc {
        program: graph.program().to_string(),
        kind: graph.kind(),
        nodes: graph.iter_vertices().map(NodeRecord::from).collect(),
        edges: graph
            .iter_edges()
            .map(|(a, b)| (a.raw(), b.raw()))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Re-reads an exported JSON graph. The payloads are not reconstructed
/// (identity, kind and label are the serialized contract); composition of
/// the imported graph equals the pre-export composition.
pub fn from_json(json: &str) -> FusionResult<FusedGraph> {
    let doc: GraphDoc = serde_json::from_str(json)?;
    let mut graph = FusedGraph::new(doc.program, doc.kind);
    for node in doc.nodes {
        let id = VertexId::from_raw(node.id);
        if graph.contains(id) {
            return Err(FusionError::MalformedGraphFile(format!(
                "duplicate node id {id}"
            )));
        }
        graph.ensure_vertex(Vertex::reimported(id, node.kind, node.label))?;
    }
    for (a, b) in doc.edges {
        graph
            .add_edge(VertexId::from_raw(a), VertexId::from_raw(b))
            .map_err(|_| {
                FusionError::MalformedGraphFile(format!(
                    "edge references unknown node ({a:#x} -> {b:#x})"
                ))
            })?;
    }
    Ok(graph)
}

/// The conventional `{programName}_{graphKind}.{ext}` output file name.
#[must_use]
pub fn file_name(graph: &FusedGraph, extension: &str) -> String {
    format!("{}_{}.{extension}", graph.program(), graph.kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;
    use ag_model::{ProcedureRef, UiControlDecl};

    fn sample_graph() -> FusedGraph {
        let mut g = FusedGraph::new("demo", GraphKind::Fused);
        let listener = g
            .ensure_vertex(Vertex::procedure(
                VertexKind::Listener,
                ProcedureRef::new("com/app/A", "onClick", "(Landroid/view/View;)V"),
            ))
            .unwrap();
        let method = g
            .ensure_vertex(Vertex::procedure(
                VertexKind::Method,
                ProcedureRef::new("com/app/B", "work", "()V"),
            ))
            .unwrap();
        let control = g
            .ensure_vertex(Vertex::control(UiControlDecl::new(
                7, "btn", 9, "main", "com/app/A",
            )))
            .unwrap();
        let stmt = g
            .ensure_vertex(Vertex::statement(
                ProcedureRef::new("com/app/A", "onClick", "(Landroid/view/View;)V"),
                0,
            ))
            .unwrap();
        g.add_edge(control, listener).unwrap();
        g.add_edge(listener, stmt).unwrap();
        g.add_edge(stmt, method).unwrap();
        g
    }

    #[test]
    fn json_round_trip_preserves_composition() {
        let graph = sample_graph();
        let json = to_json(&graph).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(Composition::of(&back), Composition::of(&graph));
        assert_eq!(back.vertex_ids(), graph.vertex_ids());
        assert_eq!(back.edge_set(), graph.edge_set());
        assert_eq!(back.program(), "demo");
        assert_eq!(back.kind(), GraphKind::Fused);
    }

    #[test]
    fn exported_control_node_carries_resource_fields() {
        let json = to_json(&sample_graph()).unwrap();
        assert!(json.contains("\"resource_name\": \"btn\""));
        assert!(json.contains("\"kind\": \"control\""));
    }

    #[test]
    fn import_rejects_dangling_edge() {
        let json = r#"{
            "program": "bad",
            "kind": "calls",
            "nodes": [{"id": 1, "kind": "method", "label": "A->f()V"}],
            "edges": [[1, 2]]
        }"#;
        assert!(matches!(
            from_json(json),
            Err(FusionError::MalformedGraphFile(_))
        ));
    }

    #[test]
    fn import_rejects_duplicate_node_id() {
        let json = r#"{
            "program": "bad",
            "kind": "calls",
            "nodes": [
                {"id": 1, "kind": "method", "label": "A->f()V"},
                {"id": 1, "kind": "method", "label": "B->g()V"}
            ],
            "edges": []
        }"#;
        assert!(matches!(
            from_json(json),
            Err(FusionError::MalformedGraphFile(_))
        ));
    }

    #[test]
    fn import_rejects_unknown_kind() {
        let json = r#"{
            "program": "bad",
            "kind": "calls",
            "nodes": [{"id": 1, "kind": "widget", "label": "x"}],
            "edges": []
        }"#;
        assert!(from_json(json).is_err());
    }

    #[test]
    fn file_naming_convention() {
        assert_eq!(file_name(&sample_graph(), "dot"), "demo_fused.dot");
    }
}

//! The unified program graph representation.
//!
//! A simple directed graph of typed vertices: duplicate edges between the
//! same ordered pair collapse, and an edge can only be added once both of its
//! endpoints are present (no dangling edges, ever).

use crate::errors::{FusionError, FusionResult};
use crate::vertex::{Vertex, VertexId, VertexKind};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::prelude::*;
use petgraph::visit::{NodeRef, Reversed};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Write;

/// Which of the two graph flavors a construction run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// Procedure-level call graph only (phase A output).
    Calls,
    /// The fused graph: call edges, statement subgraphs, control vertices.
    Fused,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Calls => write!(f, "callgraph"),
            Self::Fused => write!(f, "fused"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FusedGraph {
    inner: DiGraph<Vertex, ()>,
    node_ids: BTreeMap<VertexId, NodeIndex>,
    program: String,
    kind: GraphKind,
}

impl FusedGraph {
    #[must_use]
    pub fn new(program: impl Into<String>, kind: GraphKind) -> Self {
        Self {
            inner: DiGraph::new(),
            node_ids: BTreeMap::new(),
            program: program.into(),
            kind,
        }
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Inserts the vertex if its identity is new and returns its id.
    ///
    /// Re-inserting the same identity is a no-op as long as the kind
    /// matches; one identity claimed by two kinds is a classifier contract
    /// violation and aborts the run.
    pub fn ensure_vertex(&mut self, vertex: Vertex) -> FusionResult<VertexId> {
        let id = vertex.id();
        if let Some(existing) = self.node_ids.get(&id) {
            let present = &self.inner[*existing];
            if present.kind() != vertex.kind() {
                return Err(FusionError::StructuralDefect(format!(
                    "vertex {id} claimed as both {} and {}",
                    present.kind(),
                    vertex.kind()
                )));
            }
            return Ok(id);
        }
        let index = self.inner.add_node(vertex);
        self.node_ids.insert(id, index);
        Ok(id)
    }

    /// Adds a directed edge between two existing vertices; duplicates
    /// collapse.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> FusionResult<()> {
        let (Some(src), Some(dst)) = (self.node_ids.get(&from), self.node_ids.get(&to)) else {
            return Err(FusionError::DanglingEdge(from, to));
        };
        self.inner.update_edge(*src, *dst, ());
        Ok(())
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.node_ids.contains_key(&id)
    }

    /// Vertices in stable (identity) order.
    pub fn iter_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.node_ids.values().map(move |index| &self.inner[*index])
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.inner.edge_references().map(move |edge| {
            (
                self.inner[edge.source()].id(),
                self.inner[edge.target()].id(),
            )
        })
    }

    #[must_use]
    pub fn vertex_ids(&self) -> BTreeSet<VertexId> {
        self.node_ids.keys().copied().collect()
    }

    #[must_use]
    pub fn edge_set(&self) -> BTreeSet<(VertexId, VertexId)> {
        self.iter_edges().collect()
    }

    pub fn nb_vertices(&self) -> usize {
        self.inner.node_count()
    }

    pub fn nb_edges(&self) -> usize {
        self.inner.edge_count()
    }

    /// Keeps only the vertices from which a vertex matching the predicate is
    /// reachable, by backward traversal from the matching vertices.
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&Vertex) -> bool,
    {
        // Since we remove nodes while keeping the ids collection, we need to
        // switch to the stable graph representation so that indices are
        // preserved during removal.
        let mut stable_graph: StableDiGraph<_, _> = self.inner.clone().into();

        let mut to_remove: BTreeSet<NodeIndex> = stable_graph.node_indices().collect();

        let reversed = Reversed(&stable_graph);
        let mut dfs = Dfs::empty(reversed);
        for index in stable_graph.node_indices() {
            if predicate(&stable_graph[index]) {
                dfs.move_to(index);
                while let Some(keep) = dfs.next(reversed) {
                    to_remove.remove(&keep);
                }
            }
        }

        stable_graph.retain_nodes(|_, index| !to_remove.contains(&index));

        let inner: DiGraph<Vertex, ()> = stable_graph.into();
        let node_ids = inner
            .node_indices()
            .map(|index| (inner[index].id(), index))
            .collect();
        Self {
            inner,
            node_ids,
            program: self.program.clone(),
            kind: self.kind,
        }
    }

    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut res = String::new();
        res.push_str("digraph {\n");
        res.push_str("  rankdir=LR;\n");
        let display_graph = self.inner.map(|_, v| v, |_, _| "");
        write!(
            res,
            "{}",
            Dot::with_attr_getters(
                &display_graph,
                &[Config::GraphContentOnly, Config::EdgeNoLabel],
                &|_, _| String::new(),
                &|_, node| {
                    let v = node.weight();
                    let (color, shape) = match v.kind() {
                        VertexKind::Method => ("black", "box"),
                        VertexKind::Statement => ("gray", "ellipse"),
                        VertexKind::Control => ("green", "diamond"),
                        VertexKind::Lifecycle => ("blue", "box"),
                        VertexKind::Listener => ("orange", "box"),
                        VertexKind::Callback => ("purple", "box"),
                        VertexKind::Dummy => ("red", "box"),
                    };
                    format!("color={color},shape={shape}")
                }
            )
        )
        .unwrap();
        res.push('}');
        res
    }
}

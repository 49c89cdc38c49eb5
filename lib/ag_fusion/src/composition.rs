//! Per-kind vertex and edge accounting of a graph.

use crate::graph::FusedGraph;
use crate::vertex::VertexKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The per-kind vertex counts and totals of one graph. Equality is
/// structural: two compositions are equal iff all counters are.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    methods: usize,
    statements: usize,
    controls: usize,
    lifecycles: usize,
    listeners: usize,
    callbacks: usize,
    dummies: usize,
    vertices: usize,
    edges: usize,
}

impl Composition {
    /// Single O(V+E) pass over the graph.
    #[must_use]
    pub fn of(graph: &FusedGraph) -> Self {
        let mut composition = Self::default();
        for vertex in graph.iter_vertices() {
            composition.record(vertex.kind());
        }
        composition.edges = graph.nb_edges();
        composition
    }

    fn record(&mut self, kind: VertexKind) {
        self.vertices += 1;
        match kind {
            VertexKind::Method => self.methods += 1,
            VertexKind::Statement => self.statements += 1,
            VertexKind::Control => self.controls += 1,
            VertexKind::Lifecycle => self.lifecycles += 1,
            VertexKind::Listener => self.listeners += 1,
            VertexKind::Callback => self.callbacks += 1,
            VertexKind::Dummy => self.dummies += 1,
        }
    }

    pub fn methods(&self) -> usize {
        self.methods
    }

    pub fn statements(&self) -> usize {
        self.statements
    }

    pub fn controls(&self) -> usize {
        self.controls
    }

    pub fn lifecycles(&self) -> usize {
        self.lifecycles
    }

    pub fn listeners(&self) -> usize {
        self.listeners
    }

    pub fn callbacks(&self) -> usize {
        self.callbacks
    }

    pub fn dummies(&self) -> usize {
        self.dummies
    }

    pub fn nb_vertices(&self) -> usize {
        self.vertices
    }

    pub fn nb_edges(&self) -> usize {
        self.edges
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  {:<12} {:>8}", "method", self.methods)?;
        writeln!(f, "  {:<12} {:>8}", "statement", self.statements)?;
        writeln!(f, "  {:<12} {:>8}", "control", self.controls)?;
        writeln!(f, "  {:<12} {:>8}", "lifecycle", self.lifecycles)?;
        writeln!(f, "  {:<12} {:>8}", "listener", self.listeners)?;
        writeln!(f, "  {:<12} {:>8}", "callback", self.callbacks)?;
        writeln!(f, "  {:<12} {:>8}", "dummy", self.dummies)?;
        writeln!(f, "  {:<12} {:>8}", "vertices", self.vertices)?;
        write!(f, "  {:<12} {:>8}", "edges", self.edges)
    }
}

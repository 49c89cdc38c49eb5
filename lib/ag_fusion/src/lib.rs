//! This crate provides the graph fusion algorithms of the `AppGraph`
//! project: procedure classification, UI control-to-listener linking, the
//! assembly of the unified typed program graph, and its composition
//! accounting and serialization.
//!
//! All inputs are pulled through the [`ag_model::AnalysisEngine`] boundary;
//! nothing here parses bytecode, manifests or layout resources.

pub mod build;
pub mod classify;
pub mod composition;
pub mod diagnostics;
pub mod errors;
pub mod export;
pub mod graph;
pub mod link;
pub mod vertex;

pub use build::{Fusion, GraphBuilder};
pub use classify::{Classifier, InclusionFilter};
pub use composition::Composition;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use errors::{FusionError, FusionResult};
pub use graph::{FusedGraph, GraphKind};
pub use link::{ControlLinker, LinkOutcome};
pub use vertex::{Vertex, VertexId, VertexKind, VisitMarks};

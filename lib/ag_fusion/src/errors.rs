//! Fusion errors definition.
//!
//! Only structural defects and missing preconditions surface as errors;
//! everything input-shaped (unresolved controls, ambiguous bindings,
//! unparsable tokens) is recovered locally and lands in the run diagnostics
//! instead.

use crate::vertex::VertexId;
use ag_model::errors::ModelError;
use thiserror::Error;

pub type FusionResult<T> = Result<T, FusionError>;

#[derive(Debug, Error)]
pub enum FusionError {
    /// The engine produced no call graph at all; graph assembly requires it
    /// as a precondition and fails fast rather than returning an empty graph.
    #[error("precondition violation: the engine returned an empty call graph")]
    EmptyCallGraph,

    /// A Classifier/Builder contract violation, e.g. one vertex identity
    /// claimed by two different kinds. Aborts the run.
    #[error("structural defect: {0}")]
    StructuralDefect(String),

    /// An edge referencing a vertex that was never added.
    #[error("structural defect: dangling edge {0} -> {1}")]
    DanglingEdge(VertexId, VertexId),

    /// An exported graph file that does not satisfy the graph invariants.
    #[error("malformed graph file: {0}")]
    MalformedGraphFile(String),

    #[error("graph serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

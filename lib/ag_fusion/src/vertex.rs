//! The typed vertex model of the unified program graph.
//!
//! A single tagged-variant [`Vertex`] replaces the per-taxonomy subclass
//! hierarchies of older designs: a discriminant [`VertexKind`] plus a payload
//! union. Vertex identity is a stable hash of the payload's own signature, so
//! the same procedure, statement or control always maps to the same
//! [`VertexId`] within and across runs over the same inputs.

use ag_model::{ProcedureRef, UiControlDecl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable vertex identity, unique within one graph construction run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VertexId(u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{:016x}", self.0)
    }
}

impl VertexId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

// 64-bit FNV-1a. Identities must be reproducible across runs and across
// builds, which rules out the randomized std hasher.
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// The closed vertex taxonomy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VertexKind {
    Method,
    Statement,
    Control,
    Lifecycle,
    Listener,
    Callback,
    Dummy,
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Statement => write!(f, "statement"),
            Self::Control => write!(f, "control"),
            Self::Lifecycle => write!(f, "lifecycle"),
            Self::Listener => write!(f, "listener"),
            Self::Callback => write!(f, "callback"),
            Self::Dummy => write!(f, "dummy"),
        }
    }
}

impl VertexKind {
    /// Kinds whose payload is a procedure reference.
    #[must_use]
    pub const fn is_procedure_like(self) -> bool {
        matches!(
            self,
            Self::Method | Self::Lifecycle | Self::Listener | Self::Callback | Self::Dummy
        )
    }

    /// Kinds whose body is expanded into a statement subgraph. `callback`
    /// vertices reaching expansion are a classification defect, `dummy`
    /// entries have no real body.
    #[must_use]
    pub const fn is_expandable(self) -> bool {
        matches!(self, Self::Method | Self::Lifecycle | Self::Listener)
    }
}

/// Type-specific vertex payload. Not part of vertex equality: identity is
/// derived from the payload's own stable hash at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexPayload {
    Procedure(ProcedureRef),
    Statement(ProcedureRef, u32),
    Control(UiControlDecl),
    None,
}

/// One vertex of the unified graph: identity, kind, label and payload.
/// Immutable after construction; traversal marks live in [`VisitMarks`].
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    kind: VertexKind,
    label: String,
    payload: VertexPayload,
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.label)
    }
}

impl Vertex {
    /// A procedure-derived vertex; identity from the procedure signature.
    #[must_use]
    pub fn procedure(kind: VertexKind, procedure: ProcedureRef) -> Self {
        debug_assert!(kind.is_procedure_like());
        let signature = procedure.signature();
        Self {
            id: VertexId(fnv1a64(signature.as_bytes())),
            kind,
            label: signature,
            payload: VertexPayload::Procedure(procedure),
        }
    }

    /// A statement vertex; identity from the `(procedure, index)` composite.
    #[must_use]
    pub fn statement(procedure: ProcedureRef, index: u32) -> Self {
        let label = format!("{}#{index}", procedure.signature());
        Self {
            id: VertexId(fnv1a64(label.as_bytes())),
            kind: VertexKind::Statement,
            label,
            payload: VertexPayload::Statement(procedure, index),
        }
    }

    /// A UI control vertex; identity from the control's own stable key.
    #[must_use]
    pub fn control(decl: UiControlDecl) -> Self {
        let key = decl.key();
        Self {
            id: VertexId(fnv1a64(key.as_bytes())),
            kind: VertexKind::Control,
            label: key,
            payload: VertexPayload::Control(decl),
        }
    }

    /// A vertex rebuilt from an exported graph file; the payload is not
    /// serialized, only what composition and labeling need.
    #[must_use]
    pub fn reimported(id: VertexId, kind: VertexKind, label: String) -> Self {
        Self {
            id,
            kind,
            label,
            payload: VertexPayload::None,
        }
    }

    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn payload(&self) -> &VertexPayload {
        &self.payload
    }

    pub fn as_procedure(&self) -> Option<&ProcedureRef> {
        match &self.payload {
            VertexPayload::Procedure(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_control(&self) -> Option<&UiControlDecl> {
        match &self.payload {
            VertexPayload::Control(c) => Some(c),
            _ => None,
        }
    }
}

/// Transient traversal markers, kept out of the immutable vertex state and
/// owned by the specific traversal that needs them.
#[derive(Debug, Default, Clone)]
pub struct VisitMarks {
    visited: BTreeSet<VertexId>,
    locally_visited: BTreeSet<VertexId>,
}

impl VisitMarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks globally visited; returns `false` if already marked.
    pub fn visit(&mut self, id: VertexId) -> bool {
        self.visited.insert(id)
    }

    pub fn is_visited(&self, id: VertexId) -> bool {
        self.visited.contains(&id)
    }

    /// Marks locally visited; returns `false` if already marked.
    pub fn visit_locally(&mut self, id: VertexId) -> bool {
        self.locally_visited.insert(id)
    }

    pub fn is_locally_visited(&self, id: VertexId) -> bool {
        self.locally_visited.contains(&id)
    }

    /// Clears the local marks only, e.g. between two per-procedure passes.
    pub fn reset_local(&mut self) {
        self.locally_visited.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_a() -> ProcedureRef {
        ProcedureRef::new("com/app/A", "run", "()V")
    }

    #[test]
    fn procedure_identity_is_stable() {
        let v1 = Vertex::procedure(VertexKind::Method, proc_a());
        let v2 = Vertex::procedure(VertexKind::Method, proc_a());
        assert_eq!(v1.id(), v2.id());
        assert_eq!(v1, v2);
    }

    #[test]
    fn equality_ignores_payload_but_not_kind() {
        let v1 = Vertex::procedure(VertexKind::Method, proc_a());
        let v2 = Vertex::reimported(v1.id(), VertexKind::Method, String::from("other label"));
        let v3 = Vertex::reimported(v1.id(), VertexKind::Listener, v1.label().to_string());
        assert_eq!(v1, v2);
        assert_ne!(v1, v3);
    }

    #[test]
    fn statement_identity_depends_on_index() {
        let s0 = Vertex::statement(proc_a(), 0);
        let s1 = Vertex::statement(proc_a(), 1);
        assert_ne!(s0.id(), s1.id());
    }

    #[test]
    fn control_identity_from_key() {
        let c1 = Vertex::control(UiControlDecl::new(1, "btn", 2, "main", "com/app/A"));
        let c2 = Vertex::control(UiControlDecl::new(1, "btn", 2, "main", "com/app/A"));
        let c3 = Vertex::control(UiControlDecl::new(1, "btn", 2, "main", "com/app/B"));
        assert_eq!(c1.id(), c2.id());
        assert_ne!(c1.id(), c3.id());
    }

    #[test]
    fn visit_marks_are_independent() {
        let v = Vertex::procedure(VertexKind::Method, proc_a());
        let mut marks = VisitMarks::new();
        assert!(marks.visit(v.id()));
        assert!(!marks.visit(v.id()));
        assert!(!marks.is_locally_visited(v.id()));
        assert!(marks.visit_locally(v.id()));
        marks.reset_local();
        assert!(!marks.is_locally_visited(v.id()));
        assert!(marks.is_visited(v.id()));
    }
}

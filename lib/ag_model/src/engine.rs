//! The boundary trait between graph fusion and the upstream whole-program
//! analysis engine.
//!
//! Every input the fusion core consumes goes through this trait: call graph
//! edges, entry point and callback discovery, decoded procedure bodies, UI
//! control declarations, and the class hierarchy queries needed by the
//! control linker fallback. All calls are synchronous and blocking; the
//! engine may be slow but is opaque. Determinism of downstream graph
//! construction relies on every returned collection being ordered
//! (`BTreeMap`/`BTreeSet`).

use crate::callbacks::CallbackRecord;
use crate::controls::UiControlDecl;
use crate::refs::{Body, ProcedureRef, StatementKind};
use std::collections::{BTreeMap, BTreeSet};

pub trait AnalysisEngine {
    /// Name of the analyzed program, used for output file naming.
    fn program_name(&self) -> &str;

    /// The whole-program call graph as `(caller, callee)` pairs.
    fn call_graph_edges(&self) -> Vec<(ProcedureRef, ProcedureRef)>;

    /// Whether the given procedure is a framework-driven entry point
    /// (lifecycle method) of the program.
    fn is_entry_point(&self, procedure: &ProcedureRef) -> bool;

    /// Declared callback records, keyed by the declaring class name.
    fn declared_callbacks(&self) -> &BTreeMap<String, BTreeSet<CallbackRecord>>;

    /// The decoded body of a procedure, if its statements are available.
    fn body(&self, procedure: &ProcedureRef) -> Option<&Body>;

    /// Resolved callees at one call site of a procedure body.
    fn callees_at(&self, procedure: &ProcedureRef, index: u32) -> BTreeSet<ProcedureRef> {
        match self.body(procedure).and_then(|body| body.kind_at(index)) {
            Some(StatementKind::Call { targets }) => targets.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Declared UI controls, keyed by the declaring layout file name.
    fn declared_ui_controls(&self) -> &BTreeMap<String, BTreeSet<UiControlDecl>>;

    /// Procedures declared by the given class that have an available body.
    fn procedures_of(&self, class: &str) -> BTreeSet<ProcedureRef>;

    /// Direct superclass of the given class, `None` at the hierarchy root.
    fn superclass_of(&self, class: &str) -> Option<&str>;

    /// Whether the class is a platform/library/phantom member that must not
    /// contribute vertices to the graph.
    fn is_platform_member(&self, class: &str) -> bool;
}

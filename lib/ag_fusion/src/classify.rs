//! Procedure classification into the closed vertex taxonomy, and the
//! inclusion filter deciding which procedures contribute to the graph at all.

use crate::vertex::VertexKind;
use ag_model::{AnalysisEngine, CallbackKind, ProcedureRef};
use std::cell::RefCell;
use std::collections::BTreeMap;

// Parameter types that mark a procedure as a UI event handler even when the
// upstream callback analysis missed it.
const UI_EVENT_PARAM_TYPES: &[&str] = &[
    "Landroid/view/View;",
    "Landroid/view/MenuItem;",
    "Landroid/content/DialogInterface;",
    "Landroid/widget/AdapterView;",
];

// Names injected by the upstream engine to model the framework-driven entry
// point of the program.
const DUMMY_MAIN_CLASS: &str = "dummyMainClass";
const DUMMY_MAIN_METHOD: &str = "dummyMainMethod";

lazy_static::lazy_static! {
    static ref DEFAULT_BLOCKLIST: Vec<String> = [
        "android/",
        "androidx/",
        "com/google/android/",
        "java/",
        "javax/",
        "kotlin/",
        "kotlinx/",
        "sun/",
        ".R$",
        ".BuildConfig",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
}

/// Decides whether a procedure (through its declaring type) may contribute
/// vertices and edges to the graph.
///
/// Blocklist matching rule: an entry starting with `.` matches by substring
/// containment anywhere in the qualified name, any other entry by prefix.
/// Platform/library/phantom members reported by the engine are always
/// excluded.
#[derive(Debug, Clone)]
pub struct InclusionFilter {
    blocklist: Vec<String>,
}

impl Default for InclusionFilter {
    fn default() -> Self {
        Self {
            blocklist: DEFAULT_BLOCKLIST.clone(),
        }
    }
}

impl InclusionFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty filter, platform-member exclusion only.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            blocklist: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocklist.extend(entries.into_iter().map(Into::into));
        self
    }

    fn is_blocklisted(&self, qualified_name: &str) -> bool {
        self.blocklist.iter().any(|entry| {
            if let Some(infix) = entry.strip_prefix('.') {
                qualified_name.contains(infix)
            } else {
                qualified_name.starts_with(entry)
            }
        })
    }

    /// Whether the procedure passes the filter. Applied uniformly before any
    /// vertex creation; an edge with an excluded endpoint is dropped
    /// entirely.
    pub fn includes<E: AnalysisEngine>(&self, procedure: &ProcedureRef, engine: &E) -> bool {
        let class = procedure.class_name();
        !self.is_blocklisted(class)
            && !self.is_blocklisted(&procedure.signature())
            && !engine.is_platform_member(class)
    }
}

/// Assigns each procedure its taxonomy tag, with a per-run memo cache.
///
/// The priority order is evaluated top-down: dummy > lifecycle > listener >
/// callback > method. Lifecycle status comes from the engine's entry point
/// predicate, computed once here and reused by all downstream components.
pub struct Classifier<'e, E: AnalysisEngine> {
    engine: &'e E,
    cache: RefCell<BTreeMap<ProcedureRef, VertexKind>>,
}

impl<'e, E: AnalysisEngine> Classifier<'e, E> {
    #[must_use]
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            cache: RefCell::new(BTreeMap::new()),
        }
    }

    /// Deterministic, total over procedures passing the inclusion filter.
    pub fn classify(&self, procedure: &ProcedureRef) -> VertexKind {
        if let Some(kind) = self.cache.borrow().get(procedure) {
            return *kind;
        }
        let kind = self.compute(procedure);
        self.cache
            .borrow_mut()
            .insert(procedure.clone(), kind);
        kind
    }

    fn compute(&self, procedure: &ProcedureRef) -> VertexKind {
        if is_dummy_entry(procedure) {
            return VertexKind::Dummy;
        }
        if self.engine.is_entry_point(procedure) {
            return VertexKind::Lifecycle;
        }
        match self.declared_callback_kind(procedure) {
            Some(CallbackKind::WidgetEvent) => VertexKind::Listener,
            Some(_) => {
                if takes_ui_event_parameter(procedure) {
                    VertexKind::Listener
                } else {
                    VertexKind::Callback
                }
            }
            None => {
                if takes_ui_event_parameter(procedure) {
                    VertexKind::Listener
                } else {
                    VertexKind::Method
                }
            }
        }
    }

    fn declared_callback_kind(&self, procedure: &ProcedureRef) -> Option<CallbackKind> {
        self.engine
            .declared_callbacks()
            .get(procedure.class_name())
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| r.procedure() == procedure)
                    .map(ag_model::CallbackRecord::kind)
            })
    }
}

fn is_dummy_entry(procedure: &ProcedureRef) -> bool {
    procedure.class_name().contains(DUMMY_MAIN_CLASS)
        || procedure.name().starts_with(DUMMY_MAIN_METHOD)
}

fn takes_ui_event_parameter(procedure: &ProcedureRef) -> bool {
    UI_EVENT_PARAM_TYPES
        .iter()
        .any(|t| procedure.descriptor().contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_model::{CallbackRecord, ProgramSnapshot};

    fn snapshot() -> ProgramSnapshot {
        ProgramSnapshot::new("demo")
    }

    #[test]
    fn blocklist_prefix_and_substring_rules() {
        let filter = InclusionFilter::permissive().with_entries(["com/vendor/", ".Generated"]);
        let engine = snapshot();
        let blocked_prefix = ProcedureRef::new("com/vendor/Lib", "f", "()V");
        let blocked_infix = ProcedureRef::new("com/app/GeneratedProxy", "f", "()V");
        let kept = ProcedureRef::new("com/app/Main", "f", "()V");
        assert!(!filter.includes(&blocked_prefix, &engine));
        assert!(!filter.includes(&blocked_infix, &engine));
        assert!(filter.includes(&kept, &engine));
    }

    #[test]
    fn default_blocklist_excludes_platform_packages() {
        let filter = InclusionFilter::new();
        let engine = snapshot();
        let platform = ProcedureRef::new("android/app/Activity", "onCreate", "()V");
        assert!(!filter.includes(&platform, &engine));
    }

    #[test]
    fn engine_platform_members_are_excluded() {
        let filter = InclusionFilter::permissive();
        let mut engine = snapshot();
        engine.add_platform_class("com/app/Phantom");
        let phantom = ProcedureRef::new("com/app/Phantom", "f", "()V");
        assert!(!filter.includes(&phantom, &engine));
    }

    #[test]
    fn dummy_outranks_lifecycle() {
        let mut engine = snapshot();
        let dummy = ProcedureRef::new("dummyMainClass", "dummyMainMethod", "()V");
        engine.add_entry_point(dummy.clone());
        let classifier = Classifier::new(&engine);
        assert_eq!(classifier.classify(&dummy), VertexKind::Dummy);
    }

    #[test]
    fn lifecycle_outranks_listener() {
        let mut engine = snapshot();
        let on_create =
            ProcedureRef::new("com/app/Main", "onCreate", "(Landroid/os/Bundle;)V");
        engine.add_entry_point(on_create.clone());
        engine.add_callback(
            "com/app/Main",
            CallbackRecord::new(on_create.clone(), CallbackKind::WidgetEvent),
        );
        let classifier = Classifier::new(&engine);
        assert_eq!(classifier.classify(&on_create), VertexKind::Lifecycle);
    }

    #[test]
    fn widget_event_callback_is_listener() {
        let mut engine = snapshot();
        let on_click = ProcedureRef::new("com/app/Main", "handleSend", "()V");
        engine.add_callback(
            "com/app/Main",
            CallbackRecord::new(on_click.clone(), CallbackKind::WidgetEvent),
        );
        let classifier = Classifier::new(&engine);
        assert_eq!(classifier.classify(&on_click), VertexKind::Listener);
    }

    #[test]
    fn ui_event_parameter_promotes_to_listener() {
        let engine = snapshot();
        let handler =
            ProcedureRef::new("com/app/Main", "handleTap", "(Landroid/view/View;)V");
        let classifier = Classifier::new(&engine);
        assert_eq!(classifier.classify(&handler), VertexKind::Listener);
    }

    #[test]
    fn other_declared_callback_is_callback() {
        let mut engine = snapshot();
        let on_low_memory = ProcedureRef::new("com/app/Main", "onLowMemory", "()V");
        engine.add_callback(
            "com/app/Main",
            CallbackRecord::new(on_low_memory.clone(), CallbackKind::Other),
        );
        let classifier = Classifier::new(&engine);
        assert_eq!(classifier.classify(&on_low_memory), VertexKind::Callback);
    }

    #[test]
    fn default_is_method_and_memoized() {
        let engine = snapshot();
        let plain = ProcedureRef::new("com/app/Main", "compute", "(I)I");
        let classifier = Classifier::new(&engine);
        assert_eq!(classifier.classify(&plain), VertexKind::Method);
        // second call hits the memo and stays stable
        assert_eq!(classifier.classify(&plain), VertexKind::Method);
    }
}

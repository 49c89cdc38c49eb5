//! On-disk program snapshot: a JSON export of the upstream analysis results
//! implementing the [`AnalysisEngine`] boundary.
//!
//! The snapshot is a write-once artifact of the upstream engine; this crate
//! only reads it. Tests and engine adapters assemble snapshots in code with
//! the `add_*`/`set_*` mutators.

use crate::callbacks::CallbackRecord;
use crate::controls::UiControlDecl;
use crate::engine::AnalysisEngine;
use crate::errors::{ModelError, ModelResult};
use crate::refs::{Body, ProcedureRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    program: String,
    #[serde(default)]
    call_graph: Vec<(ProcedureRef, ProcedureRef)>,
    #[serde(default)]
    entry_points: BTreeSet<ProcedureRef>,
    /// Declared callbacks keyed by declaring class name.
    #[serde(default)]
    callbacks: BTreeMap<String, BTreeSet<CallbackRecord>>,
    /// Decoded bodies keyed by procedure signature.
    #[serde(default)]
    bodies: BTreeMap<String, Body>,
    /// Declared UI controls keyed by layout file name.
    #[serde(default)]
    ui_controls: BTreeMap<String, BTreeSet<UiControlDecl>>,
    /// Class to direct superclass.
    #[serde(default)]
    hierarchy: BTreeMap<String, String>,
    /// Classes marked platform/library/phantom by the upstream engine.
    #[serde(default)]
    platform_classes: BTreeSet<String>,
}

impl ProgramSnapshot {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            call_graph: Vec::new(),
            entry_points: BTreeSet::new(),
            callbacks: BTreeMap::new(),
            bodies: BTreeMap::new(),
            ui_controls: BTreeMap::new(),
            hierarchy: BTreeMap::new(),
            platform_classes: BTreeSet::new(),
        }
    }

    /// Loads a snapshot from a JSON file produced by the upstream engine.
    pub fn open(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ModelError::SnapshotOpen(path.to_path_buf(), e))?;
        log::debug!("loading program snapshot from {path:?}");
        let snapshot: Self = serde_json::from_reader(BufReader::new(file))?;
        log::info!(
            "snapshot '{}' loaded: {} call edges, {} bodies, {} layouts",
            snapshot.program,
            snapshot.call_graph.len(),
            snapshot.bodies.len(),
            snapshot.ui_controls.len(),
        );
        Ok(snapshot)
    }

    pub fn add_call_edge(&mut self, caller: ProcedureRef, callee: ProcedureRef) {
        self.call_graph.push((caller, callee));
    }

    pub fn add_entry_point(&mut self, procedure: ProcedureRef) {
        self.entry_points.insert(procedure);
    }

    pub fn add_callback(&mut self, class: impl Into<String>, record: CallbackRecord) {
        self.callbacks.entry(class.into()).or_default().insert(record);
    }

    pub fn set_body(&mut self, procedure: &ProcedureRef, body: Body) {
        self.bodies.insert(procedure.signature(), body);
    }

    pub fn add_control(&mut self, layout_file: impl Into<String>, control: UiControlDecl) {
        self.ui_controls
            .entry(layout_file.into())
            .or_default()
            .insert(control);
    }

    pub fn set_superclass(&mut self, class: impl Into<String>, superclass: impl Into<String>) {
        self.hierarchy.insert(class.into(), superclass.into());
    }

    pub fn add_platform_class(&mut self, class: impl Into<String>) {
        self.platform_classes.insert(class.into());
    }
}

impl AnalysisEngine for ProgramSnapshot {
    fn program_name(&self) -> &str {
        &self.program
    }

    fn call_graph_edges(&self) -> Vec<(ProcedureRef, ProcedureRef)> {
        self.call_graph.clone()
    }

    fn is_entry_point(&self, procedure: &ProcedureRef) -> bool {
        self.entry_points.contains(procedure)
    }

    fn declared_callbacks(&self) -> &BTreeMap<String, BTreeSet<CallbackRecord>> {
        &self.callbacks
    }

    fn body(&self, procedure: &ProcedureRef) -> Option<&Body> {
        self.bodies.get(&procedure.signature())
    }

    fn declared_ui_controls(&self) -> &BTreeMap<String, BTreeSet<UiControlDecl>> {
        &self.ui_controls
    }

    fn procedures_of(&self, class: &str) -> BTreeSet<ProcedureRef> {
        let prefix = format!("{class}->");
        self.bodies
            .keys()
            .filter(|sig| sig.starts_with(&prefix))
            .filter_map(|sig| ProcedureRef::parse(sig).ok())
            .collect()
    }

    fn superclass_of(&self, class: &str) -> Option<&str> {
        self.hierarchy.get(class).map(String::as_str)
    }

    fn is_platform_member(&self, class: &str) -> bool {
        self.platform_classes.contains(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::CallbackKind;
    use crate::refs::StatementKind;

    fn on_click() -> ProcedureRef {
        ProcedureRef::new("com/app/MainActivity", "onClick", "(Landroid/view/View;)V")
    }

    #[test]
    fn snapshot_json_round_trip() {
        let mut snap = ProgramSnapshot::new("demo");
        let p = on_click();
        let q = ProcedureRef::new("com/app/Helper", "doWork", "()V");
        snap.add_call_edge(p.clone(), q.clone());
        snap.add_entry_point(p.clone());
        snap.add_callback(
            "com/app/MainActivity",
            CallbackRecord::new(p.clone(), CallbackKind::WidgetEvent),
        );
        snap.set_body(
            &p,
            Body::new()
                .with_statement(0, StatementKind::Other)
                .with_statement(
                    1,
                    StatementKind::Call {
                        targets: BTreeSet::from([q.clone()]),
                    },
                )
                .with_successor(0, 1),
        );
        snap.add_control(
            "res/layout/main.xml",
            UiControlDecl::new(0x7f0b0001, "btn_send", 0x7f030000, "main", "com/app/MainActivity")
                .with_listener_name("onClick"),
        );
        snap.set_superclass("com/app/MainActivity", "android/app/Activity");
        snap.add_platform_class("android/app/Activity");

        let json = serde_json::to_string_pretty(&snap).unwrap();
        let back: ProgramSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.program_name(), "demo");
        assert_eq!(back.call_graph_edges(), vec![(p.clone(), q.clone())]);
        assert!(back.is_entry_point(&p));
        assert_eq!(back.body(&p), snap.body(&p));
        assert_eq!(back.callees_at(&p, 1), BTreeSet::from([q]));
        assert!(back.is_platform_member("android/app/Activity"));
        assert_eq!(
            back.superclass_of("com/app/MainActivity"),
            Some("android/app/Activity")
        );
    }

    #[test]
    fn procedures_of_filters_by_class() {
        let mut snap = ProgramSnapshot::new("demo");
        let p = on_click();
        let other = ProcedureRef::new("com/app/Other", "onClick", "(Landroid/view/View;)V");
        snap.set_body(&p, Body::new().with_statement(0, StatementKind::Other));
        snap.set_body(&other, Body::new().with_statement(0, StatementKind::Other));
        assert_eq!(
            snap.procedures_of("com/app/MainActivity"),
            BTreeSet::from([p])
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let snap: ProgramSnapshot = serde_json::from_str(r#"{"program":"bare"}"#).unwrap();
        assert!(snap.call_graph_edges().is_empty());
        assert!(snap.declared_ui_controls().is_empty());
    }
}

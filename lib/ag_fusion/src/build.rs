//! Assembly of the unified program graph.
//!
//! A state machine over three strictly ordered phases:
//!
//! - **A** — one vertex per filtered procedure of the call graph, plus the
//!   call edges whose both endpoints pass the inclusion filter;
//! - **B** — one `control` vertex and one control→listener edge per listener
//!   with a resolved UI control;
//! - **C** — per-procedure statement subgraphs spliced under their procedure
//!   vertex, with call-site-level edges to the resolved callees.
//!
//! One builder instance owns the graph and the memo caches for exactly one
//! run; independent runs share nothing, which is what makes two runs over
//! the same inputs produce isomorphic graphs.

use crate::classify::{Classifier, InclusionFilter};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::{FusionError, FusionResult};
use crate::graph::{FusedGraph, GraphKind};
use crate::link::ControlLinker;
use crate::vertex::{Vertex, VertexId, VertexKind};
use ag_model::{AnalysisEngine, ProcedureRef, UiControlDecl};
use std::collections::BTreeMap;

/// The result of one complete construction run: the graph and everything
/// non-fatal that was dropped or guessed along the way.
#[derive(Debug)]
pub struct Fusion {
    pub graph: FusedGraph,
    pub diagnostics: Diagnostics,
}

pub struct GraphBuilder<'e, E: AnalysisEngine> {
    engine: &'e E,
    filter: InclusionFilter,
    classifier: Classifier<'e, E>,
    proc_ids: BTreeMap<ProcedureRef, VertexId>,
    stmt_ids: BTreeMap<(ProcedureRef, u32), VertexId>,
    diagnostics: Diagnostics,
}

impl<'e, E: AnalysisEngine> GraphBuilder<'e, E> {
    #[must_use]
    pub fn new(engine: &'e E, filter: InclusionFilter) -> Self {
        Self {
            engine,
            filter,
            classifier: Classifier::new(engine),
            proc_ids: BTreeMap::new(),
            stmt_ids: BTreeMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Builds the procedure-level call graph only (phase A). Consumes the
    /// builder: caches never outlive one run.
    pub fn build_calls(mut self) -> FusionResult<Fusion> {
        let mut graph = FusedGraph::new(self.engine.program_name(), GraphKind::Calls);
        self.splice_call_edges(&mut graph)?;
        Ok(Fusion {
            graph,
            diagnostics: self.diagnostics,
        })
    }

    /// Builds the fused graph: phases A, B and C in order.
    pub fn build(mut self) -> FusionResult<Fusion> {
        let mut graph = FusedGraph::new(self.engine.program_name(), GraphKind::Fused);
        self.splice_call_edges(&mut graph)?;
        self.splice_controls(&mut graph)?;
        self.expand_bodies(&mut graph)?;
        log::info!(
            "fused graph for '{}': {} vertices, {} edges, {} diagnostic(s)",
            graph.program(),
            graph.nb_vertices(),
            graph.nb_edges(),
            self.diagnostics.len(),
        );
        Ok(Fusion {
            graph,
            diagnostics: self.diagnostics,
        })
    }

    /// Phase A.
    fn splice_call_edges(&mut self, graph: &mut FusedGraph) -> FusionResult<()> {
        let edges = self.engine.call_graph_edges();
        if edges.is_empty() {
            return Err(FusionError::EmptyCallGraph);
        }
        let mut kept = 0usize;
        for (caller, callee) in edges {
            if !self.filter.includes(&caller, self.engine)
                || !self.filter.includes(&callee, self.engine)
            {
                // an edge with an excluded endpoint is dropped entirely
                log::trace!("dropping call edge {caller} -> {callee} (filtered endpoint)");
                continue;
            }
            let src = self.ensure_procedure(graph, &caller)?;
            let dst = self.ensure_procedure(graph, &callee)?;
            graph.add_edge(src, dst)?;
            kept += 1;
        }
        log::debug!("phase A: {kept} call edge(s) kept");
        Ok(())
    }

    /// Phase B.
    fn splice_controls(&mut self, graph: &mut FusedGraph) -> FusionResult<()> {
        let controls: Vec<UiControlDecl> = self
            .engine
            .declared_ui_controls()
            .values()
            .flatten()
            .cloned()
            .collect();
        let candidates: Vec<ProcedureRef> = graph
            .iter_vertices()
            .filter(|v| v.kind() == VertexKind::Listener)
            .filter_map(|v| v.as_procedure().cloned())
            .collect();

        let outcome = ControlLinker::new(self.engine).link(&controls, &candidates);

        for (control, listener) in outcome.resolved() {
            let Some(listener_id) = self.proc_ids.get(listener).copied() else {
                // resolved against a candidate that lost its vertex: a
                // builder contract violation, not an input problem
                return Err(FusionError::StructuralDefect(format!(
                    "resolved listener {listener} has no vertex"
                )));
            };
            let control_id = graph.ensure_vertex(Vertex::control(control.clone()))?;
            graph.add_edge(control_id, listener_id)?;
        }
        for listener in &candidates {
            if outcome.control_of(listener).is_none() {
                self.diagnostics.push(Diagnostic::UnlinkedListener {
                    listener: listener.clone(),
                });
            }
        }
        self.diagnostics.merge(outcome.into_diagnostics());
        Ok(())
    }

    /// Phase C.
    fn expand_bodies(&mut self, graph: &mut FusedGraph) -> FusionResult<()> {
        // snapshot the procedure vertices present after phases A/B; the
        // statement vertices added below must not re-enter the loop
        let procedures: Vec<(ProcedureRef, VertexId, VertexKind)> = graph
            .iter_vertices()
            .filter_map(|v| {
                v.as_procedure()
                    .map(|p| (p.clone(), v.id(), v.kind()))
            })
            .collect();

        for (procedure, vertex_id, kind) in procedures {
            match kind {
                k if k.is_expandable() => {
                    self.expand_one(graph, &procedure, vertex_id)?;
                }
                VertexKind::Dummy => {} // synthetic entries have no real body
                VertexKind::Callback => {
                    // in the closed taxonomy but outside the expandable set:
                    // a classification defect to report, not to swallow
                    self.diagnostics.push(Diagnostic::ClassificationDefect {
                        procedure: procedure.clone(),
                        detail: String::from("callback vertex reached body expansion"),
                    });
                }
                k => {
                    return Err(FusionError::StructuralDefect(format!(
                        "procedure vertex {vertex_id} with non-procedure kind {k}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn expand_one(
        &mut self,
        graph: &mut FusedGraph,
        procedure: &ProcedureRef,
        procedure_vertex: VertexId,
    ) -> FusionResult<()> {
        let engine = self.engine;
        let Some(body) = engine.body(procedure) else {
            return Ok(());
        };
        if body.is_empty() {
            return Ok(());
        }

        for (index, _) in body.iter_statements() {
            self.ensure_statement(graph, procedure, index)?;
        }
        for (from, to) in body.iter_successor_pairs() {
            let src = self.stmt_ids.get(&(procedure.clone(), from)).copied();
            let dst = self.stmt_ids.get(&(procedure.clone(), to)).copied();
            let (Some(src), Some(dst)) = (src, dst) else {
                // successor arc to an index with no statement record
                log::warn!("ignoring successor arc {from} -> {to} in {procedure}");
                continue;
            };
            graph.add_edge(src, dst)?;
        }
        // one edge from the procedure vertex to each subgraph entry point
        for entry in body.entry_indices() {
            let dst = self.stmt_ids[&(procedure.clone(), entry)];
            graph.add_edge(procedure_vertex, dst)?;
        }
        // call-site-level edges to each resolved callee entry vertex
        for (index, targets) in body.iter_call_sites() {
            let site = self.stmt_ids[&(procedure.clone(), index)];
            for callee in targets {
                if !self.filter.includes(callee, self.engine) {
                    continue;
                }
                let callee_id = self.ensure_procedure(graph, callee)?;
                graph.add_edge(site, callee_id)?;
            }
        }
        Ok(())
    }

    /// Memoized procedure vertex creation: the identity is computed once
    /// from the procedure's own signature and reused on every encounter.
    fn ensure_procedure(
        &mut self,
        graph: &mut FusedGraph,
        procedure: &ProcedureRef,
    ) -> FusionResult<VertexId> {
        if let Some(id) = self.proc_ids.get(procedure) {
            return Ok(*id);
        }
        let kind = self.classifier.classify(procedure);
        let id = graph.ensure_vertex(Vertex::procedure(kind, procedure.clone()))?;
        self.proc_ids.insert(procedure.clone(), id);
        Ok(id)
    }

    fn ensure_statement(
        &mut self,
        graph: &mut FusedGraph,
        procedure: &ProcedureRef,
        index: u32,
    ) -> FusionResult<VertexId> {
        let key = (procedure.clone(), index);
        if let Some(id) = self.stmt_ids.get(&key) {
            return Ok(*id);
        }
        let id = graph.ensure_vertex(Vertex::statement(procedure.clone(), index))?;
        self.stmt_ids.insert(key, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;
    use ag_model::{Body, CallbackKind, CallbackRecord, ProgramSnapshot, StatementKind};
    use std::collections::BTreeSet;

    const SCREEN: &str = "com/app/MainActivity";

    fn lifecycle() -> ProcedureRef {
        ProcedureRef::new(SCREEN, "onCreate", "(Landroid/os/Bundle;)V")
    }

    fn helper() -> ProcedureRef {
        ProcedureRef::new("com/app/Helper", "doWork", "()V")
    }

    fn on_click() -> ProcedureRef {
        ProcedureRef::new(SCREEN, "onClick", "(Landroid/view/View;)V")
    }

    fn base_snapshot() -> ProgramSnapshot {
        let mut snap = ProgramSnapshot::new("demo");
        snap.add_entry_point(lifecycle());
        snap.add_call_edge(lifecycle(), helper());
        snap
    }

    #[test]
    fn empty_call_graph_fails_fast() {
        let snap = ProgramSnapshot::new("empty");
        let builder = GraphBuilder::new(&snap, InclusionFilter::permissive());
        assert!(matches!(builder.build(), Err(FusionError::EmptyCallGraph)));
    }

    #[test]
    fn blocklisted_callee_drops_edge_and_vertex() {
        // scenario: P lifecycle, P -> Q with Q blocklisted; the graph has P
        // only, no edge, no vertex for Q
        let snap = base_snapshot();
        let filter = InclusionFilter::permissive().with_entries(["com/app/Helper"]);
        let fusion = GraphBuilder::new(&snap, filter).build().unwrap();
        assert_eq!(fusion.graph.nb_vertices(), 1);
        assert_eq!(fusion.graph.nb_edges(), 0);
        let only = fusion.graph.iter_vertices().next().unwrap();
        assert_eq!(only.kind(), VertexKind::Lifecycle);
        assert_eq!(only.as_procedure(), Some(&lifecycle()));
    }

    #[test]
    fn filter_soundness_over_the_whole_graph() {
        let mut snap = base_snapshot();
        snap.add_call_edge(helper(), ProcedureRef::new("android/util/Log", "d", "()I"));
        let fusion = GraphBuilder::new(&snap, InclusionFilter::new()).build().unwrap();
        for vertex in fusion.graph.iter_vertices() {
            if let Some(p) = vertex.as_procedure() {
                assert!(!p.class_name().starts_with("android/"));
            }
        }
    }

    #[test]
    fn resolved_control_gets_vertex_and_edge() {
        // scenario: a control declares "onClick", exactly one candidate on
        // the owning screen; phase B adds a control vertex and one edge
        let mut snap = base_snapshot();
        snap.add_call_edge(on_click(), helper());
        snap.add_callback(
            SCREEN,
            CallbackRecord::new(on_click(), CallbackKind::WidgetEvent),
        );
        let control =
            UiControlDecl::new(0x7f0b0001, "btn_send", 0x7f030000, "main", SCREEN)
                .with_listener_name("onClick");
        snap.add_control("res/layout/main.xml", control.clone());

        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        let composition = Composition::of(&fusion.graph);
        assert_eq!(composition.controls(), 1);
        assert_eq!(composition.listeners(), 1);

        let control_vertex = Vertex::control(control);
        let listener_vertex = fusion
            .graph
            .iter_vertices()
            .find(|v| v.kind() == VertexKind::Listener)
            .unwrap();
        assert!(fusion
            .graph
            .edge_set()
            .contains(&(control_vertex.id(), listener_vertex.id())));
    }

    #[test]
    fn unresolved_control_creates_no_vertex() {
        // scenario: no declared name and no recoverable token anywhere
        let mut snap = base_snapshot();
        snap.add_call_edge(on_click(), helper());
        snap.add_callback(
            SCREEN,
            CallbackRecord::new(on_click(), CallbackKind::WidgetEvent),
        );
        snap.add_control(
            "res/layout/main.xml",
            UiControlDecl::new(0x7f0b0002, "btn_lost", 0x7f030000, "main", SCREEN),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        assert_eq!(Composition::of(&fusion.graph).controls(), 0);
        assert!(fusion
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::UnresolvedControl { .. })));
    }

    #[test]
    fn body_expansion_splices_statements_and_call_sites() {
        let mut snap = base_snapshot();
        snap.set_body(
            &lifecycle(),
            Body::new()
                .with_statement(0, StatementKind::Other)
                .with_statement(
                    1,
                    StatementKind::Call {
                        targets: BTreeSet::from([helper()]),
                    },
                )
                .with_successor(0, 1),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        let graph = &fusion.graph;
        assert_eq!(Composition::of(graph).statements(), 2);

        let p = Vertex::procedure(VertexKind::Lifecycle, lifecycle());
        let s0 = Vertex::statement(lifecycle(), 0);
        let s1 = Vertex::statement(lifecycle(), 1);
        let q = Vertex::procedure(VertexKind::Method, helper());
        let edges = graph.edge_set();
        // procedure -> entry statement, successor arc, call-site -> callee,
        // plus the phase A procedure-level edge
        assert!(edges.contains(&(p.id(), s0.id())));
        assert!(edges.contains(&(s0.id(), s1.id())));
        assert!(edges.contains(&(s1.id(), q.id())));
        assert!(edges.contains(&(p.id(), q.id())));
    }

    #[test]
    fn call_site_to_filtered_callee_is_dropped() {
        let mut snap = base_snapshot();
        let platform = ProcedureRef::new("android/util/Log", "d", "()I");
        snap.set_body(
            &lifecycle(),
            Body::new().with_statement(
                0,
                StatementKind::Call {
                    targets: BTreeSet::from([platform.clone()]),
                },
            ),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::new())
            .build()
            .unwrap();
        assert!(fusion
            .graph
            .iter_vertices()
            .all(|v| v.as_procedure() != Some(&platform)));
    }

    #[test]
    fn determinism_two_runs_same_identity_and_edge_sets() {
        let mut snap = base_snapshot();
        snap.add_call_edge(on_click(), helper());
        snap.add_callback(
            SCREEN,
            CallbackRecord::new(on_click(), CallbackKind::WidgetEvent),
        );
        snap.add_control(
            "res/layout/main.xml",
            UiControlDecl::new(1, "btn", 2, "main", SCREEN).with_listener_name("onClick"),
        );
        snap.set_body(
            &on_click(),
            Body::new()
                .with_statement(0, StatementKind::Other)
                .with_statement(1, StatementKind::Other)
                .with_successor(0, 1),
        );

        let run1 = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        let run2 = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        assert_eq!(run1.graph.vertex_ids(), run2.graph.vertex_ids());
        assert_eq!(run1.graph.edge_set(), run2.graph.edge_set());
    }

    #[test]
    fn no_dangling_edges_after_full_build() {
        let mut snap = base_snapshot();
        snap.set_body(
            &lifecycle(),
            Body::new()
                .with_statement(0, StatementKind::Other)
                .with_statement(1, StatementKind::Other)
                .with_successor(0, 1),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        let ids = fusion.graph.vertex_ids();
        for (a, b) in fusion.graph.iter_edges() {
            assert!(ids.contains(&a));
            assert!(ids.contains(&b));
        }
    }

    #[test]
    fn ambiguity_scenario_reports_exactly_one_entry() {
        // scenario: two procedures named onClick on the same screen, one
        // declared-name control
        let mut snap = base_snapshot();
        let menu_click = ProcedureRef::new(SCREEN, "onClick", "(Landroid/view/MenuItem;)V");
        snap.add_call_edge(on_click(), helper());
        snap.add_call_edge(menu_click.clone(), helper());
        snap.add_callback(
            SCREEN,
            CallbackRecord::new(on_click(), CallbackKind::WidgetEvent),
        );
        snap.add_callback(
            SCREEN,
            CallbackRecord::new(menu_click, CallbackKind::WidgetEvent),
        );
        snap.add_control(
            "res/layout/main.xml",
            UiControlDecl::new(1, "btn", 2, "main", SCREEN).with_listener_name("onClick"),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        assert_eq!(fusion.diagnostics.count_ambiguities(), 1);
        assert_eq!(Composition::of(&fusion.graph).controls(), 1);
    }

    #[test]
    fn callback_vertex_at_expansion_is_a_reported_defect() {
        // a declared non-widget callback lands in the graph through a call
        // edge; its body must not be expanded and the defect must surface
        let mut snap = base_snapshot();
        let on_low_memory = ProcedureRef::new(SCREEN, "onLowMemory", "()V");
        snap.add_call_edge(on_low_memory.clone(), helper());
        snap.add_callback(
            SCREEN,
            CallbackRecord::new(on_low_memory.clone(), CallbackKind::Other),
        );
        snap.set_body(
            &on_low_memory,
            Body::new().with_statement(0, StatementKind::Other),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build()
            .unwrap();
        assert_eq!(
            fusion
                .diagnostics
                .iter()
                .filter(|d| matches!(d, Diagnostic::ClassificationDefect { .. }))
                .count(),
            1
        );
        let composition = Composition::of(&fusion.graph);
        assert_eq!(composition.callbacks(), 1);
        assert_eq!(composition.statements(), 0);
    }

    #[test]
    fn calls_graph_has_no_statements_or_controls() {
        let mut snap = base_snapshot();
        snap.set_body(
            &lifecycle(),
            Body::new().with_statement(0, StatementKind::Other),
        );
        let fusion = GraphBuilder::new(&snap, InclusionFilter::permissive())
            .build_calls()
            .unwrap();
        assert_eq!(fusion.graph.kind(), GraphKind::Calls);
        let composition = Composition::of(&fusion.graph);
        assert_eq!(composition.statements(), 0);
        assert_eq!(composition.controls(), 0);
        assert_eq!(composition.lifecycles(), 1);
        assert_eq!(composition.methods(), 1);
    }
}

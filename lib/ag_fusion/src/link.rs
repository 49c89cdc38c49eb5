//! Control-to-listener linking.
//!
//! Matches declared UI controls to the procedures invoked when they fire,
//! with a three-stage strategy applied in order, each stage removing matched
//! items from the working sets:
//!
//! 1. declared listener name, searched on the screen owning the control;
//! 2. numeric identifier recovery from diagnostic call side channels in the
//!    remaining candidate bodies;
//! 3. structural fallback: re-derive the owning screen by searching the
//!    screen's (and recursively its superclasses') bodies for a
//!    view-construction of the control's layout.
//!
//! Every control and every candidate ends the pass in exactly one of
//! {resolved, unresolved}; ambiguity is reported, never fatal.

use crate::diagnostics::{Diagnostic, Diagnostics};
use ag_model::{AnalysisEngine, ProcedureRef, UiControlDecl};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

lazy_static::lazy_static! {
    // `text-id:numeric-id` or bare `numeric-id`
    static ref ID_TOKEN: Regex =
        Regex::new(r"^\s*(?:([A-Za-z_][A-Za-z0-9_./$]*):)?([0-9]+)\s*$").unwrap();
}

/// The complete accounting of one linking pass.
#[derive(Debug, Default)]
pub struct LinkOutcome {
    resolved: Vec<(UiControlDecl, ProcedureRef)>,
    unresolved_controls: Vec<UiControlDecl>,
    unresolved_listeners: Vec<ProcedureRef>,
    diagnostics: Diagnostics,
}

impl LinkOutcome {
    pub fn resolved(&self) -> &[(UiControlDecl, ProcedureRef)] {
        &self.resolved
    }

    pub fn unresolved_controls(&self) -> &[UiControlDecl] {
        &self.unresolved_controls
    }

    pub fn unresolved_listeners(&self) -> &[ProcedureRef] {
        &self.unresolved_listeners
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// The procedure a control resolved to, if any.
    pub fn listener_of(&self, control: &UiControlDecl) -> Option<&ProcedureRef> {
        self.resolved
            .iter()
            .find(|(c, _)| c == control)
            .map(|(_, p)| p)
    }

    /// The control a listener resolved from, if any.
    pub fn control_of(&self, listener: &ProcedureRef) -> Option<&UiControlDecl> {
        self.resolved
            .iter()
            .find(|(_, p)| p == listener)
            .map(|(c, _)| c)
    }
}

pub struct ControlLinker<'e, E: AnalysisEngine> {
    engine: &'e E,
}

impl<'e, E: AnalysisEngine> ControlLinker<'e, E> {
    #[must_use]
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Runs the three stages over the given controls and candidate
    /// listeners. Inputs are re-sorted internally, so iteration order of the
    /// caller does not leak into the result.
    pub fn link(
        &self,
        controls: &[UiControlDecl],
        candidates: &[ProcedureRef],
    ) -> LinkOutcome {
        let mut outcome = LinkOutcome::default();
        let mut remaining_controls: Vec<UiControlDecl> = controls.to_vec();
        remaining_controls.sort();
        remaining_controls.dedup();
        let mut remaining: BTreeSet<ProcedureRef> = candidates.iter().cloned().collect();

        log::debug!(
            "linking {} control(s) against {} candidate listener(s)",
            remaining_controls.len(),
            remaining.len()
        );

        self.match_declared_names(&mut remaining_controls, &mut remaining, &mut outcome);
        self.match_recovered_ids(&mut remaining_controls, &mut remaining, &mut outcome);
        self.match_structural(&mut remaining_controls, &mut remaining, &mut outcome);

        for control in remaining_controls {
            outcome.diagnostics.push(Diagnostic::UnresolvedControl {
                control: control.clone(),
            });
            outcome.unresolved_controls.push(control);
        }
        for listener in remaining {
            outcome.diagnostics.push(Diagnostic::UnresolvedListener {
                listener: listener.clone(),
            });
            outcome.unresolved_listeners.push(listener);
        }
        outcome
    }

    /// Stage 1: declared listener name against candidates declared on (or
    /// inherited by) the owning screen.
    fn match_declared_names(
        &self,
        remaining_controls: &mut Vec<UiControlDecl>,
        remaining: &mut BTreeSet<ProcedureRef>,
        outcome: &mut LinkOutcome,
    ) {
        let mut still_unmatched = Vec::new();
        for control in remaining_controls.drain(..) {
            let Some(name) = control.listener_name() else {
                still_unmatched.push(control);
                continue;
            };
            let matches: Vec<ProcedureRef> = remaining
                .iter()
                .filter(|p| p.name() == name && self.is_on_screen(p, control.screen()))
                .cloned()
                .collect();
            if !self.bind_first(&control, matches, remaining, outcome) {
                still_unmatched.push(control);
            }
        }
        *remaining_controls = still_unmatched;
    }

    /// Stage 2: for controls with no declared name, recover numeric control
    /// identifiers from diagnostic call side channels in the remaining
    /// candidate bodies.
    fn match_recovered_ids(
        &self,
        remaining_controls: &mut Vec<UiControlDecl>,
        remaining: &mut BTreeSet<ProcedureRef>,
        outcome: &mut LinkOutcome,
    ) {
        let recovered = self.recover_ids(remaining, &mut outcome.diagnostics);
        let mut still_unmatched = Vec::new();
        for control in remaining_controls.drain(..) {
            if control.listener_name().is_some() {
                // declared-name controls already had their chance in stage 1
                still_unmatched.push(control);
                continue;
            }
            let matches: Vec<ProcedureRef> = recovered
                .iter()
                .filter(|(p, ids)| remaining.contains(*p) && ids.contains(&control.resource_id()))
                .map(|(p, _)| p.clone())
                .collect();
            if !self.bind_first(&control, matches, remaining, outcome) {
                still_unmatched.push(control);
            }
        }
        *remaining_controls = still_unmatched;
    }

    /// Stage 3: re-derive the owning screen by searching the declared
    /// screen's and its superclasses' bodies for a view-construction of the
    /// control's layout, then retry the match against that screen.
    fn match_structural(
        &self,
        remaining_controls: &mut Vec<UiControlDecl>,
        remaining: &mut BTreeSet<ProcedureRef>,
        outcome: &mut LinkOutcome,
    ) {
        let mut still_unmatched = Vec::new();
        for control in remaining_controls.drain(..) {
            let Some(owner) = self.find_layout_owner(control.screen(), control.layout_id()) else {
                still_unmatched.push(control);
                continue;
            };
            log::debug!(
                "structural fallback re-derived screen {owner} for control {control}"
            );
            let matches: Vec<ProcedureRef> = remaining
                .iter()
                .filter(|p| {
                    self.is_on_screen(p, &owner)
                        && control
                            .listener_name()
                            .map_or(true, |name| p.name() == name)
                })
                .cloned()
                .collect();
            if !self.bind_first(&control, matches, remaining, outcome) {
                still_unmatched.push(control);
            }
        }
        *remaining_controls = still_unmatched;
    }

    /// Binds the control to the first match in deterministic order,
    /// reporting ambiguity when several candidates matched. Returns whether
    /// a binding was made.
    fn bind_first(
        &self,
        control: &UiControlDecl,
        matches: Vec<ProcedureRef>,
        remaining: &mut BTreeSet<ProcedureRef>,
        outcome: &mut LinkOutcome,
    ) -> bool {
        let Some(chosen) = matches.first().cloned() else {
            return false;
        };
        if matches.len() > 1 {
            outcome
                .diagnostics
                .push(Diagnostic::AmbiguousControlBinding {
                    control: control.clone(),
                    chosen: chosen.clone(),
                    discarded: matches[1..].to_vec(),
                });
        }
        remaining.remove(&chosen);
        outcome.resolved.push((control.clone(), chosen));
        true
    }

    /// Whether the procedure is declared in the given screen class or one of
    /// its superclasses (a listener attached to the screen by inheritance).
    fn is_on_screen(&self, procedure: &ProcedureRef, screen: &str) -> bool {
        let mut current = Some(screen);
        while let Some(class) = current {
            if procedure.class_name() == class {
                return true;
            }
            current = self.engine.superclass_of(class);
        }
        false
    }

    /// Recovered `resource-id` values per candidate, parsed from diagnostic
    /// call constant strings. A digit-bearing message that fails to parse is
    /// a reportable condition, not an abort.
    fn recover_ids(
        &self,
        candidates: &BTreeSet<ProcedureRef>,
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<ProcedureRef, BTreeSet<u32>> {
        let mut recovered = BTreeMap::new();
        for candidate in candidates {
            let Some(body) = self.engine.body(candidate) else {
                continue;
            };
            for (_, message) in body.iter_diagnostics() {
                match parse_id_token(message) {
                    Some(id) => {
                        recovered
                            .entry(candidate.clone())
                            .or_insert_with(BTreeSet::new)
                            .insert(id);
                    }
                    None if message.chars().any(|c| c.is_ascii_digit()) => {
                        diagnostics.push(Diagnostic::UnparsableIdToken {
                            listener: candidate.clone(),
                            token: message.to_string(),
                        });
                    }
                    None => {} // ordinary log chatter
                }
            }
        }
        recovered
    }

    /// Walks the superclass chain from `screen` looking for the class whose
    /// bodies construct the given layout. Terminates at the hierarchy root.
    fn find_layout_owner(&self, screen: &str, layout_id: u32) -> Option<String> {
        let mut current = Some(screen.to_string());
        while let Some(class) = current {
            for procedure in self.engine.procedures_of(&class) {
                let Some(body) = self.engine.body(&procedure) else {
                    continue;
                };
                if body
                    .iter_view_constructs()
                    .any(|(_, _, layout)| layout == layout_id)
                {
                    return Some(class);
                }
            }
            current = self.engine.superclass_of(&class).map(ToString::to_string);
        }
        None
    }
}

fn parse_id_token(message: &str) -> Option<u32> {
    let captures = ID_TOKEN.captures(message)?;
    captures[2].parse().ok()
}

//! Non-fatal diagnostics of a graph construction run.
//!
//! A run either completes with a full graph plus this list, or aborts with a
//! precondition/structural error; it never silently truncates its output.

use ag_model::{ProcedureRef, UiControlDecl};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A declared control for which no listener could be found by any stage.
    UnresolvedControl { control: UiControlDecl },
    /// A candidate listener no control ended up bound to.
    UnresolvedListener { listener: ProcedureRef },
    /// Several candidate listeners matched one control; the first in
    /// deterministic order was picked.
    AmbiguousControlBinding {
        control: UiControlDecl,
        chosen: ProcedureRef,
        discarded: Vec<ProcedureRef>,
    },
    /// A recoverable identifier token that did not parse.
    UnparsableIdToken {
        listener: ProcedureRef,
        token: String,
    },
    /// A listener vertex that reached graph assembly without a resolved
    /// control.
    UnlinkedListener { listener: ProcedureRef },
    /// A vertex whose kind should not have reached intraprocedural
    /// expansion.
    ClassificationDefect {
        procedure: ProcedureRef,
        detail: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnresolvedControl { control } => {
                write!(f, "unresolved control {control}")
            }
            Self::UnresolvedListener { listener } => {
                write!(f, "unresolved listener {listener}")
            }
            Self::AmbiguousControlBinding {
                control,
                chosen,
                discarded,
            } => write!(
                f,
                "ambiguous binding for control {control}: picked {chosen}, discarded {} other(s)",
                discarded.len()
            ),
            Self::UnparsableIdToken { listener, token } => {
                write!(f, "unparsable id token {token:?} in {listener}")
            }
            Self::UnlinkedListener { listener } => {
                write!(f, "listener {listener} has no resolved control")
            }
            Self::ClassificationDefect { procedure, detail } => {
                write!(f, "classification defect on {procedure}: {detail}")
            }
        }
    }
}

/// The ordered diagnostics list of one run. Every push is also logged.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.items.push(diagnostic);
    }

    pub fn merge(&mut self, mut other: Self) {
        self.items.append(&mut other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_ambiguities(&self) -> usize {
        self.items
            .iter()
            .filter(|d| matches!(d, Diagnostic::AmbiguousControlBinding { .. }))
            .count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

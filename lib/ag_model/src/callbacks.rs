//! Declared callback records, as discovered by the upstream entry point and
//! callback analysis.

use crate::refs::ProcedureRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of framework callback a declared record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    /// The callback is fired by a widget event (click, touch, menu select).
    WidgetEvent,
    /// The callback is part of a component lifecycle.
    Lifecycle,
    /// Any other framework-driven callback.
    Other,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::WidgetEvent => write!(f, "widget-event"),
            Self::Lifecycle => write!(f, "lifecycle"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One declared callback: the procedure registered with the framework and
/// the kind of event that drives it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallbackRecord {
    procedure: ProcedureRef,
    kind: CallbackKind,
}

impl CallbackRecord {
    pub fn new(procedure: ProcedureRef, kind: CallbackKind) -> Self {
        Self { procedure, kind }
    }

    #[inline]
    pub fn procedure(&self) -> &ProcedureRef {
        &self.procedure
    }

    #[inline]
    pub fn kind(&self) -> CallbackKind {
        self.kind
    }
}

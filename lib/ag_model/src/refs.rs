//! References to procedures and statements of the analyzed program.
//!
//! A [`ProcedureRef`] is the stable identity of one analyzable unit of code;
//! the upstream engine decodes each procedure body into a [`Body`]: an
//! index-keyed set of [`StatementKind`]s plus the intraprocedural successor
//! relation between indices.

use crate::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A wrapper that caches the names and types identifying a procedure and
/// allows deriving of eq and ord traits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcedureRef {
    class: String,
    name: String,
    descriptor: String,
}

impl fmt::Display for ProcedureRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}{}", self.class, self.name, self.descriptor)
    }
}

impl ProcedureRef {
    pub fn new(
        class: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The full signature, also used as map key in the snapshot format.
    #[must_use]
    pub fn signature(&self) -> String {
        self.to_string()
    }

    /// Parses a signature back into its components (`Class->name(args)ret`).
    pub fn parse(signature: &str) -> ModelResult<Self> {
        let (class, rest) = signature
            .split_once("->")
            .ok_or_else(|| ModelError::BadSignature(signature.to_string()))?;
        let paren = rest
            .find('(')
            .ok_or_else(|| ModelError::BadSignature(signature.to_string()))?;
        Ok(Self::new(class, &rest[..paren], &rest[paren..]))
    }
}

/// The kind of view-construction call recognized by the upstream decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewConstructKind {
    SetContentView,
    Inflate,
    RemoteViews,
}

/// One decoded statement of a procedure body.
///
/// The decoding is intentionally shallow: graph fusion only needs to know
/// where the call sites are and to see through two side channels (constant
/// strings handed to diagnostic calls, constant layout arguments handed to
/// view-construction calls).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StatementKind {
    /// A call site, with the callee set already resolved by the engine.
    Call { targets: BTreeSet<ProcedureRef> },
    /// A diagnostic/logging call whose constant string argument is visible.
    Diagnostic { message: String },
    /// A view-construction call with a resolved constant layout argument.
    ViewConstruct {
        method: ViewConstructKind,
        layout_const: u32,
    },
    /// Anything else; only its position in the successor relation matters.
    Other,
}

/// A decoded procedure body: statements keyed by index, plus the successor
/// relation between indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    statements: BTreeMap<u32, StatementKind>,
    successors: BTreeMap<u32, BTreeSet<u32>>,
}

impl Body {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a statement at the given index, returning `self` so bodies
    /// can be assembled fluently by engine adapters and tests.
    #[must_use]
    pub fn with_statement(mut self, index: u32, kind: StatementKind) -> Self {
        self.statements.insert(index, kind);
        self
    }

    /// Records a successor arc between two statement indices.
    #[must_use]
    pub fn with_successor(mut self, from: u32, to: u32) -> Self {
        self.successors.entry(from).or_default().insert(to);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    #[inline]
    pub fn iter_statements(&self) -> impl Iterator<Item = (u32, &StatementKind)> {
        self.statements.iter().map(|(i, k)| (*i, k))
    }

    pub fn kind_at(&self, index: u32) -> Option<&StatementKind> {
        self.statements.get(&index)
    }

    pub fn iter_successor_pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.successors
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
    }

    /// Statement indices with no incoming successor arc, i.e. the entry
    /// points of the intraprocedural subgraph.
    #[must_use]
    pub fn entry_indices(&self) -> BTreeSet<u32> {
        let targets: BTreeSet<u32> = self.successors.values().flatten().copied().collect();
        self.statements
            .keys()
            .filter(|i| !targets.contains(i))
            .copied()
            .collect()
    }

    /// Iterates over the call sites of the body with their resolved callees.
    pub fn iter_call_sites(&self) -> impl Iterator<Item = (u32, &BTreeSet<ProcedureRef>)> {
        self.statements.iter().filter_map(|(i, k)| match k {
            StatementKind::Call { targets } => Some((*i, targets)),
            _ => None,
        })
    }

    /// Iterates over the diagnostic call constant strings of the body.
    pub fn iter_diagnostics(&self) -> impl Iterator<Item = (u32, &str)> {
        self.statements.iter().filter_map(|(i, k)| match k {
            StatementKind::Diagnostic { message } => Some((*i, message.as_str())),
            _ => None,
        })
    }

    /// Iterates over the view-construction sites of the body.
    pub fn iter_view_constructs(&self) -> impl Iterator<Item = (u32, ViewConstructKind, u32)> + '_ {
        self.statements.iter().filter_map(|(i, k)| match k {
            StatementKind::ViewConstruct {
                method,
                layout_const,
            } => Some((*i, *method, *layout_const)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let p = ProcedureRef::new("com/app/MainActivity", "onCreate", "(Landroid/os/Bundle;)V");
        assert_eq!(
            p.signature(),
            "com/app/MainActivity->onCreate(Landroid/os/Bundle;)V"
        );
        assert_eq!(ProcedureRef::parse(&p.signature()).unwrap(), p);
    }

    #[test]
    fn signature_parse_rejects_garbage() {
        assert!(ProcedureRef::parse("no separator here").is_err());
        assert!(ProcedureRef::parse("Class->nameWithoutParens").is_err());
    }

    #[test]
    fn entry_indices_ignore_targets() {
        let body = Body::new()
            .with_statement(0, StatementKind::Other)
            .with_statement(1, StatementKind::Other)
            .with_statement(2, StatementKind::Other)
            .with_successor(0, 1)
            .with_successor(1, 2);
        assert_eq!(body.entry_indices(), BTreeSet::from([0]));
    }

    #[test]
    fn entry_indices_of_disconnected_statements() {
        let body = Body::new()
            .with_statement(0, StatementKind::Other)
            .with_statement(5, StatementKind::Other);
        assert_eq!(body.entry_indices(), BTreeSet::from([0, 5]));
    }
}

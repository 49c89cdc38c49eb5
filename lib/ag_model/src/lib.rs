//! This crate provides the input data model of the `AppGraph` project:
//! references to the entities of an analyzed program (procedures, statements,
//! declared UI controls, declared callbacks), the [`AnalysisEngine`] boundary
//! trait through which graph fusion pulls its inputs, and the on-disk
//! [`ProgramSnapshot`] format that implements this boundary over a JSON
//! export of an upstream whole-program analysis.
//!
//! No analysis happens here; everything is accessors and (de)serialization.

pub mod callbacks;
pub mod controls;
pub mod engine;
pub mod errors;
pub mod refs;
pub mod snapshot;

pub use callbacks::{CallbackKind, CallbackRecord};
pub use controls::UiControlDecl;
pub use engine::AnalysisEngine;
pub use refs::{Body, ProcedureRef, StatementKind, ViewConstructKind};
pub use snapshot::ProgramSnapshot;

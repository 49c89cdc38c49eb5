//! # `AppGraph`
//!
//! `appgraph` is the main crate of the `AppGraph` program graph fusion
//! project. The project is subdivided into multiple crates, `appgraph` acts
//! as entry point by reexporting important structs and functions from those
//! sub-crates. Most of the reexports are done within the
//! `appgraph::prelude` namespace.
//!
//! ## Library basics
//!
//! All inputs come from a program snapshot: a JSON export of an upstream
//! whole-program analysis (call graph, decoded bodies, declared callbacks
//! and UI controls). From a snapshot, the fused graph is one builder call
//! away:
//!
//! ```rust,no_run
//! use appgraph::prelude::*;
//!
//! let snapshot = ProgramSnapshot::open("demo_snapshot.json")?;
//! let fusion = GraphBuilder::new(&snapshot, InclusionFilter::new()).build()?;
//! println!("{}", Composition::of(&fusion.graph));
//! # Ok::<(), AgError>(())
//! ```
//!
//! ## Sub-crates
//!
//!  - [`ag_model`] contains the snapshot data model and the
//!    `AnalysisEngine` boundary trait: definitions, accessors and
//!    (de)serialization only,
//!  - [`ag_fusion`] contains all the fusion algorithms (classification,
//!    control linking, graph assembly, composition and export) and relies on
//!    the previous crate for its inputs.

mod errors;

pub mod ag_callgraph;
pub mod ag_composition;
pub mod ag_controls;
pub mod ag_fuse;
pub mod cli;

pub use ag_fusion as fusion;
pub use ag_model as model;

/// Reexport module of commonly used structures and functions from `AppGraph`
/// project sub-crates:
///
/// ```rust
/// use appgraph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{AgError, AgResult};

    pub use ag_fusion::{
        Composition, ControlLinker, Diagnostics, FusedGraph, Fusion, GraphBuilder, GraphKind,
        InclusionFilter,
    };

    pub use ag_model::{AnalysisEngine, ProcedureRef, ProgramSnapshot, UiControlDecl};

    use clap::ArgMatches;

    pub fn init_logger(args: &ArgMatches) {
        let env = env_logger::Env::new()
            .filter_or("AG_LOG", "info")
            .write_style("AG_LOG_STYLE");

        let mut builder = env_logger::Builder::from_env(env);
        if args.get_flag("verbose") {
            builder.filter_level(log::LevelFilter::Trace);
        } else if args.get_flag("debug") {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if args.get_flag("ecslog") {
            builder.format(ecs_logger::format);
        }
        builder.init();
    }
}

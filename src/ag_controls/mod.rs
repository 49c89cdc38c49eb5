use crate::ag_fuse::filter_from_args;
use crate::prelude::*;
use ag_fusion::{Classifier, VertexKind};
use clap::ArgMatches;
use std::collections::BTreeSet;

pub fn run(args: &ArgMatches) -> AgResult<()> {
    init_logger(args);

    let input = args
        .get_one::<String>("input")
        .ok_or_else(|| AgError::BadArguments("--input needed".to_string()))?;
    let snapshot = ProgramSnapshot::open(input)?;
    let filter = filter_from_args(args);

    let controls: Vec<UiControlDecl> = snapshot
        .declared_ui_controls()
        .values()
        .flatten()
        .cloned()
        .collect();

    let classifier = Classifier::new(&snapshot);
    let candidates: Vec<ProcedureRef> = snapshot
        .call_graph_edges()
        .into_iter()
        .flat_map(|(caller, callee)| [caller, callee])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|p| filter.includes(p, &snapshot))
        .filter(|p| classifier.classify(p) == VertexKind::Listener)
        .collect();

    let outcome = ControlLinker::new(&snapshot).link(&controls, &candidates);

    println!("resolved bindings:");
    for (control, listener) in outcome.resolved() {
        println!("  {control} -> {listener}");
    }
    if !outcome.unresolved_controls().is_empty() {
        println!("unresolved controls:");
        for control in outcome.unresolved_controls() {
            println!("  {control}");
        }
    }
    if !outcome.unresolved_listeners().is_empty() {
        println!("unresolved listeners:");
        for listener in outcome.unresolved_listeners() {
            println!("  {listener}");
        }
    }
    log::info!(
        "{} resolved, {} unresolved control(s), {} unresolved listener(s), {} diagnostic(s)",
        outcome.resolved().len(),
        outcome.unresolved_controls().len(),
        outcome.unresolved_listeners().len(),
        outcome.diagnostics().len(),
    );

    Ok(())
}

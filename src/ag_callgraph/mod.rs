use crate::ag_fuse::{filter_from_args, write_outputs};
use crate::prelude::*;
use clap::ArgMatches;
use regex::Regex;

pub fn run(args: &ArgMatches) -> AgResult<()> {
    init_logger(args);

    let input = args
        .get_one::<String>("input")
        .ok_or_else(|| AgError::BadArguments("--input needed".to_string()))?;
    let snapshot = ProgramSnapshot::open(input)?;

    let fusion = GraphBuilder::new(&snapshot, filter_from_args(args)).build_calls()?;

    let filter_class = args.get_one::<String>("filter-class");
    let filter_method = args.get_one::<String>("filter-method");
    let graph = if filter_class.is_none() && filter_method.is_none() {
        fusion.graph
    } else {
        let class_pattern = filter_class.map(|r| Regex::new(r)).transpose()?;
        let method_pattern = filter_method.map(|r| Regex::new(r)).transpose()?;
        log::debug!(
            "filtering callgraph on class pattern {:?}, method pattern {:?}",
            class_pattern,
            method_pattern
        );
        fusion.graph.filter(|vertex| {
            let Some(procedure) = vertex.as_procedure() else {
                return false;
            };
            (class_pattern.is_none()
                || class_pattern
                    .as_ref()
                    .unwrap()
                    .is_match(procedure.class_name()))
                && (method_pattern.is_none()
                    || method_pattern.as_ref().unwrap().is_match(procedure.name()))
        })
    };

    let composition = Composition::of(&graph);
    log::info!(
        "callgraph contains {} procedures with:",
        composition.nb_vertices()
    );
    log::info!("    - {} lifecycle callbacks", composition.lifecycles());
    log::info!("    - {} UI listeners", composition.listeners());
    log::info!("    - {} other callbacks", composition.callbacks());
    println!("{composition}");

    write_outputs(&graph, args)
}

use crate::prelude::*;
use ag_fusion::export;
use clap::ArgMatches;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn run(args: &ArgMatches) -> AgResult<()> {
    init_logger(args);

    let input = args
        .get_one::<String>("input")
        .ok_or_else(|| AgError::BadArguments("--input needed".to_string()))?;
    let snapshot = ProgramSnapshot::open(input)?;

    let fusion = GraphBuilder::new(&snapshot, filter_from_args(args)).build()?;

    println!("composition of '{}' ({}):", fusion.graph.program(), fusion.graph.kind());
    println!("{}", Composition::of(&fusion.graph));

    if !fusion.diagnostics.is_empty() {
        log::info!(
            "run completed with {} non-fatal diagnostic(s)",
            fusion.diagnostics.len()
        );
    }

    write_outputs(&fusion.graph, args)
}

pub(crate) fn filter_from_args(args: &ArgMatches) -> InclusionFilter {
    let base = if args.get_flag("permissive") {
        InclusionFilter::permissive()
    } else {
        InclusionFilter::new()
    };
    match args.get_many::<String>("block") {
        Some(entries) => base.with_entries(entries.cloned()),
        None => base,
    }
}

pub(crate) fn write_outputs(graph: &FusedGraph, args: &ArgMatches) -> AgResult<()> {
    let Some(output_dir) = args.get_one::<String>("output") else {
        return Ok(());
    };
    let formats: Vec<&String> = args
        .get_many::<String>("format")
        .map(|values| values.collect())
        .unwrap_or_default();
    if formats.is_empty() {
        return Err(AgError::BadArguments(
            "--output requires at least one --format".to_string(),
        ));
    }
    for format in formats {
        let rendered = match format.as_str() {
            "dot" => graph.to_dot(),
            "json" => export::to_json(graph)?,
            other => {
                return Err(AgError::BadArguments(format!("unknown format '{other}'")));
            }
        };
        let path = Path::new(output_dir).join(export::file_name(graph, format));
        let mut file = File::create(&path)?;
        file.write_all(rendered.as_bytes())?;
        log::info!("{format} output written in {path:?}");
    }
    Ok(())
}

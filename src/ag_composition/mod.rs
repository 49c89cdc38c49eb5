use crate::prelude::*;
use ag_fusion::export;
use clap::ArgMatches;
use std::fs;

pub fn run(args: &ArgMatches) -> AgResult<()> {
    init_logger(args);

    let input = args
        .get_one::<String>("input")
        .ok_or_else(|| AgError::BadArguments("--input needed".to_string()))?;
    let json = fs::read_to_string(input)?;
    let graph = export::from_json(&json)?;

    println!("composition of '{}' ({}):", graph.program(), graph.kind());
    println!("{}", Composition::of(&graph));
    Ok(())
}

use appgraph::prelude::*;
use appgraph::{ag_callgraph, ag_composition, ag_controls, ag_fuse, cli};
use clap::ArgMatches;
use clap_complete::{generate, Shell};
use std::io;

fn main() -> AgResult<()> {
    let args = cli::appgraph().get_matches();

    match &args.subcommand() {
        Some(("fuse", cmd_args)) => ag_fuse::run(cmd_args),
        Some(("callgraph", cmd_args)) => ag_callgraph::run(cmd_args),
        Some(("controls", cmd_args)) => ag_controls::run(cmd_args),
        Some(("composition", cmd_args)) => ag_composition::run(cmd_args),
        Some(("gen-completions", sub_args)) => subcommand_gen_completions(sub_args),
        Some((subcommand, _)) => Err(AgError::BadArguments(format!(
            "unknown subcommand '{subcommand}'"
        ))),
        None => Err(AgError::BadArguments("missing subcommand".to_string())),
    }
}

fn subcommand_gen_completions(sub_args: &ArgMatches) -> AgResult<()> {
    let generator = *sub_args
        .get_one::<Shell>("shell")
        .ok_or_else(|| AgError::BadArguments("--shell needed".to_string()))?;
    let mut cmd = cli::appgraph();
    let cmd_name = cmd.get_name().to_string();
    generate(generator, &mut cmd, cmd_name, &mut io::stdout());
    Ok(())
}

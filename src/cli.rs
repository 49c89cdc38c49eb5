//! Main `AppGraph` binary command line arguments options.
//!
//! This module declares functions to build `clap` command line arguments
//! parsers, so that they can be used from other places than the main binary,
//! such as from the bash completion file generator.

use clap::{value_parser, Arg, ArgAction, Command};
use clap_complete::Shell;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn arg_debug() -> Arg {
    Arg::new("debug")
        .short('d')
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Activate debug mode")
}

fn arg_verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Activate verbose mode")
}

fn arg_ecslog() -> Arg {
    Arg::new("ecslog")
        .short('e')
        .long("ecslog")
        .action(ArgAction::SetTrue)
        .help("Output logs in ECS format")
}

fn arg_input(help: &str) -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .action(ArgAction::Set)
        .required(true)
        .help(help.to_string())
}

fn arg_output() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .action(ArgAction::Set)
        .help("Output directory for serialized graph files")
}

fn arg_format() -> Arg {
    Arg::new("format")
        .short('f')
        .long("format")
        .action(ArgAction::Append)
        .value_parser(["dot", "json"])
        .help("Graph serialization format(s)")
}

fn arg_block() -> Arg {
    Arg::new("block")
        .short('b')
        .long("block")
        .action(ArgAction::Append)
        .help("Additional blocklist entry (prefix, or `.substring`)")
}

fn arg_permissive() -> Arg {
    Arg::new("permissive")
        .long("permissive")
        .action(ArgAction::SetTrue)
        .help("Disable the built-in platform blocklist")
}

fn arg_filter_class() -> Arg {
    Arg::new("filter-class")
        .long("filter-class")
        .action(ArgAction::Set)
        .help("Class(es) regex filter")
}

fn arg_filter_method() -> Arg {
    Arg::new("filter-method")
        .long("filter-method")
        .action(ArgAction::Set)
        .help("Method(s) regex filter")
}

#[must_use]
pub fn appgraph() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author(AUTHORS)
        .about(DESCRIPTION)
        .subcommand(fuse())
        .subcommand(callgraph())
        .subcommand(controls())
        .subcommand(composition())
        .subcommand(
            Command::new("gen-completions")
                .about("Generates completions file")
                .arg(
                    Arg::new("shell")
                        .short('s')
                        .long("shell")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .help("Shell type for completion generation"),
                ),
        )
}

#[must_use]
pub fn fuse() -> Command {
    Command::new("fuse")
        .bin_name("ag-fuse")
        .version(VERSION)
        .author(AUTHORS)
        .about("Builds the fused control-flow/UI graph and prints its composition")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input("Input program snapshot file"))
        .arg(arg_output())
        .arg(arg_format())
        .arg(arg_block())
        .arg(arg_permissive())
}

#[must_use]
pub fn callgraph() -> Command {
    Command::new("callgraph")
        .bin_name("ag-callgraph")
        .version(VERSION)
        .author(AUTHORS)
        .about("Builds the procedure-level call graph")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input("Input program snapshot file"))
        .arg(arg_output())
        .arg(arg_format())
        .arg(arg_block())
        .arg(arg_permissive())
        .arg(arg_filter_class())
        .arg(arg_filter_method())
}

#[must_use]
pub fn controls() -> Command {
    Command::new("controls")
        .bin_name("ag-controls")
        .version(VERSION)
        .author(AUTHORS)
        .about("Links UI controls to their listeners and reports the bindings")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input("Input program snapshot file"))
        .arg(arg_block())
        .arg(arg_permissive())
}

#[must_use]
pub fn composition() -> Command {
    Command::new("composition")
        .bin_name("ag-composition")
        .version(VERSION)
        .author(AUTHORS)
        .about("Re-imports an exported graph file and prints its composition")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input("Input exported graph file (json)"))
}

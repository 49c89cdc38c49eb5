use appgraph::prelude::AgResult;
use appgraph::{ag_callgraph, cli};

fn main() -> AgResult<()> {
    let args = cli::callgraph().get_matches();
    ag_callgraph::run(&args)
}

use appgraph::prelude::AgResult;
use appgraph::{ag_controls, cli};

fn main() -> AgResult<()> {
    let args = cli::controls().get_matches();
    ag_controls::run(&args)
}

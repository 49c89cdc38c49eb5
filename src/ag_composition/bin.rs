use appgraph::prelude::AgResult;
use appgraph::{ag_composition, cli};

fn main() -> AgResult<()> {
    let args = cli::composition().get_matches();
    ag_composition::run(&args)
}

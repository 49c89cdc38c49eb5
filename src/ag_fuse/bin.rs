use appgraph::prelude::AgResult;
use appgraph::{ag_fuse, cli};

fn main() -> AgResult<()> {
    let args = cli::fuse().get_matches();
    ag_fuse::run(&args)
}

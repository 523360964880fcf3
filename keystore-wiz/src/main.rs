use clap::Parser;
use keystore_wiz::cli::{Cli, run};

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}

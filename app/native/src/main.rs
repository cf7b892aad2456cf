#![allow(clippy::multiple_crate_versions)]

//! Tether binary: `tether serve` runs the bridge, every other subcommand is
//! a client of a running bridge.

use clap::Parser;
use tether_lib::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Default filter; the prefix also matches the `tether_lib` targets.
const DEFAULT_FILTER: &str = "tether=info";
const VERBOSE_FILTER: &str = "tether=debug";

fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = cli.execute() {
        eprintln!("tether: {err}");
        std::process::exit(1);
    }
}

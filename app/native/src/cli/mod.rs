//! CLI module for Tether.
//!
//! `tether serve` runs the bridge; every other command is a client that
//! talks to a running bridge over its socket or reads its event store.

mod commands;
mod output;

pub use commands::{Cli, Commands};

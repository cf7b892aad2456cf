//! Platform helpers shared by the CLI and the bridge.

pub mod path;

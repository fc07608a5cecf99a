//! Subcommand implementations

pub mod evaluate;
pub mod play;
pub mod query;
pub mod train;

//! Subcommand implementations.

pub mod config;
pub mod register;
pub mod serve;

//! Discord implementation of [`Platform`](crate::Platform).

mod client;
mod config;

pub use client::DiscordClient;
pub use config::{DEFAULT_API_BASE, DiscordConfig};

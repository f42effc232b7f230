//! Chat platform access for the event repeater.
//!
//! The rest of the workspace depends only on the [`Platform`] trait. The
//! [`discord`] module provides the production implementation backed by the
//! Discord REST API.

pub mod discord;
pub mod error;
pub mod platform;

pub use discord::{DEFAULT_API_BASE, DiscordClient, DiscordConfig};
pub use error::{PlatformError, PlatformErrorCode, PlatformResult};
pub use platform::{BoxFuture, Platform};

//! aegis-core: Aegis Gateway Core Library
//!
//! Configuration, error types, the fail-safe fallback package, and the
//! guidance system instruction shared by the gateway crates.

pub mod config;
pub mod error;
pub mod fallback;
pub mod guidance;

pub use config::{Config, LiveConfig, ServerConfig};
pub use error::{Error, Result};
pub use fallback::FallbackPackage;
pub use guidance::GUIDANCE_SYSTEM_PROMPT;

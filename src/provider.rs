//! Provider-facing configuration (data) and presets.
//!
//! `config` exposes the validated [`ProviderConfig`] covering endpoints, client credentials,
//! and the [`ProviderQuirks`] capability descriptor that lets one generic strategy serve
//! providers with different identity sources. `presets` seeds configs for known provider
//! shapes.

pub mod config;
pub mod presets;

pub use config::*;

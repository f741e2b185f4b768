//! Token secrets and token endpoint responses.

pub mod secret;
pub mod set;

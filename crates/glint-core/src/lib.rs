//! Glint Core - Foundational types for the Glint shader engine
//!
//! This crate provides the types that all other Glint crates depend on:
//! - `GlintError` and the `Result` alias
//! - `PropertyKind` / `PropertyValue` - typed configurable shader inputs
//! - `PropertyGroup` - the settings-object interface supplied by the host

mod error;
mod types;

pub use error::{GlintError, Result};
pub use types::{PropertyGroup, PropertyKind, PropertyValue};

//! Configuration module.
//!
//! This module provides functionality for loading endpoint lists and
//! run settings from various sources.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::RunConfig;

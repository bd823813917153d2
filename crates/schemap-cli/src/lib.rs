//! CLI library components for the schema mapper.

pub mod commands;
pub mod config;
pub mod logging;

//! Library entry for hoist exposing package, diff and permission logic.

pub mod args;
pub mod config;
pub mod diff;
pub mod package;

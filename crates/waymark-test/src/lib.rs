//! Test harnesses for Waymark.
//!
//! Provides `TempManifest` for writing throwaway route manifests and
//! `route_table` for building string-keyed tables in tests.

#[cfg(test)]
pub mod cli;
pub mod fixtures;

pub use fixtures::{route_table, TempManifest};

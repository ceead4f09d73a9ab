//! Waymark tooling library.
//!
//! Loads YAML route manifests into route tables and renders routing
//! results. The main entry point is the `waymark` binary.

pub mod manifest;
pub mod report;

pub use manifest::{load_manifest, parse_manifest, ManifestError, RouteManifest};

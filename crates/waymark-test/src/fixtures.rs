//! Throwaway manifests and tables.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use waymark_router::{RouteError, RouteTable};

/// A route manifest written into its own temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TempManifest {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TempManifest {
    /// Write `yaml` to `routes.yaml` in a fresh temporary directory.
    pub fn new(yaml: &str) -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("routes.yaml");
        std::fs::write(&path, yaml)?;
        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    /// Manifest with one handler per template, named after the template.
    pub fn with_templates(templates: &[&str]) -> std::io::Result<Self> {
        let mut yaml = String::from("routes:\n");
        for template in templates {
            yaml.push_str(&format!(
                "  - handler: {:?}\n    templates: [{:?}]\n",
                template, template
            ));
        }
        Self::new(&yaml)
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Build a table from `(handler, templates)` pairs.
pub fn route_table(routes: &[(&str, &[&str])]) -> Result<RouteTable<String>, RouteError> {
    routes
        .iter()
        .fold(RouteTable::builder(), |builder, (handler, templates)| {
            builder.add(handler.to_string(), templates.iter().copied())
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_file_lives_with_value() {
        let manifest = TempManifest::new("routes: []\n").unwrap();
        let path = manifest.path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "routes: []\n");

        drop(manifest);
        assert!(!path.exists());
    }

    #[test]
    fn templates_are_quoted() {
        let manifest = TempManifest::with_templates(&["{*path}", "a/{id}"]).unwrap();
        let text = std::fs::read_to_string(manifest.path()).unwrap();
        assert!(text.contains("templates: [\"{*path}\"]"));
    }

    #[test]
    fn builds_tables() {
        let table = route_table(&[("a", &["a/{id}"]), ("b", &["b"])]).unwrap();
        assert_eq!(table.len(), 2);
        assert!(route_table(&[("bad", &["{x"])]).is_err());
    }
}

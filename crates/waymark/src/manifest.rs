//! Route manifests: a YAML description of handlers and their templates.
//!
//! ```yaml
//! options:
//!   empty_segments: reject
//! routes:
//!   - handler: posts.show
//!     templates:
//!       - blog/{id:int}/{slug?}
//!       - template: b/{id:int}
//!         order: 1
//!     query:
//!       page: int?
//!       tag: string[]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use waymark_router::{
    EmptySegmentPolicy, QueryParameter, RouteError, RouteGroup, RouteTable, RouterOptions,
};
use waymark_telemetry::{log_manifest_loaded, log_table_build_failed, log_table_built};

/// Errors raised while loading a manifest or building its table.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// E2010: The manifest file could not be read.
    #[error("E2010: failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// E2011: The manifest is not valid YAML or has unknown keys.
    #[error("E2011: invalid manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// E2012: A query parameter declares a type that cannot be bound.
    #[error("E2012: handler '{handler}' declares query parameter '{name}' with unknown type '{declared}'")]
    QueryType {
        handler: String,
        name: String,
        declared: String,
    },

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Parsed route manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    #[serde(default)]
    pub options: ManifestOptions,
    pub routes: Vec<RouteSpec>,
}

/// Path handling switches, mirroring [`RouterOptions`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestOptions {
    #[serde(default)]
    pub empty_segments: EmptySegments,
    #[serde(default = "default_true")]
    pub decode_segments: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            empty_segments: EmptySegments::default(),
            decode_segments: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySegments {
    #[default]
    Reject,
    Collapse,
}

/// One handler and the templates that reach it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    pub handler: String,
    pub templates: Vec<TemplateSpec>,
    /// Query parameter name to declared type (`int`, `guid?`, `string[]`).
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// A template, either bare or with an explicit order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateSpec {
    Text(String),
    Ordered(OrderedTemplate),
}

/// The `{ template, order }` form of a template entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderedTemplate {
    pub template: String,
    #[serde(default)]
    pub order: i32,
}

impl TemplateSpec {
    /// The template text.
    pub fn template(&self) -> &str {
        match self {
            TemplateSpec::Text(template) => template,
            TemplateSpec::Ordered(ordered) => &ordered.template,
        }
    }

    /// The explicit order, 0 for bare templates.
    pub fn order(&self) -> i32 {
        match self {
            TemplateSpec::Text(_) => 0,
            TemplateSpec::Ordered(ordered) => ordered.order,
        }
    }
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<RouteManifest, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = parse_manifest(&text, path)?;
    log_manifest_loaded!(
        path = %path.display(),
        handlers = manifest.routes.len(),
        "route manifest loaded"
    );
    Ok(manifest)
}

/// Parse manifest text. `path` is only used in error messages.
pub fn parse_manifest(text: &str, path: &Path) -> Result<RouteManifest, ManifestError> {
    serde_yaml::from_str(text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl RouteManifest {
    /// Router options described by the `options` section.
    pub fn router_options(&self) -> RouterOptions {
        let policy = match self.options.empty_segments {
            EmptySegments::Reject => EmptySegmentPolicy::Reject,
            EmptySegments::Collapse => EmptySegmentPolicy::Collapse,
        };
        RouterOptions::default()
            .with_empty_segments(policy)
            .with_decode_segments(self.options.decode_segments)
    }

    /// Build the route table; handlers are identified by name.
    pub fn build_table(&self) -> Result<RouteTable<String>, ManifestError> {
        let result = self
            .assemble()
            .and_then(|builder| builder.build().map_err(ManifestError::from));
        match &result {
            Ok(table) => log_table_built!(
                handlers = self.routes.len(),
                entries = table.len(),
                "route table built"
            ),
            Err(e) => log_table_build_failed!(error = %e, "route table build failed"),
        }
        result
    }

    fn assemble(&self) -> Result<waymark_router::RouteTableBuilder<String>, ManifestError> {
        let mut builder = RouteTable::builder().with_options(self.router_options());
        for route in &self.routes {
            let mut group = RouteGroup::new(route.handler.clone());
            for spec in &route.templates {
                group = group.template_with_order(spec.template(), spec.order());
            }
            for (name, declared) in &route.query {
                let parameter = QueryParameter::parse(name.as_str(), declared).ok_or_else(|| {
                    ManifestError::QueryType {
                        handler: route.handler.clone(),
                        name: name.clone(),
                        declared: declared.clone(),
                    }
                })?;
                group = group.query(parameter);
            }
            builder = builder.group(group);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use waymark_router::RouteValue;

    fn parse(text: &str) -> RouteManifest {
        parse_manifest(text, Path::new("test.yaml")).unwrap()
    }

    const BLOG: &str = r#"
routes:
  - handler: posts.show
    templates:
      - blog/{id:int}/{slug?}
      - template: b/{id:int}
        order: 1
    query:
      page: int?
  - handler: archive
    templates:
      - blog/{*rest}
"#;

    #[test]
    fn parses_bare_and_ordered_templates() {
        let manifest = parse(BLOG);
        assert_eq!(manifest.routes.len(), 2);
        let templates = &manifest.routes[0].templates;
        assert_eq!(templates[0].template(), "blog/{id:int}/{slug?}");
        assert_eq!(templates[0].order(), 0);
        assert_eq!(templates[1].template(), "b/{id:int}");
        assert_eq!(templates[1].order(), 1);
    }

    #[test]
    fn options_default_to_reject_and_decode() {
        let options = parse(BLOG).router_options();
        assert_eq!(options, RouterOptions::default());
    }

    #[test]
    fn collapse_option() {
        let manifest = parse("options:\n  empty_segments: collapse\nroutes: []\n");
        assert_eq!(
            manifest.router_options().empty_segments,
            EmptySegmentPolicy::Collapse
        );
    }

    #[test]
    fn builds_table_with_query() {
        let table = parse(BLOG).build_table().unwrap();
        assert_eq!(table.len(), 3);

        let found = table.route("/blog/7?page=3").found().unwrap();
        assert_eq!(found.handler(), "posts.show");
        assert_eq!(found.values.get("id"), Some(&RouteValue::Int(7)));
        let query = found.bind_query().unwrap();
        assert_eq!(query.get("page"), Some(&RouteValue::Int(3)));

        let found = table.route("/blog/7/x/y").found().unwrap();
        assert_eq!(found.handler(), "archive");
    }

    #[test]
    fn unknown_query_type() {
        let manifest = parse(
            "routes:\n  - handler: h\n    templates: [a]\n    query:\n      page: integer\n",
        );
        let err = manifest.build_table().unwrap_err();
        assert!(matches!(err, ManifestError::QueryType { ref declared, .. } if declared == "integer"));
        assert!(err.to_string().starts_with("E2012"));
    }

    #[test]
    fn route_errors_pass_through() {
        let manifest = parse("routes:\n  - handler: h\n    templates: ['{id:nope}']\n");
        let err = manifest.build_table().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Route(RouteError::UnsupportedConstraint { .. })
        ));
        assert!(err.to_string().starts_with("E2002"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_manifest("routes: []\nextra: 1\n", Path::new("m.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("m.yaml"));
    }

    #[test]
    fn misspelled_order_key_is_rejected() {
        let err = parse_manifest(
            "routes:\n  - handler: h\n    templates:\n      - template: a/{id}\n        ordr: 5\n",
            Path::new("m.yaml"),
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().starts_with("E2011"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BLOG.as_bytes()).unwrap();

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.routes[1].handler, "archive");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
        assert!(err.to_string().starts_with("E2010"));
    }
}

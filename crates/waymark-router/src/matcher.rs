//! Matching request path segments against a single route entry.

use std::sync::Arc;

use crate::complex::match_complex;
use crate::error::RouteError;
use crate::query::{bind_query, QueryParameter};
use crate::template::{eq_ignore_case, RouteTemplate, TemplateSegment};
use crate::value::{RouteValue, RouteValues};

/// A template bound to a handler.
///
/// Entries are created when a route table is built and never change after
/// that.
#[derive(Debug, Clone)]
pub struct RouteEntry<H> {
    pub handler: H,
    pub template: RouteTemplate,
    /// Tie-break after specificity; lower sorts first.
    pub order: i32,
    /// Parameters declared by other templates of the same handler group but
    /// not by this one. Always bound to `Null` on a successful match.
    pub unused_parameter_names: Vec<String>,
    /// Query parameters the handler accepts.
    pub query: Arc<[QueryParameter]>,
}

impl<H> RouteEntry<H> {
    /// Entry with order 0, no unused names and no query parameters.
    pub fn new(handler: H, template: RouteTemplate) -> Self {
        Self {
            handler,
            template,
            order: 0,
            unused_parameter_names: Vec::new(),
            query: Arc::from(Vec::new()),
        }
    }

    /// Match already split path segments against this entry.
    pub fn matches(&self, segments: &[&str]) -> Option<RouteValues> {
        match_entry(self, segments)
    }

    /// Bind the declared query parameters from a raw query string.
    pub fn bind_query(&self, query: Option<&str>) -> Result<RouteValues, RouteError> {
        bind_query(&self.query, query)
    }
}

/// Match `segments` against `entry`, null-filling its unused parameter names.
pub fn match_entry<H>(entry: &RouteEntry<H>, segments: &[&str]) -> Option<RouteValues> {
    let mut values = match_template(&entry.template, segments)?;
    for name in &entry.unused_parameter_names {
        values.insert_if_absent(name, RouteValue::Null);
    }
    Some(values)
}

/// Match `segments` against `template` in a single forward pass.
///
/// Every call starts from an empty value set, so nothing bound during a
/// failed attempt is visible to the next one.
pub fn match_template(template: &RouteTemplate, segments: &[&str]) -> Option<RouteValues> {
    let template_segments = template.segments();
    let mut values = RouteValues::new();
    let mut path_index = 0;
    let mut template_index = 0;

    while path_index < segments.len() && template_index < template_segments.len() {
        let path_segment = segments[path_index];

        match &template_segments[template_index] {
            TemplateSegment::Literal(text) => {
                if !eq_ignore_case(text, path_segment) {
                    return None;
                }
            }
            TemplateSegment::Parameter(p) if p.is_catch_all => {
                // The remainder must start with a real segment.
                if path_segment.is_empty() {
                    return None;
                }
                let remainder = segments[path_index..].join("/");
                values.insert(&p.name, p.bind(&remainder)?);
                path_index = segments.len();
                template_index += 1;
                break;
            }
            TemplateSegment::Parameter(p) => {
                if path_segment.is_empty() {
                    return None;
                }
                values.insert(&p.name, p.bind(path_segment)?);
            }
            TemplateSegment::Complex(complex) => {
                for (p, raw) in match_complex(complex, path_segment)? {
                    let value = match raw {
                        Some(raw) => p.bind(raw)?,
                        None => RouteValue::Null,
                    };
                    values.insert(&p.name, value);
                }
            }
        }

        path_index += 1;
        template_index += 1;
    }

    if path_index < segments.len() {
        return None;
    }

    for segment in &template_segments[template_index..] {
        match segment {
            TemplateSegment::Parameter(p) if segment.can_be_absent() => {
                values.insert(&p.name, p.absent_value());
            }
            _ => return None,
        }
    }

    Some(values)
}

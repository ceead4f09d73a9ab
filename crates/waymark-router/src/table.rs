//! Route tables: building entries from handler groups and routing request
//! paths to the first matching entry in precedence order.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::constraint::ConstraintRegistry;
use crate::error::RouteError;
use crate::matcher::RouteEntry;
use crate::parser::TemplateParser;
use crate::precedence::{compare_precedence, find_ambiguity};
use crate::query::QueryParameter;
use crate::template::{eq_ignore_case, RouteTemplate};
use crate::value::RouteValues;

/// What to do with empty segments between slashes, as in `/a//c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySegmentPolicy {
    /// Keep them; they match no literal or parameter, so the path is not
    /// routable unless a catch-all absorbs them.
    #[default]
    Reject,
    /// Drop them before matching, so `/a//c` routes like `/a/c`.
    Collapse,
}

/// Options applied when a table splits request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    pub empty_segments: EmptySegmentPolicy,
    /// Percent-decode each segment after splitting.
    pub decode_segments: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            empty_segments: EmptySegmentPolicy::Reject,
            decode_segments: true,
        }
    }
}

impl RouterOptions {
    /// Set the empty segment policy.
    pub fn with_empty_segments(mut self, policy: EmptySegmentPolicy) -> Self {
        self.empty_segments = policy;
        self
    }

    /// Enable or disable percent-decoding of segments.
    pub fn with_decode_segments(mut self, decode: bool) -> Self {
        self.decode_segments = decode;
        self
    }
}

/// One handler with all the templates that lead to it.
#[derive(Debug, Clone)]
pub struct RouteGroup<H> {
    handler: H,
    templates: Vec<(String, i32)>,
    query: Vec<QueryParameter>,
}

impl<H> RouteGroup<H> {
    /// Create a group for `handler` with no templates.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            templates: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Add a template with order 0.
    pub fn template(self, template: impl Into<String>) -> Self {
        self.template_with_order(template, 0)
    }

    /// Add a template with an explicit order.
    pub fn template_with_order(mut self, template: impl Into<String>, order: i32) -> Self {
        self.templates.push((template.into(), order));
        self
    }

    /// Declare a query parameter the handler accepts.
    pub fn query(mut self, parameter: QueryParameter) -> Self {
        self.query.push(parameter);
        self
    }
}

/// Collects handler groups and builds an immutable [`RouteTable`].
#[derive(Debug)]
pub struct RouteTableBuilder<H> {
    registry: ConstraintRegistry,
    options: RouterOptions,
    groups: Vec<RouteGroup<H>>,
}

impl<H> Default for RouteTableBuilder<H> {
    fn default() -> Self {
        Self {
            registry: ConstraintRegistry::new(),
            options: RouterOptions::default(),
            groups: Vec::new(),
        }
    }
}

impl<H> RouteTableBuilder<H> {
    /// Create an empty builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve constraint tokens through `registry` instead of the built-ins only.
    pub fn with_registry(mut self, registry: ConstraintRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the options used when routing.
    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    /// Register `handler` under each of `templates`, all with order 0.
    pub fn add<I, S>(self, handler: H, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = templates
            .into_iter()
            .fold(RouteGroup::new(handler), |group, template| group.template(template));
        self.group(group)
    }

    /// Add a handler group.
    pub fn group(mut self, group: RouteGroup<H>) -> Self {
        self.groups.push(group);
        self
    }

    /// Parse every template, compute unused parameter names per entry,
    /// reject ambiguous entries and sort by precedence.
    ///
    /// Any error aborts the build; no partial table is produced.
    pub fn build(self) -> Result<RouteTable<H>, RouteError>
    where
        H: Clone + fmt::Debug,
    {
        self.build_entries().inspect_err(|e| {
            tracing::warn!(error = %e, "route table build failed");
        })
    }

    fn build_entries(self) -> Result<RouteTable<H>, RouteError>
    where
        H: Clone + fmt::Debug,
    {
        let parser = TemplateParser::new(&self.registry);
        let handler_count = self.groups.len();
        let mut entries = Vec::new();

        for group in self.groups {
            let templates = group
                .templates
                .iter()
                .map(|(text, order)| Ok((parser.parse(text)?, *order)))
                .collect::<Result<Vec<(RouteTemplate, i32)>, RouteError>>()?;

            let mut names: Vec<String> = Vec::new();
            for p in templates.iter().flat_map(|(t, _)| t.parameters()) {
                if !names.iter().any(|n| eq_ignore_case(n, &p.name)) {
                    names.push(p.name.clone());
                }
            }

            let query: Arc<[QueryParameter]> = Arc::from(group.query);
            for (template, order) in templates {
                let unused_parameter_names = names
                    .iter()
                    .filter(|name| !template.has_parameter(name))
                    .cloned()
                    .collect();
                entries.push(RouteEntry {
                    handler: group.handler.clone(),
                    template,
                    order,
                    unused_parameter_names,
                    query: Arc::clone(&query),
                });
            }
        }

        if let Some((first, second)) = find_ambiguity(&entries) {
            let (first, second) = (&entries[first], &entries[second]);
            return Err(RouteError::AmbiguousRoute {
                first: first.template.text().to_string(),
                first_handler: format!("{:?}", first.handler),
                second: second.template.text().to_string(),
                second_handler: format!("{:?}", second.handler),
            });
        }

        // Stable, so fully tied entries keep registration order.
        entries.sort_by(compare_precedence);

        tracing::debug!(
            entries = entries.len(),
            handlers = handler_count,
            "route table built"
        );

        Ok(RouteTable {
            entries,
            options: self.options,
        })
    }
}

/// An immutable, precedence-ordered set of route entries.
///
/// Routing never mutates the table, so one table can serve any number of
/// threads without locking.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    entries: Vec<RouteEntry<H>>,
    options: RouterOptions,
}

/// The outcome of routing one request.
#[derive(Debug)]
pub enum RouteMatch<'a, H> {
    Found(Match<'a, H>),
    /// No entry matched; a normal outcome, not an error.
    NotFound,
}

/// A successful match.
#[derive(Debug)]
pub struct Match<'a, H> {
    pub entry: &'a RouteEntry<H>,
    pub values: RouteValues,
    /// The raw query string of the request, without the `?`.
    pub query: Option<String>,
}

impl<H> Match<'_, H> {
    /// The handler of the matched entry.
    pub fn handler(&self) -> &H {
        &self.entry.handler
    }

    /// The text of the matched template.
    pub fn template(&self) -> &str {
        self.entry.template.text()
    }

    /// Convert the query parameters the handler declared.
    pub fn bind_query(&self) -> Result<RouteValues, RouteError> {
        self.entry.bind_query(self.query.as_deref())
    }
}

impl<'a, H> RouteMatch<'a, H> {
    /// Whether a route matched.
    pub fn is_found(&self) -> bool {
        matches!(self, RouteMatch::Found(_))
    }

    /// The match, if any.
    pub fn found(self) -> Option<Match<'a, H>> {
        match self {
            RouteMatch::Found(m) => Some(m),
            RouteMatch::NotFound => None,
        }
    }
}

impl<H> RouteTable<H> {
    /// Start building a table.
    pub fn builder() -> RouteTableBuilder<H> {
        RouteTableBuilder::new()
    }

    /// Entries in the order they are tried.
    pub fn entries(&self) -> &[RouteEntry<H>] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The options used when splitting request paths.
    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// Route a request target such as `/blog/5?page=2`.
    pub fn route(&self, url: &str) -> RouteMatch<'_, H> {
        let (path, query) = split_url(url);
        let segments = split_path(path, self.options);
        let segments: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();

        match self.route_segments(&segments) {
            Some((entry, values)) => {
                tracing::trace!(path, template = entry.template.text(), "route matched");
                RouteMatch::Found(Match {
                    entry,
                    values,
                    query: query.map(str::to_string),
                })
            }
            None => {
                tracing::trace!(path, "no route matched");
                RouteMatch::NotFound
            }
        }
    }

    /// Try every entry in order against already split segments.
    pub fn route_segments(&self, segments: &[&str]) -> Option<(&RouteEntry<H>, RouteValues)> {
        self.entries
            .iter()
            .find_map(|entry| entry.matches(segments).map(|values| (entry, values)))
    }
}

/// Split a request target into its path and query, dropping any fragment.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    let url = url.split_once('#').map_or(url, |(before, _)| before);
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Split a path into segments.
///
/// One leading and one trailing `/` are ignored, so `/` has no segments.
/// Empty segments are kept or dropped according to the options, and each
/// segment is percent-decoded as UTF-8 when enabled.
pub fn split_path(path: &str, options: RouterOptions) -> Vec<Cow<'_, str>> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }

    path.split('/')
        .filter(|segment| {
            options.empty_segments == EmptySegmentPolicy::Reject || !segment.is_empty()
        })
        .map(|segment| {
            if options.decode_segments {
                percent_decode_str(segment).decode_utf8_lossy()
            } else {
                Cow::Borrowed(segment)
            }
        })
        .collect()
}

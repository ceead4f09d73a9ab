//! Parsed route template model.

use crate::constraint::{Check, RouteConstraint};
use crate::value::RouteValue;

/// A parsed route template such as `a/{b:int?}/c/{*rest}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTemplate {
    text: String,
    segments: Vec<TemplateSegment>,
    optional_count: usize,
    has_catch_all: bool,
}

impl RouteTemplate {
    pub(crate) fn new(text: &str, segments: Vec<TemplateSegment>) -> Self {
        let optional_count = segments.iter().filter(|s| s.is_optional()).count();
        let has_catch_all = segments.iter().any(TemplateSegment::is_catch_all);
        Self {
            text: text.to_string(),
            segments,
            optional_count,
            has_catch_all,
        }
    }

    /// The template as originally written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Segments in path order.
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Number of segments that are optional parameters.
    pub fn optional_count(&self) -> usize {
        self.optional_count
    }

    /// Whether the last segment is a catch-all.
    pub fn has_catch_all(&self) -> bool {
        self.has_catch_all
    }

    /// Every parameter in the template, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &TemplateParameter> {
        self.segments.iter().flat_map(|segment| {
            let (single, parts): (Option<&TemplateParameter>, &[SegmentPart]) = match segment {
                TemplateSegment::Literal(_) => (None, &[]),
                TemplateSegment::Parameter(p) => (Some(p), &[]),
                TemplateSegment::Complex(c) => (None, &c.parts),
            };
            single.into_iter().chain(parts.iter().filter_map(|part| match part {
                SegmentPart::Parameter(p) => Some(p),
                SegmentPart::Literal(_) => None,
            }))
        })
    }

    /// Whether the template declares a parameter with this name, ignoring case.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters().any(|p| eq_ignore_case(&p.name, name))
    }
}

/// One `/`-delimited unit of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    /// Literal text, matched case-insensitively.
    Literal(String),
    /// A segment made of exactly one parameter.
    Parameter(TemplateParameter),
    /// Literal text and parameters sharing one segment, e.g. `{name}.{ext?}`.
    Complex(ComplexSegment),
}

impl TemplateSegment {
    /// Literal text, parameter name, or the raw text of a complex segment.
    pub fn value(&self) -> &str {
        match self {
            TemplateSegment::Literal(text) => text,
            TemplateSegment::Parameter(p) => &p.name,
            TemplateSegment::Complex(c) => &c.text,
        }
    }

    /// Whether this segment is a single parameter.
    pub fn is_parameter(&self) -> bool {
        matches!(self, TemplateSegment::Parameter(_))
    }

    /// Whether this is an optional parameter (`{name?}`).
    pub fn is_optional(&self) -> bool {
        matches!(self, TemplateSegment::Parameter(p) if p.is_optional)
    }

    /// Whether this is a catch-all parameter (`{*name}`).
    pub fn is_catch_all(&self) -> bool {
        matches!(self, TemplateSegment::Parameter(p) if p.is_catch_all)
    }

    /// Whether a match may end before this segment: optional parameters,
    /// parameters with a default value, and catch-alls.
    pub fn can_be_absent(&self) -> bool {
        matches!(
            self,
            TemplateSegment::Parameter(p)
                if p.is_optional || p.is_catch_all || p.default_value.is_some()
        )
    }

    /// The parameter's constraints in declaration order; empty for other segments.
    pub fn constraints(&self) -> &[RouteConstraint] {
        match self {
            TemplateSegment::Parameter(p) => &p.constraints,
            _ => &[],
        }
    }
}

/// A `{name...}` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    /// Name without braces, markers or constraints.
    pub name: String,
    pub is_optional: bool,
    pub is_catch_all: bool,
    /// Text bound when the path ends before this parameter.
    pub default_value: Option<String>,
    /// Applied left to right; the first rejection fails the parameter.
    pub constraints: Vec<RouteConstraint>,
}

impl TemplateParameter {
    /// Run the constraints against `raw` and produce the bound value.
    ///
    /// Without converting constraints the raw text is bound as a string;
    /// otherwise the value of the last converter wins.
    pub fn bind(&self, raw: &str) -> Option<RouteValue> {
        let mut converted = None;
        for constraint in &self.constraints {
            match constraint.check(raw) {
                Check::Reject => return None,
                Check::Accept => {}
                Check::Converted(value) => converted = Some(value),
            }
        }
        Some(converted.unwrap_or_else(|| RouteValue::String(raw.to_string())))
    }

    /// Value bound when the path runs out before this parameter: the
    /// default, converted like matched text when the constraints accept it.
    pub(crate) fn absent_value(&self) -> RouteValue {
        match &self.default_value {
            Some(default) => self
                .bind(default)
                .unwrap_or_else(|| RouteValue::String(default.clone())),
            None => RouteValue::Null,
        }
    }
}

/// A segment that mixes literal text and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSegment {
    /// The segment text as written, used for diagnostics.
    pub text: String,
    /// Alternating literal and parameter parts; never two parameters in a row.
    pub parts: Vec<SegmentPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentPart {
    Literal(String),
    Parameter(TemplateParameter),
}

/// Unicode-aware case-insensitive comparison with an ASCII fast path.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

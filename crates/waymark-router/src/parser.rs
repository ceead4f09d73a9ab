//! Route template parser.
//!
//! Grammar, informally:
//!
//! ```text
//! template  = ["~"] ["/"] segment *("/" segment) ["/"]
//! segment   = 1*(literal / "{" parameter "}")
//! parameter = ["*"] name *(":" constraint) ["=" default] ["?"]
//! ```
//!
//! Inside a parameter `{{` and `}}` stand for literal braces; in literal text
//! they do the same. A lone `}` in literal text or a lone `{` inside a
//! parameter is an error.

use crate::constraint::ConstraintRegistry;
use crate::error::{RouteError, TemplateErrorKind};
use crate::template::{
    eq_ignore_case, ComplexSegment, RouteTemplate, SegmentPart, TemplateParameter,
    TemplateSegment,
};

/// Characters that may not appear in a parameter name.
const INVALID_NAME_CHARS: &[char] = &['{', '}', '=', '.', '/', '*'];

/// Parse a template using only the built-in constraints.
pub fn parse_template(text: &str) -> Result<RouteTemplate, RouteError> {
    TemplateParser::new(&ConstraintRegistry::new()).parse(text)
}

/// Parses template text, resolving constraint tokens through a registry.
#[derive(Debug, Clone, Copy)]
pub struct TemplateParser<'a> {
    registry: &'a ConstraintRegistry,
}

/// A segment part before its parameter body has been interpreted.
enum RawPart {
    Literal(String),
    Parameter(String),
}

impl<'a> TemplateParser<'a> {
    /// Create a parser resolving constraints through `registry`.
    pub fn new(registry: &'a ConstraintRegistry) -> Self {
        Self { registry }
    }

    /// Parse `text` into a route template.
    pub fn parse(&self, text: &str) -> Result<RouteTemplate, RouteError> {
        let syntax = |kind| RouteError::syntax(text, kind);

        let body = match text.strip_prefix('~') {
            Some(rest) if rest.starts_with('/') => rest,
            Some(_) => return Err(syntax(TemplateErrorKind::InvalidTildePrefix)),
            None => text,
        };
        let body = body.strip_prefix('/').unwrap_or(body);
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::new();
        if !body.is_empty() {
            let chars: Vec<char> = body.chars().collect();
            let mut pos = 0;
            loop {
                let (parts, end) = scan_segment(&chars, pos).map_err(syntax)?;
                let raw: String = chars[pos..end].iter().collect();
                segments.push(self.build_segment(text, raw, parts)?);
                if end >= chars.len() {
                    break;
                }
                pos = end + 1;
            }
        }

        validate_template(&segments).map_err(syntax)?;
        Ok(RouteTemplate::new(text, segments))
    }

    fn build_segment(
        &self,
        template: &str,
        raw: String,
        parts: Vec<RawPart>,
    ) -> Result<TemplateSegment, RouteError> {
        let syntax = |kind| RouteError::syntax(template, kind);

        let mut converted = Vec::with_capacity(parts.len());
        for part in parts {
            converted.push(match part {
                RawPart::Literal(text) if text.contains('?') => {
                    return Err(syntax(TemplateErrorKind::QuestionMarkInLiteral(text)));
                }
                RawPart::Literal(text) => SegmentPart::Literal(text),
                RawPart::Parameter(body) => {
                    SegmentPart::Parameter(self.parse_parameter(template, &body)?)
                }
            });
        }

        if converted.len() > 1 {
            validate_complex(&converted).map_err(syntax)?;
            return Ok(TemplateSegment::Complex(ComplexSegment {
                text: raw,
                parts: converted,
            }));
        }

        match converted.pop() {
            Some(SegmentPart::Literal(text)) => Ok(TemplateSegment::Literal(text)),
            Some(SegmentPart::Parameter(p)) => Ok(TemplateSegment::Parameter(p)),
            None => Err(syntax(TemplateErrorKind::EmptySegment)),
        }
    }

    fn parse_parameter(&self, template: &str, body: &str) -> Result<TemplateParameter, RouteError> {
        let syntax = |kind| RouteError::syntax(template, kind);

        let (is_catch_all, rest) = match body.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        if is_catch_all && rest.starts_with('*') {
            return Err(syntax(TemplateErrorKind::MultipleCatchAllMarkers(
                body.to_string(),
            )));
        }

        let name_end = rest.find([':', '=']).unwrap_or(rest.len());
        let (name, mut tail) = rest.split_at(name_end);
        let (name, mut is_optional) = match name.strip_suffix('?') {
            Some(stripped) if tail.is_empty() => (stripped, true),
            Some(stripped) if tail.starts_with('=') => {
                return Err(syntax(TemplateErrorKind::OptionalWithDefault(
                    stripped.to_string(),
                )));
            }
            _ => (name, false),
        };
        validate_name(name).map_err(syntax)?;

        let mut constraints = Vec::new();
        while let Some(after) = tail.strip_prefix(':') {
            let len = constraint_token_len(after)
                .filter(|len| *len > 0)
                .ok_or_else(|| {
                    syntax(TemplateErrorKind::MalformedConstraint(after.to_string()))
                })?;
            constraints.push(self.registry.resolve(&after[..len])?);
            tail = &after[len..];
        }

        let mut default_value = None;
        if tail == "?" {
            is_optional = true;
        } else if tail.starts_with("?=") {
            return Err(syntax(TemplateErrorKind::OptionalWithDefault(
                name.to_string(),
            )));
        } else if let Some(default) = tail.strip_prefix('=') {
            if default.ends_with('?') {
                return Err(syntax(TemplateErrorKind::OptionalWithDefault(
                    name.to_string(),
                )));
            }
            default_value = Some(default.to_string());
        } else if !tail.is_empty() {
            return Err(syntax(TemplateErrorKind::MalformedConstraint(
                tail.to_string(),
            )));
        }

        if is_catch_all && is_optional {
            return Err(syntax(TemplateErrorKind::OptionalCatchAll(name.to_string())));
        }

        Ok(TemplateParameter {
            name: name.to_string(),
            is_optional,
            is_catch_all,
            default_value,
            constraints,
        })
    }
}

/// Split one `/`-delimited segment into literal and parameter parts.
///
/// Returns the parts and the index of the terminating `/` (or the end).
fn scan_segment(chars: &[char], start: usize) -> Result<(Vec<RawPart>, usize), TemplateErrorKind> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = start;

    while i < chars.len() && chars[i] != '/' {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => {
                literal.push('{');
                i += 2;
            }
            '{' => {
                if !literal.is_empty() {
                    parts.push(RawPart::Literal(std::mem::take(&mut literal)));
                }
                let (body, next) = scan_parameter(chars, i + 1)?;
                parts.push(RawPart::Parameter(body));
                i = next;
            }
            '}' if chars.get(i + 1) == Some(&'}') => {
                literal.push('}');
                i += 2;
            }
            '}' => return Err(TemplateErrorKind::UnopenedParameter),
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        parts.push(RawPart::Literal(literal));
    }
    Ok((parts, i))
}

/// Read a parameter body starting just after its `{`. Returns the unescaped
/// body and the index just past the closing `}`.
fn scan_parameter(chars: &[char], start: usize) -> Result<(String, usize), TemplateErrorKind> {
    let mut body = String::new();
    let mut i = start;
    loop {
        match chars.get(i) {
            None => return Err(TemplateErrorKind::UnclosedParameter),
            Some('}') if chars.get(i + 1) == Some(&'}') => {
                body.push('}');
                i += 2;
            }
            Some('}') => return Ok((body, i + 1)),
            Some('{') if chars.get(i + 1) == Some(&'{') => {
                body.push('{');
                i += 2;
            }
            Some('{') => return Err(TemplateErrorKind::UnescapedBrace),
            Some(&c) => {
                body.push(c);
                i += 1;
            }
        }
    }
}

/// Length of the constraint token at the start of `text`.
///
/// A plain token ends at `:`, `=`, or a `?` that closes the parameter. A token
/// with arguments ends at the first `)` followed by `:`, `=`, a final `?`, or
/// the end, so argument lists may themselves contain those characters.
fn constraint_token_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                return (i + 1..bytes.len())
                    .find(|&j| {
                        bytes[j] == b')'
                            && match bytes.get(j + 1) {
                                None | Some(b':') | Some(b'=') => true,
                                Some(b'?') => matches!(bytes.get(j + 2), None | Some(b'=')),
                                _ => false,
                            }
                    })
                    .map(|j| j + 1);
            }
            b':' | b'=' => return Some(i),
            b'?' if matches!(bytes.get(i + 1), None | Some(b'=')) => return Some(i),
            _ => i += 1,
        }
    }
    Some(i)
}

fn validate_name(name: &str) -> Result<(), TemplateErrorKind> {
    if name.is_empty() {
        return Err(TemplateErrorKind::EmptyParameterName);
    }
    if name.contains('?') {
        return Err(TemplateErrorKind::MisplacedOptionalMarker(name.to_string()));
    }
    if name.contains(INVALID_NAME_CHARS) {
        return Err(TemplateErrorKind::InvalidParameterName(name.to_string()));
    }
    Ok(())
}

fn validate_complex(parts: &[SegmentPart]) -> Result<(), TemplateErrorKind> {
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        let SegmentPart::Parameter(p) = part else {
            continue;
        };
        if p.is_catch_all {
            return Err(TemplateErrorKind::CatchAllInComplexSegment(p.name.clone()));
        }
        if p.default_value.is_some() {
            return Err(TemplateErrorKind::DefaultInComplexSegment(p.name.clone()));
        }
        if p.is_optional {
            if i != last {
                return Err(TemplateErrorKind::OptionalNotLastInSegment(p.name.clone()));
            }
            if !matches!(&parts[i - 1], SegmentPart::Literal(sep) if sep == ".") {
                return Err(TemplateErrorKind::InvalidOptionalSeparator(p.name.clone()));
            }
        }
    }

    let adjacent = parts.windows(2).any(|pair| {
        matches!(
            pair,
            [SegmentPart::Parameter(_), SegmentPart::Parameter(_)]
        )
    });
    if adjacent {
        return Err(TemplateErrorKind::AdjacentParameters);
    }
    Ok(())
}

fn validate_template(segments: &[TemplateSegment]) -> Result<(), TemplateErrorKind> {
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_catch_all() && i != last {
            return Err(TemplateErrorKind::CatchAllNotLast(segment.value().to_string()));
        }
    }

    let mut after_optional = false;
    for segment in segments {
        if after_optional && !segment.can_be_absent() {
            return Err(TemplateErrorKind::RequiredAfterOptional(
                segment.value().to_string(),
            ));
        }
        after_optional |= segment.is_optional();
    }

    let mut seen: Vec<&str> = Vec::new();
    let names = segments.iter().flat_map(|segment| match segment {
        TemplateSegment::Literal(_) => Vec::new(),
        TemplateSegment::Parameter(p) => vec![p.name.as_str()],
        TemplateSegment::Complex(c) => c
            .parts
            .iter()
            .filter_map(|part| match part {
                SegmentPart::Parameter(p) => Some(p.name.as_str()),
                SegmentPart::Literal(_) => None,
            })
            .collect(),
    });
    for name in names {
        if seen.iter().any(|s| eq_ignore_case(s, name)) {
            return Err(TemplateErrorKind::DuplicateParameter(name.to_string()));
        }
        seen.push(name);
    }
    Ok(())
}

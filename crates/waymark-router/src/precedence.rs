//! Route precedence: the sort order of entries in a table, and the separate
//! structural-equality check used to report ambiguous routes.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use crate::matcher::RouteEntry;
use crate::template::{RouteTemplate, SegmentPart, TemplateParameter, TemplateSegment};

/// How one entry relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specificity {
    /// Tried before the other entry.
    MoreSpecific,
    /// Tried after the other entry.
    LessSpecific,
    /// Same shape and same order: neither can be preferred.
    Ambiguous,
}

/// Specificity of one template position. Lower ranks are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Literal,
    Complex,
    /// The template has already ended at this position.
    Absent,
    /// More constraints rank first.
    Parameter(Reverse<usize>),
    CatchAll(Reverse<usize>),
}

fn rank(segment: Option<&TemplateSegment>) -> Rank {
    match segment {
        None => Rank::Absent,
        Some(TemplateSegment::Literal(_)) => Rank::Literal,
        Some(TemplateSegment::Complex(_)) => Rank::Complex,
        Some(TemplateSegment::Parameter(p)) if p.is_catch_all => {
            Rank::CatchAll(Reverse(p.constraints.len()))
        }
        Some(TemplateSegment::Parameter(p)) => Rank::Parameter(Reverse(p.constraints.len())),
    }
}

/// Total order for sorting entries: `Less` means `a` is tried first.
///
/// Positions are compared left to right and the first difference decides.
/// Full ties fall back to `order`, then to the template text compared
/// case-insensitively, then exactly.
pub fn compare_precedence<H>(a: &RouteEntry<H>, b: &RouteEntry<H>) -> Ordering {
    compare_templates(&a.template, &b.template)
        .then_with(|| a.order.cmp(&b.order))
        .then_with(|| {
            let (a, b) = (a.template.text(), b.template.text());
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
                .then_with(|| a.cmp(b))
        })
}

/// Compare only the per-position specificity of two templates.
pub fn compare_templates(a: &RouteTemplate, b: &RouteTemplate) -> Ordering {
    let (a, b) = (a.segments(), b.segments());
    (0..a.len().max(b.len()))
        .map(|i| rank(a.get(i)).cmp(&rank(b.get(i))))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Classify `a` relative to `b`.
pub fn classify<H>(a: &RouteEntry<H>, b: &RouteEntry<H>) -> Specificity {
    if a.order == b.order && is_structurally_equal(&a.template, &b.template) {
        return Specificity::Ambiguous;
    }
    match compare_precedence(a, b) {
        Ordering::Less => Specificity::MoreSpecific,
        Ordering::Greater => Specificity::LessSpecific,
        Ordering::Equal => Specificity::Ambiguous,
    }
}

/// Whether two templates can match exactly the same paths with the same
/// precedence: equal literals (ignoring case) and equal parameter shapes at
/// every position. Parameter names do not matter.
pub fn is_structurally_equal(a: &RouteTemplate, b: &RouteTemplate) -> bool {
    shape_key(a) == shape_key(b)
}

/// Normalised shape of a template, e.g. `users/{int}/{*}` for
/// `Users/{id:int}/{*rest}`.
pub fn shape_key(template: &RouteTemplate) -> String {
    let mut key = String::new();
    for (i, segment) in template.segments().iter().enumerate() {
        if i > 0 {
            key.push('/');
        }
        match segment {
            TemplateSegment::Literal(text) => push_literal(&mut key, text),
            TemplateSegment::Parameter(p) => push_parameter(&mut key, p),
            TemplateSegment::Complex(complex) => {
                for part in &complex.parts {
                    match part {
                        SegmentPart::Literal(text) => push_literal(&mut key, text),
                        SegmentPart::Parameter(p) => push_parameter(&mut key, p),
                    }
                }
            }
        }
    }
    key
}

fn push_literal(key: &mut String, text: &str) {
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            '{' => key.push_str("{{"),
            '}' => key.push_str("}}"),
            c => key.push(c),
        }
    }
}

fn push_parameter(key: &mut String, p: &TemplateParameter) {
    key.push('{');
    if p.is_catch_all {
        key.push('*');
    }
    for (i, constraint) in p.constraints.iter().enumerate() {
        if i > 0 {
            key.push(':');
        }
        key.push_str(&constraint.token().to_lowercase());
    }
    if p.is_optional {
        key.push('?');
    }
    if p.default_value.is_some() {
        key.push('=');
    }
    key.push('}');
}

/// Find the first pair of entries, in registration order, that share a
/// shape and an order. Returns their indices.
pub fn find_ambiguity<H>(entries: &[RouteEntry<H>]) -> Option<(usize, usize)> {
    let mut seen: HashMap<(String, i32), usize> = HashMap::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let key = (shape_key(&entry.template), entry.order);
        if let Some(&first) = seen.get(&key) {
            return Some((first, i));
        }
        seen.insert(key, i);
    }
    None
}

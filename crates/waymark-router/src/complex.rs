//! Matching one path segment against a complex template segment such as
//! `{name}.{ext?}` or `foo.{p1}.{p2?}`.
//!
//! The scan runs right to left. A parameter is held until the literal to its
//! left is located with a last-occurrence search (ASCII case-insensitive),
//! and every parameter must capture at least one character. When the final
//! part is an optional parameter behind a `.`, the segment is first matched
//! with that parameter present; if that fails and the text does not itself
//! end in `.`, it is matched again without it.

use crate::template::{ComplexSegment, SegmentPart, TemplateParameter};

/// Captured raw text per parameter, left to right. `None` marks an optional
/// trailing parameter that was left out.
pub(crate) type Captures<'t, 'r> = Vec<(&'t TemplateParameter, Option<&'r str>)>;

pub(crate) fn match_complex<'t, 'r>(
    segment: &'t ComplexSegment,
    request: &'r str,
) -> Option<Captures<'t, 'r>> {
    let parts = &segment.parts;
    if parts.is_empty() || request.is_empty() {
        return None;
    }
    let last = parts.len() - 1;

    if let (SegmentPart::Parameter(optional), Some(SegmentPart::Literal(separator))) =
        (&parts[last], last.checked_sub(1).map(|i| &parts[i]))
    {
        if optional.is_optional {
            if let Some(captures) = match_from(parts, request, last) {
                return Some(captures);
            }
            if ends_with_ignore_ascii_case(request, separator) {
                return None;
            }
            let mut captures = match_from(parts, request, last.checked_sub(2)?)?;
            captures.push((optional, None));
            return Some(captures);
        }
    }

    match_from(parts, request, last)
}

/// Match `parts[..=last_used]` against the whole of `request`.
fn match_from<'t, 'r>(
    parts: &'t [SegmentPart],
    request: &'r str,
    last_used: usize,
) -> Option<Captures<'t, 'r>> {
    let lower = request.to_ascii_lowercase();
    let final_part = parts.len() - 1;
    let mut last_index = request.len();
    let mut pending: Option<&TemplateParameter> = None;
    let mut last_literal: Option<&str> = None;
    let mut captures = Vec::new();

    for i in (0..=last_used).rev() {
        let part = &parts[i];
        let mut new_last_index = last_index;

        match part {
            SegmentPart::Parameter(p) => pending = Some(p),
            SegmentPart::Literal(literal) => {
                last_literal = Some(literal);
                // leave at least one character for a pending parameter
                let end = if pending.is_some() {
                    previous_char_boundary(request, last_index)?
                } else {
                    last_index
                };
                if end == 0 {
                    return None;
                }
                let found = lower[..end].rfind(&literal.to_ascii_lowercase())?;
                if i == final_part && found + literal.len() != request.len() {
                    return None;
                }
                new_last_index = found;
            }
        }

        if let Some(parameter) = pending {
            let at_literal = matches!(part, SegmentPart::Literal(_));
            if (last_literal.is_some() && at_literal) || i == 0 {
                let start = match last_literal {
                    Some(literal) if at_literal => new_last_index + literal.len(),
                    _ => 0,
                };
                let value = &request[start..last_index];
                if value.is_empty() {
                    return None;
                }
                captures.push((parameter, Some(value)));
                pending = None;
                last_literal = None;
            }
        }

        last_index = new_last_index;
    }

    if last_index == 0 || matches!(parts[0], SegmentPart::Parameter(_)) {
        captures.reverse();
        Some(captures)
    } else {
        None
    }
}

fn previous_char_boundary(s: &str, index: usize) -> Option<usize> {
    s[..index].char_indices().next_back().map(|(i, _)| i)
}

fn ends_with_ignore_ascii_case(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len()
        && s.is_char_boundary(s.len() - suffix.len())
        && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

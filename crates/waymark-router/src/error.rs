use thiserror::Error;

/// Errors produced while building a route table or binding request values.
///
/// Every variant except [`RouteError::QueryValue`] is a build-time
/// configuration error: it aborts route table construction and is meant
/// for the application developer, not the requester.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// E2001: The template text is malformed.
    #[error("E2001: invalid route template '{template}': {kind}")]
    TemplateSyntax {
        template: String,
        kind: TemplateErrorKind,
    },

    /// E2002: A constraint token has no registered implementation.
    #[error("E2002: unsupported route constraint '{constraint}'")]
    UnsupportedConstraint { constraint: String },

    /// E2003: A known constraint was given unusable arguments.
    #[error("E2003: invalid arguments for route constraint '{constraint}': {reason}")]
    InvalidConstraintArgument { constraint: String, reason: String },

    /// E2004: Two entries cannot be ordered relative to each other.
    #[error(
        "E2004: ambiguous routes: '{first}' (handler {first_handler}) and '{second}' \
         (handler {second_handler}) have the same shape and order"
    )]
    AmbiguousRoute {
        first: String,
        first_handler: String,
        second: String,
        second_handler: String,
    },

    /// E2005: A query-string value could not be converted to its declared type.
    #[error("E2005: cannot convert query value '{value}' to {target} for parameter '{name}'")]
    QueryValue {
        name: String,
        value: String,
        target: String,
    },
}

impl RouteError {
    pub(crate) fn syntax(template: &str, kind: TemplateErrorKind) -> Self {
        RouteError::TemplateSyntax {
            template: template.to_string(),
            kind,
        }
    }
}

/// The specific way a template failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateErrorKind {
    #[error("the template contains an empty segment; consecutive '/' characters are not allowed")]
    EmptySegment,

    #[error("there is an incomplete parameter; check that each '{{' has a matching '}}'")]
    UnclosedParameter,

    #[error("there is an incomplete parameter; a '}}' has no matching '{{'")]
    UnopenedParameter,

    #[error("in a route parameter, '{{' and '}}' must be escaped with '{{{{' and '}}}}'")]
    UnescapedBrace,

    #[error("a parameter name is empty")]
    EmptyParameterName,

    #[error(
        "the parameter name '{0}' is invalid; names cannot contain '{{', '}}', '=', '.', '/', '*' or '?'"
    )]
    InvalidParameterName(String),

    #[error("the '?' marker on parameter '{0}' must appear at the very end of the parameter")]
    MisplacedOptionalMarker(String),

    #[error("the parameter '{0}' has more than one '*' catch-all marker")]
    MultipleCatchAllMarkers(String),

    #[error("the constraint '{0}' on a parameter is malformed")]
    MalformedConstraint(String),

    #[error("the catch-all parameter '{0}' must be the last segment of the template")]
    CatchAllNotLast(String),

    #[error("the catch-all parameter '{0}' cannot be marked optional")]
    OptionalCatchAll(String),

    #[error("the catch-all parameter '{0}' cannot appear inside a segment with other content")]
    CatchAllInComplexSegment(String),

    #[error("the parameter '{0}' cannot be both optional and have a default value")]
    OptionalWithDefault(String),

    #[error("the parameter '{0}' cannot declare a default value inside a segment with other content")]
    DefaultInComplexSegment(String),

    #[error("the parameter name '{0}' appears more than once (names are case-insensitive)")]
    DuplicateParameter(String),

    #[error("the segment '{0}' follows an optional parameter but is not optional itself")]
    RequiredAfterOptional(String),

    #[error("a segment cannot contain two consecutive parameters; they must be separated by literal text")]
    AdjacentParameters,

    #[error("the optional parameter '{0}' must be the last part of its segment")]
    OptionalNotLastInSegment(String),

    #[error("the optional parameter '{0}' can only be preceded by a period (.) inside its segment")]
    InvalidOptionalSeparator(String),

    #[error("the literal section '{0}' is invalid; literals cannot contain '?'")]
    QuestionMarkInLiteral(String),

    #[error("a template may only start with '~' when it is followed by '/'")]
    InvalidTildePrefix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_names_template_and_reason() {
        let err = RouteError::syntax("a//b", TemplateErrorKind::EmptySegment);
        let message = err.to_string();
        assert!(message.starts_with("E2001"));
        assert!(message.contains("'a//b'"));
        assert!(message.contains("consecutive '/'"));
    }

    #[test]
    fn brace_escapes_render_literally() {
        assert_eq!(
            TemplateErrorKind::UnescapedBrace.to_string(),
            "in a route parameter, '{' and '}' must be escaped with '{{' and '}}'"
        );
    }

    #[test]
    fn ambiguous_route_names_both_sides() {
        let err = RouteError::AmbiguousRoute {
            first: "users/{id}".into(),
            first_handler: "\"a\"".into(),
            second: "users/{name}".into(),
            second_handler: "\"b\"".into(),
        };
        let message = err.to_string();
        assert!(message.contains("users/{id}"));
        assert!(message.contains("users/{name}"));
        assert!(message.contains("\"a\""));
        assert!(message.contains("\"b\""));
    }
}

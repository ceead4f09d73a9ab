//! Route constraints and the registry that resolves constraint tokens.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::convert::ValueConverter;
use crate::error::RouteError;
use crate::value::RouteValue;

/// A predicate registered by the application under a constraint name.
pub type CustomConstraint = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Outcome of running one constraint against a parameter's raw text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Check {
    Reject,
    Accept,
    Converted(RouteValue),
}

#[derive(Clone)]
enum ConstraintKind {
    Convert(ValueConverter),
    Alpha,
    Min(i64),
    Max(i64),
    Range(i64, i64),
    MinLength(usize),
    MaxLength(usize),
    Length(usize, usize),
    #[cfg(feature = "regex")]
    Regex(Arc<regex_lite::Regex>),
    Custom(CustomConstraint),
}

/// A resolved constraint token, e.g. `int`, `range(1,20)` or `regex(^\d+$)`.
#[derive(Clone)]
pub struct RouteConstraint {
    token: String,
    kind: ConstraintKind,
}

impl RouteConstraint {
    /// The token as written in the template.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether this constraint converts the value to a typed value.
    pub fn is_converter(&self) -> bool {
        matches!(self.kind, ConstraintKind::Convert(_))
    }

    pub(crate) fn check(&self, raw: &str) -> Check {
        let accepted = match &self.kind {
            ConstraintKind::Convert(converter) => {
                return match converter.parse(raw) {
                    Some(value) => Check::Converted(value),
                    None => Check::Reject,
                };
            }
            ConstraintKind::Alpha => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphabetic()),
            ConstraintKind::Min(min) => raw.parse::<i64>().is_ok_and(|v| v >= *min),
            ConstraintKind::Max(max) => raw.parse::<i64>().is_ok_and(|v| v <= *max),
            ConstraintKind::Range(min, max) => {
                raw.parse::<i64>().is_ok_and(|v| v >= *min && v <= *max)
            }
            ConstraintKind::MinLength(min) => raw.chars().count() >= *min,
            ConstraintKind::MaxLength(max) => raw.chars().count() <= *max,
            ConstraintKind::Length(min, max) => {
                let len = raw.chars().count();
                len >= *min && len <= *max
            }
            #[cfg(feature = "regex")]
            ConstraintKind::Regex(regex) => regex.is_match(raw),
            ConstraintKind::Custom(predicate) => predicate(raw),
        };
        if accepted {
            Check::Accept
        } else {
            Check::Reject
        }
    }
}

impl fmt::Debug for RouteConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RouteConstraint").field(&self.token).finish()
    }
}

impl PartialEq for RouteConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.token.eq_ignore_ascii_case(&other.token)
    }
}

/// Resolves constraint tokens to [`RouteConstraint`]s.
///
/// Built-in tokens: the typed converters (`bool`, `datetime`, `decimal`,
/// `double`, `float`, `guid`, `int`, `long`) and the validators `alpha`,
/// `min(n)`, `max(n)`, `range(a,b)`, `minlength(n)`, `maxlength(n)`,
/// `length(n)`, `length(a,b)` and `regex(pattern)`. Applications can add
/// their own validators by name.
#[derive(Clone, Default)]
pub struct ConstraintRegistry {
    custom: HashMap<String, CustomConstraint>,
}

impl ConstraintRegistry {
    /// Create a registry with only the built-in constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validating constraint. Names are matched case-insensitively
    /// and cannot shadow built-in tokens.
    pub fn with_constraint<F>(mut self, name: &str, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom
            .insert(name.to_ascii_lowercase(), Arc::new(predicate));
        self
    }

    /// Resolve a token such as `int` or `range(1,20)`.
    pub fn resolve(&self, token: &str) -> Result<RouteConstraint, RouteError> {
        let (name, args) = split_token(token)?;
        let lower = name.to_ascii_lowercase();
        let converter = args
            .is_none()
            .then(|| ValueConverter::for_token(&lower))
            .flatten();

        let kind = match (lower.as_str(), args, converter) {
            (_, _, Some(converter)) => ConstraintKind::Convert(converter),
            ("alpha", None, _) => ConstraintKind::Alpha,
            ("min", Some(args), _) => ConstraintKind::Min(parse_arg(token, args)?),
            ("max", Some(args), _) => ConstraintKind::Max(parse_arg(token, args)?),
            ("range", Some(args), _) => {
                let (min, max) = parse_pair(token, args)?;
                ConstraintKind::Range(min, max)
            }
            ("minlength", Some(args), _) => ConstraintKind::MinLength(parse_arg(token, args)?),
            ("maxlength", Some(args), _) => ConstraintKind::MaxLength(parse_arg(token, args)?),
            ("length", Some(args), _) if args.contains(',') => {
                let (min, max) = parse_pair(token, args)?;
                ConstraintKind::Length(min, max)
            }
            ("length", Some(args), _) => {
                let len = parse_arg(token, args)?;
                ConstraintKind::Length(len, len)
            }
            #[cfg(feature = "regex")]
            ("regex", Some(pattern), _) => {
                let regex = regex_lite::RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| invalid_argument(token, e.to_string()))?;
                ConstraintKind::Regex(Arc::new(regex))
            }
            (_, None, _) => match self.custom.get(&lower) {
                Some(predicate) => ConstraintKind::Custom(Arc::clone(predicate)),
                None => return Err(unsupported(token)),
            },
            _ => return Err(unsupported(token)),
        };

        Ok(RouteConstraint {
            token: token.to_string(),
            kind,
        })
    }
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConstraintRegistry")
            .field("custom", &names)
            .finish()
    }
}

/// Split `name(args)` into its name and argument text.
fn split_token(token: &str) -> Result<(&str, Option<&str>), RouteError> {
    match token.find('(') {
        None => Ok((token, None)),
        Some(open) => {
            let args = token[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| invalid_argument(token, "missing closing ')'".to_string()))?;
            Ok((&token[..open], Some(args)))
        }
    }
}

fn parse_arg<T: std::str::FromStr>(token: &str, arg: &str) -> Result<T, RouteError> {
    arg.trim()
        .parse()
        .map_err(|_| invalid_argument(token, format!("'{}' is not a valid number", arg.trim())))
}

fn parse_pair<T>(token: &str, args: &str) -> Result<(T, T), RouteError>
where
    T: std::str::FromStr + PartialOrd,
{
    let (a, b) = args
        .split_once(',')
        .ok_or_else(|| invalid_argument(token, "expected two arguments".to_string()))?;
    let (min, max): (T, T) = (parse_arg(token, a)?, parse_arg(token, b)?);
    if min > max {
        return Err(invalid_argument(
            token,
            "the minimum is greater than the maximum".to_string(),
        ));
    }
    Ok((min, max))
}

fn unsupported(token: &str) -> RouteError {
    RouteError::UnsupportedConstraint {
        constraint: token.to_string(),
    }
}

fn invalid_argument(token: &str, reason: String) -> RouteError {
    RouteError::InvalidConstraintArgument {
        constraint: token.to_string(),
        reason,
    }
}

//! Supplying declared query-string parameters as typed values.
//!
//! Handlers declare the query parameters they accept up front as
//! `(name, type)` pairs. Binding parses the request query once and converts
//! each declared parameter with [`ValueConverter::for_type`].

use percent_encoding::percent_decode_str;

use crate::convert::{TargetType, ValueConverter};
use crate::error::RouteError;
use crate::template::eq_ignore_case;
use crate::value::{RouteValue, RouteValues};

/// A query parameter a handler accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParameter {
    pub name: String,
    pub target: TargetType,
    /// Array destination: every occurrence is converted.
    pub multiple: bool,
}

impl QueryParameter {
    /// A single-valued query parameter.
    pub fn new(name: impl Into<String>, target: TargetType) -> Self {
        Self {
            name: name.into(),
            target,
            multiple: false,
        }
    }

    /// An array query parameter: every occurrence is converted.
    pub fn multiple(name: impl Into<String>, target: TargetType) -> Self {
        Self {
            name: name.into(),
            target,
            multiple: true,
        }
    }

    /// Parse a declared type such as `int`, `int?`, `string[]` or `guid?[]`.
    pub fn parse(name: impl Into<String>, declared: &str) -> Option<Self> {
        let declared = declared.trim();
        match declared.strip_suffix("[]") {
            Some(element) => TargetType::parse(element).map(|t| Self::multiple(name, t)),
            None => TargetType::parse(declared).map(|t| Self::new(name, t)),
        }
    }
}

/// Split a query string into decoded `(key, value)` pairs.
///
/// Pairs are separated by `&`; a pair without `=` has an empty value and
/// `+` decodes to a space.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(text: &str) -> String {
    let text = text.replace('+', " ");
    percent_decode_str(&text).decode_utf8_lossy().into_owned()
}

/// Bind every declared parameter from `query`.
///
/// Keys match case-insensitively. A scalar takes the last occurrence and is
/// `Null` when absent; an array collects every occurrence and is empty when
/// absent. A present value that does not convert fails the whole binding.
pub fn bind_query(
    parameters: &[QueryParameter],
    query: Option<&str>,
) -> Result<RouteValues, RouteError> {
    let pairs = query.map(parse_query).unwrap_or_default();
    let mut values = RouteValues::new();

    for parameter in parameters {
        let converter = ValueConverter::for_type(parameter.target);
        let raw: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| eq_ignore_case(key, &parameter.name))
            .map(|(_, value)| value.as_str())
            .collect();

        let value = if parameter.multiple {
            converter
                .parse_multiple(&raw)
                .ok_or_else(|| query_error(parameter, &raw.join(",")))?
        } else {
            match raw.last() {
                None => RouteValue::Null,
                Some(text) => converter
                    .parse(text)
                    .ok_or_else(|| query_error(parameter, text))?,
            }
        };
        values.insert(&parameter.name, value);
    }

    Ok(values)
}

fn query_error(parameter: &QueryParameter, value: &str) -> RouteError {
    RouteError::QueryValue {
        name: parameter.name.clone(),
        value: value.to_string(),
        target: if parameter.multiple {
            format!("{}[]", parameter.target)
        } else {
            parameter.target.to_string()
        },
    }
}

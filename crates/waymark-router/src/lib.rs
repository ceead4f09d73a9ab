//! Route template parsing, matching and precedence.
//!
//! Templates such as `blog/{id:int}/{slug?}` or `files/{*path}` are parsed
//! once, bound to handlers and sorted by specificity into an immutable
//! [`RouteTable`]. Routing a request path tries the entries in that order
//! and returns the first match with its typed parameter values.
//!
//! ```
//! use waymark_router::{RouteTable, RouteValue};
//!
//! let table = RouteTable::builder()
//!     .add("post", ["blog/{id:int}/{slug?}"])
//!     .add("archive", ["blog/{*rest}"])
//!     .build()
//!     .unwrap();
//!
//! let found = table.route("/blog/5").found().unwrap();
//! assert_eq!(*found.handler(), "post");
//! assert_eq!(found.values.get("id"), Some(&RouteValue::Int(5)));
//! assert_eq!(found.values.get("slug"), Some(&RouteValue::Null));
//! ```

pub mod cache;
mod complex;
pub mod constraint;
pub mod convert;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod precedence;
pub mod query;
pub mod table;
pub mod template;
pub mod value;

pub use cache::RouteTableCache;
pub use constraint::{ConstraintRegistry, RouteConstraint};
pub use convert::{Decimal, TargetType, ValueConverter, ValueKind};
pub use error::{RouteError, TemplateErrorKind};
pub use matcher::{match_entry, match_template, RouteEntry};
pub use parser::{parse_template, TemplateParser};
pub use precedence::{classify, compare_precedence, is_structurally_equal, Specificity};
pub use query::{bind_query, QueryParameter};
pub use table::{
    EmptySegmentPolicy, Match, RouteGroup, RouteMatch, RouteTable, RouteTableBuilder,
    RouterOptions,
};
pub use template::{ComplexSegment, RouteTemplate, SegmentPart, TemplateParameter, TemplateSegment};
pub use value::{RouteValue, RouteValues};

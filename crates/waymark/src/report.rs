//! Serializable views of a route table and of routing results.

use serde::Serialize;
use waymark_router::{RouteTable, RouteValues};
use waymark_telemetry::{log_route_matched, log_route_not_found};

/// One table entry, in match order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub position: usize,
    pub handler: String,
    pub template: String,
    pub order: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unused: Vec<String>,
}

/// Describe every entry of `table`, in match order.
pub fn describe_table(table: &RouteTable<String>) -> Vec<EntryReport> {
    table
        .entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| EntryReport {
            position,
            handler: entry.handler.clone(),
            template: entry.template.text().to_string(),
            order: entry.order,
            unused: entry.unused_parameter_names.clone(),
        })
        .collect()
}

/// Render entries as aligned text, one per line.
pub fn render_table_text(entries: &[EntryReport]) -> String {
    let width = entries
        .iter()
        .map(|e| e.template.len())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|entry| {
            let mut line = format!(
                "{:>3}  {:<width$}  {}",
                entry.position, entry.template, entry.handler
            );
            if entry.order != 0 {
                line.push_str(&format!("  (order {})", entry.order));
            }
            line.push('\n');
            line
        })
        .collect()
}

/// Outcome of routing one URL.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub url: String,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<RouteValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<RouteValues>,
    /// Set when the path matched but a declared query value did not convert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Route `url` and bind its declared query values.
pub fn route_url(table: &RouteTable<String>, url: &str) -> MatchReport {
    let Some(found) = table.route(url).found() else {
        log_route_not_found!(url, "no route matched");
        return MatchReport {
            url: url.to_string(),
            matched: false,
            handler: None,
            template: None,
            values: None,
            query: None,
            error: None,
        };
    };

    log_route_matched!(
        url,
        handler = %found.handler(),
        template = found.template(),
        "route matched"
    );

    let (query, error) = match found.bind_query() {
        Ok(query) if query.is_empty() => (None, None),
        Ok(query) => (Some(query), None),
        Err(e) => (None, Some(e.to_string())),
    };

    MatchReport {
        url: url.to_string(),
        matched: true,
        handler: Some(found.handler().clone()),
        template: Some(found.template().to_string()),
        values: Some(found.values),
        query,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use waymark_router::{QueryParameter, RouteGroup, TargetType, ValueKind};

    fn table() -> RouteTable<String> {
        RouteTable::builder()
            .group(
                RouteGroup::new("posts.show".to_string())
                    .template("blog/{id:int}/{slug?}")
                    .template_with_order("b/{id:int}", 2)
                    .query(QueryParameter::new("page", TargetType::new(ValueKind::Int))),
            )
            .add("archive".to_string(), ["blog/{*rest}"])
            .build()
            .unwrap()
    }

    #[test]
    fn describes_entries_in_match_order() {
        let entries = describe_table(&table());
        let templates: Vec<_> = entries.iter().map(|e| e.template.as_str()).collect();
        assert_eq!(templates, ["b/{id:int}", "blog/{id:int}/{slug?}", "blog/{*rest}"]);
        assert_eq!(entries[0].unused, ["slug"]);
        assert_eq!(entries[0].order, 2);
        assert!(entries[2].unused.is_empty());
    }

    #[test]
    fn text_rendering() {
        let text = render_table_text(&describe_table(&table()));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  0  b/{id:int}"));
        assert!(lines[0].ends_with("posts.show  (order 2)"));
        assert!(lines[2].ends_with("archive"));
        assert!(text.ends_with('\n'));
        assert_eq!(render_table_text(&[]), "");
    }

    #[test]
    fn matched_report() {
        let report = route_url(&table(), "/blog/5?page=2");
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "url": "/blog/5?page=2",
                "matched": true,
                "handler": "posts.show",
                "template": "blog/{id:int}/{slug?}",
                "values": { "id": 5, "slug": null },
                "query": { "page": 2 },
            })
        );
    }

    #[test]
    fn bad_query_value_is_reported() {
        let report = route_url(&table(), "/blog/5?page=two");
        assert!(report.matched);
        assert!(report.query.is_none());
        assert!(report.error.unwrap().contains("page"));
    }

    #[test]
    fn not_found_report() {
        let report = route_url(&table(), "/about");
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "url": "/about", "matched": false })
        );
    }
}

use crate::error::StoreError;
use crate::filter::sort::SortState;
use crate::models::{Column, Listing};
use crate::store::traits::ListingStore;
use crate::store::types::{Condition, ListingPage, ListingQuery};
use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection details for a PostgREST endpoint (Supabase `rest/v1`)
#[derive(Debug, Clone)]
pub struct PostgrestOptions {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Anonymous (public) API key
    pub api_key: String,
    pub table: String,
}

/// Listing store reading the hosted `properties` table over HTTP
pub struct PostgrestStore {
    client: Client,
    options: PostgrestOptions,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    details: Option<String>,
}

impl PostgrestStore {
    pub fn new(options: PostgrestOptions) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("listing-scout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, options })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.options.base_url.trim_end_matches('/'),
            self.options.table
        )
    }

    async fn get(
        &self,
        pairs: &[(String, String)],
        count_total: bool,
    ) -> Result<Response, StoreError> {
        let url = self.table_url();
        debug!("GET {} {:?}", url, pairs);

        let mut request = self
            .client
            .get(&url)
            .query(pairs)
            .header("apikey", self.options.api_key.as_str())
            .bearer_auth(&self.options.api_key);
        if count_total {
            request = request.header("Prefer", "count=exact");
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Listing store returned status: {}", status);
            return Err(StoreError::Backend {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ListingStore for PostgrestStore {
    async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
        let pairs = query_pairs(query);
        let response = self.get(&pairs, query.count_total).await?;

        let total = if query.count_total {
            response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range)
        } else {
            None
        };

        let body = response.text().await?;
        let rows: Vec<Listing> = serde_json::from_str(&body)?;

        info!(
            "Fetched {} listings from {} (total: {:?})",
            rows.len(),
            self.options.table,
            total
        );
        Ok(ListingPage { rows, total })
    }

    /// Walks the column in ascending order one value at a time, each step
    /// asking for the first value greater than the previous one
    async fn distinct(&self, column: Column, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut values = Vec::new();
        let mut after: Option<String> = None;

        while values.len() < limit {
            let pairs = distinct_step_pairs(column, after.as_deref());
            let response = self.get(&pairs, false).await?;
            let body = response.text().await?;
            let rows: Vec<Map<String, Value>> = serde_json::from_str(&body)?;

            let next = rows
                .into_iter()
                .next()
                .and_then(|mut row| match row.remove(column.name()) {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                });
            let Some(value) = next else {
                break;
            };
            if !value.trim().is_empty() {
                values.push(value.clone());
            }
            after = Some(value);
        }

        debug!("{} distinct values for {}", values.len(), column);
        Ok(values)
    }

    fn source_name(&self) -> &'static str {
        "PostgREST"
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            details,
        }) => match details {
            Some(details) if !details.is_empty() => format!("{message} ({details})"),
            _ => message,
        },
        _ if body.trim().is_empty() => "empty error response".to_string(),
        _ => body.trim().to_string(),
    }
}

/// Query-string pairs for a listing read
pub fn query_pairs(query: &ListingQuery) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("select".to_string(), Column::projection()),
        ("order".to_string(), order_clause(&query.order)),
        ("limit".to_string(), query.limit.to_string()),
    ];

    for condition in &query.conditions {
        pairs.push(condition_pair(condition));
    }

    pairs
}

/// One keyset step over a column: the smallest non-null value after `after`
fn distinct_step_pairs(column: Column, after: Option<&str>) -> Vec<(String, String)> {
    let bound = match after {
        Some(last) => format!("gt.{last}"),
        None => "not.is.null".to_string(),
    };
    vec![
        ("select".to_string(), column.name().to_string()),
        (column.name().to_string(), bound),
        ("order".to_string(), format!("{}.asc", column.name())),
        ("limit".to_string(), "1".to_string()),
    ]
}

/// Absent values are lowest: first ascending, last descending
fn order_clause(order: &SortState) -> String {
    let (direction, nulls) = if order.direction.is_ascending() {
        ("asc", "nullsfirst")
    } else {
        ("desc", "nullslast")
    };
    format!("{}.{}.{}", order.column.name(), direction, nulls)
}

fn condition_pair(condition: &Condition) -> (String, String) {
    match condition {
        Condition::Equals(column, value) => (column.name().to_string(), format!("eq.{value}")),
        Condition::Is(column, value) => (column.name().to_string(), format!("is.{value}")),
        Condition::Contains(column, needle) => (
            column.name().to_string(),
            format!("ilike.*{}*", escape_like(needle)),
        ),
        Condition::AnyContains(columns, needle) => {
            let pattern = quote(&format!("*{}*", escape_like(needle)));
            let alternatives = columns
                .iter()
                .map(|c| format!("{}.ilike.{}", c.name(), pattern))
                .collect::<Vec<_>>()
                .join(",");
            ("or".to_string(), format!("({alternatives})"))
        }
        Condition::AtLeast(column, bound) => (column.name().to_string(), format!("gte.{bound}")),
        Condition::AtMost(column, bound) => (column.name().to_string(), format!("lte.{bound}")),
    }
}

// LIKE wildcards typed by the user match literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// values inside or=(...) must be double-quoted when they carry reserved characters
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Total from a `Content-Range` header such as `0-49/1234` or `*/0`
pub fn parse_content_range(header: &str) -> Option<usize> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

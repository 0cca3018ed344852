//! REST `DataClient` for the hosted backend.
//!
//! Speaks the PostgREST dialect: tables under `/rest/v1/<table>`, procedures
//! under `/rest/v1/rpc/<name>`, filters as `column=op.value` query pairs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use routebill_shared::config::BackendConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{DataClient, Filter, Query, Row};
use crate::error::DataError;

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// REST client for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    schema: String,
}

impl RestClient {
    /// Builds a client from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns `DataError::Transport` if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| DataError::Transport(format!("invalid API key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| DataError::Transport(format!("invalid API key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            schema: config.schema.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let profile = if method == Method::GET || method == Method::HEAD {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        self.http
            .request(method, format!("{}/{path}", self.base_url))
            .header(profile, &self.schema)
    }

    async fn send(request: RequestBuilder) -> Result<Response, DataError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: BackendErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = match (body.message, body.details, body.hint) {
            (Some(message), _, _) if !message.trim().is_empty() => message,
            (_, Some(details), _) => details,
            (_, _, Some(hint)) => hint,
            _ if !text.trim().is_empty() => text,
            _ => status.canonical_reason().unwrap_or("Request failed").to_string(),
        };

        Err(DataError::Backend {
            status: status.as_u16(),
            code: body.code,
            message,
        })
    }

    async fn rows(response: Response) -> Result<Vec<Row>, DataError> {
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Encodes filters, order and limit as query pairs.
fn query_pairs(query: &Query) -> Vec<(String, String)> {
    let mut pairs = vec![(
        "select".to_string(),
        query.columns.clone().unwrap_or_else(|| "*".to_string()),
    )];
    pairs.extend(filter_pairs(&query.filters));
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        pairs.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    pairs
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Compare { column, op, value } => {
                (column.clone(), format!("{}.{}", op.as_str(), literal(value)))
            }
            Filter::In { column, values } => (column.clone(), format!("in.({})", list(values))),
            Filter::IsNull { column } => (column.clone(), "is.null".to_string()),
            Filter::Or(inner) => (
                "or".to_string(),
                format!(
                    "({})",
                    inner.iter().map(nested).collect::<Vec<_>>().join(",")
                ),
            ),
        })
        .collect()
}

/// A filter inside `or=(...)`, written `column.op.value`.
fn nested(filter: &Filter) -> String {
    match filter {
        Filter::Compare { column, op, value } => {
            format!("{column}.{}.{}", op.as_str(), quoted(value))
        }
        Filter::In { column, values } => format!("{column}.in.({})", list(values)),
        Filter::IsNull { column } => format!("{column}.is.null"),
        Filter::Or(inner) => format!(
            "or({})",
            inner.iter().map(nested).collect::<Vec<_>>().join(",")
        ),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Values containing list syntax are double-quoted.
fn quoted(value: &Value) -> String {
    let raw = literal(value);
    if raw.contains([',', '(', ')', '"', ':']) {
        format!("\"{}\"", raw.replace('"', "\\\""))
    } else {
        raw
    }
}

fn list(values: &[Value]) -> String {
    values.iter().map(quoted).collect::<Vec<_>>().join(",")
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl DataClient for RestClient {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, DataError> {
        debug!(table = %query.table, filters = query.filters.len(), "select");
        let request = self
            .request(Method::GET, &query.table)
            .query(&query_pairs(query));
        Self::rows(Self::send(request).await?).await
    }

    async fn count(&self, query: &Query) -> Result<u64, DataError> {
        debug!(table = %query.table, "count");
        let mut pairs = filter_pairs(&query.filters);
        pairs.insert(
            0,
            (
                "select".to_string(),
                query.columns.clone().unwrap_or_else(|| "*".to_string()),
            ),
        );
        let request = self
            .request(Method::HEAD, &query.table)
            .header("Prefer", "count=exact")
            .query(&pairs);
        let response = Self::send(request).await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| DataError::Decode("missing Content-Range count".to_string()))
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, DataError> {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row);
        Self::rows(Self::send(request).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Decode(format!("insert into {table} returned no row")))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, DataError> {
        let request = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&filter_pairs(filters))
            .json(&patch);
        Self::rows(Self::send(request).await?).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, DataError> {
        let request = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(&filter_pairs(filters));
        let removed = Self::rows(Self::send(request).await?).await?;
        Ok(removed.len() as u64)
    }

    async fn call(&self, procedure: &str, args: Value) -> Result<Value, DataError> {
        let request = self
            .request(Method::POST, &format!("rpc/{procedure}"))
            .json(&args);
        let bytes = Self::send(request).await?.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

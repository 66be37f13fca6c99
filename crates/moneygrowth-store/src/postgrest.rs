//! PostgREST table store (Supabase style REST endpoint).
//!
//! Every call is a single HTTP round trip against `{url}/rest/v1/{table}`.
//! Failures are surfaced as-is; nothing is retried.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, Query, StoreResponse};
use crate::{Row, TableStore};

const PREFER_RETURN: &str = "return=representation";
const PREFER_COUNT: &str = "count=exact";
const MAX_BIGINT: usize = i64::MAX as usize;

/// A table store talking to a hosted PostgREST endpoint.
///
/// The API key is sent both as `apikey` and as a bearer token, which is
/// what Supabase expects for anon and service keys alike.
#[derive(Debug)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
}

impl PostgrestStore {
    /// Creates a store for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn new(base_url: impl Into<String>, key: &str) -> StoreResult<Self> {
        Self::build(base_url.into(), key, None)
    }

    /// Creates a store with a request timeout.
    ///
    /// # Errors
    ///
    /// Same as [`PostgrestStore::new`].
    pub fn with_timeout(base_url: impl Into<String>, key: &str, timeout_secs: u64) -> StoreResult<Self> {
        Self::build(base_url.into(), key, Some(timeout_secs))
    }

    fn build(base_url: String, key: &str, timeout_secs: Option<u64>) -> StoreResult<Self> {
        let invalid_key = |_| StoreError::InvalidResponse {
            message: "API key is not a valid header value".to_string(),
        };

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid_key)?,
        );

        let mut builder = Client::builder()
            .user_agent(concat!("moneygrowth/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str, params: &[(String, String)]) -> RequestBuilder {
        let url = self.endpoint(table);
        log::debug!(target: "moneygrowth::store", "{} {} {:?}", method, url, params);
        self.client.request(method, url).query(params)
    }

    fn select_request(&self, table: &str, query: &Query) -> RequestBuilder {
        let request = self.request(Method::GET, table, &select_params(query));
        if query.count {
            request.header("Prefer", PREFER_COUNT)
        } else {
            request
        }
    }

    fn mutation_request(
        &self,
        method: Method,
        table: &str,
        body: Option<&Row>,
        filters: &[Filter],
    ) -> RequestBuilder {
        let request = self
            .request(method, table, &filter_params(filters))
            .header("Prefer", format!("{PREFER_RETURN},{PREFER_COUNT}"));
        match body {
            Some(body) => request.json(body),
            None => request,
        }
    }

    async fn mutate(
        &self,
        method: Method,
        table: &str,
        body: Option<&Row>,
        filters: &[Filter],
    ) -> StoreResult<StoreResponse> {
        let request = self.mutation_request(method, table, body, filters);
        read_response(request.send().await?).await.map(count_returned_rows)
    }
}

#[async_trait]
impl TableStore for PostgrestStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<StoreResponse> {
        let request = self.select_request(table, query);
        read_response(request.send().await?).await
    }

    async fn insert(&self, table: &str, row: &Row) -> StoreResult<StoreResponse> {
        self.mutate(Method::POST, table, Some(row), &[]).await
    }

    async fn update(&self, table: &str, patch: &Row, filters: &[Filter]) -> StoreResult<StoreResponse> {
        self.mutate(Method::PATCH, table, Some(patch), filters).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<StoreResponse> {
        self.mutate(Method::DELETE, table, None, filters).await
    }
}

// ==================== Request encoding ====================

/// Query string for a select request
pub(crate) fn select_params(query: &Query) -> Vec<(String, String)> {
    let columns = query
        .columns
        .as_ref()
        .filter(|c| !c.is_empty())
        .map_or_else(|| "*".to_string(), |c| c.join(","));

    let mut params = vec![("select".to_string(), columns)];
    params.extend(filter_params(&query.filters));

    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        let nulls = if order.nulls_last { ".nullslast" } else { "" };
        params.push(("order".to_string(), format!("{}.{}{}", order.column, direction, nulls)));
    }

    // PostgREST parses offset and limit as bigint.
    let (offset, len) = query.window();
    if offset > 0 {
        params.push(("offset".to_string(), offset.min(MAX_BIGINT).to_string()));
    }
    if let Some(len) = len {
        params.push(("limit".to_string(), len.min(MAX_BIGINT).to_string()));
    }

    params
}

/// Horizontal filters in PostgREST operator syntax
pub(crate) fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| match f {
            Filter::Eq(c, v) => (c.clone(), format!("eq.{}", plain_value(v))),
            Filter::In(c, vs) => {
                let items: Vec<String> = vs.iter().map(list_item).collect();
                (c.clone(), format!("in.({})", items.join(",")))
            }
            Filter::Regex(c, p) => (c.clone(), format!("match.{}", p)),
        })
        .collect()
}

fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Values inside `in.(...)` must be quoted when they contain reserved characters
fn list_item(value: &Value) -> String {
    let text = plain_value(value);
    if text.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        text
    }
}

// ==================== Response decoding ====================

async fn read_response(response: Response) -> StoreResult<StoreResponse> {
    let status = response.status();
    let count = response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_content_range);
    let body = response.text().await?;

    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(StoreResponse {
        data: parse_rows(&body)?,
        count,
    })
}

/// Mutations without a `Content-Range` total report the rows they returned
pub(crate) fn count_returned_rows(mut response: StoreResponse) -> StoreResponse {
    if response.count.is_none() {
        response.count = Some(response.data.len() as u64);
    }
    response
}

/// Total from a `Content-Range: 0-24/3573` header; `*` totals yield `None`
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

pub(crate) fn parse_rows(body: &str) -> StoreResult<Vec<Row>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(StoreError::InvalidResponse {
                    message: format!("expected a row object, got {}", other),
                }),
            })
            .collect(),
        Ok(Value::Object(row)) => Ok(vec![row]),
        Ok(other) => Err(StoreError::InvalidResponse {
            message: format!("expected a list of rows, got {}", other),
        }),
        Err(e) => Err(StoreError::InvalidResponse {
            message: e.to_string(),
        }),
    }
}

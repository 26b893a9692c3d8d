//! Reqwest-backed PostgREST adapter.
//!
//! This adapter owns transport details only: URL and header construction,
//! timeout and HTTP error mapping, and JSON decoding into rows.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::query::{parse_content_range, query_params};
use crate::domain::ports::{DataPort, DataPortError, Filter, Row, Selection, Table, TableQuery};

const OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";
const DEFAULT_SCHEMA: &str = "public";
/// PostgREST code for a single-object request that matched zero or many rows.
const SINGULAR_MISMATCH: &str = "PGRST116";

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// [`DataPort`] speaking to a PostgREST endpoint such as a hosted Supabase
/// project.
pub struct PostgrestDataPort {
    client: Client,
    rest_root: Url,
    api_key: String,
    schema: String,
}

impl PostgrestDataPort {
    /// Build an adapter for the project at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`DataPortError::Connection`] when the endpoint cannot carry a
    /// REST path or the reqwest client cannot be constructed.
    pub fn new(
        endpoint: &Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DataPortError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| DataPortError::connection(error.to_string()))?;
        let rest_root = rest_root(endpoint)?;
        Ok(Self {
            client,
            rest_root,
            api_key: api_key.into(),
            schema: DEFAULT_SCHEMA.to_owned(),
        })
    }

    /// Read from `schema` instead of `public`.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    fn url(&self, path: &str) -> Result<Url, DataPortError> {
        self.rest_root.join(path).map_err(|error| {
            DataPortError::connection(format!("invalid request path {path}: {error}"))
        })
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    fn read(&self, query: &TableQuery) -> Result<RequestBuilder, DataPortError> {
        let url = self.url(query.table.as_str())?;
        let request = self
            .client
            .get(url)
            .query(&query_params(query))
            .header("Accept-Profile", self.schema.as_str());
        Ok(self.authorised(request))
    }

    async fn send(request: RequestBuilder) -> Result<(HeaderMap, Vec<u8>), DataPortError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok((headers, body.to_vec()))
    }
}

fn rest_root(endpoint: &Url) -> Result<Url, DataPortError> {
    let base = endpoint.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/rest/v1/")).map_err(|error| {
        DataPortError::connection(format!("invalid endpoint {endpoint}: {error}"))
    })
}

fn total_from(headers: &HeaderMap) -> Result<u64, DataPortError> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range)
        .ok_or_else(|| DataPortError::decode("missing or malformed Content-Range header"))
}

fn parse_rows(body: &[u8]) -> Result<Vec<Row>, DataPortError> {
    serde_json::from_slice(body)
        .map_err(|error| DataPortError::decode(format!("invalid row array: {error}")))
}

fn parse_row(body: &[u8]) -> Result<Row, DataPortError> {
    serde_json::from_slice(body)
        .map_err(|error| DataPortError::decode(format!("invalid row object: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> DataPortError {
    if error.is_timeout() {
        DataPortError::connection(format!("request timed out: {error}"))
    } else {
        DataPortError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DataPortError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let details = parsed.details.unwrap_or_default();
    if parsed.code.as_deref() == Some(SINGULAR_MISMATCH) && details.contains(" 0 rows") {
        return DataPortError::no_rows();
    }

    let code = parsed
        .code
        .unwrap_or_else(|| status.as_u16().to_string());
    let message = parsed.message.unwrap_or_else(|| {
        let preview = body_preview(body);
        if preview.is_empty() {
            format!("status {}", status.as_u16())
        } else {
            format!("status {}: {preview}", status.as_u16())
        }
    });
    DataPortError::backend(code, message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl DataPort for PostgrestDataPort {
    async fn select(&self, query: &TableQuery) -> Result<Selection, DataPortError> {
        let mut request = self.read(query)?;
        if query.count {
            request = request.header("Prefer", "count=exact");
        }
        let (headers, body) = Self::send(request).await?;
        let rows = parse_rows(&body)?;
        let count = if query.count {
            Some(total_from(&headers)?)
        } else {
            None
        };
        debug!(table = %query.table, rows = rows.len(), ?count, "select completed");
        Ok(Selection { rows, count })
    }

    async fn select_one(&self, query: &TableQuery) -> Result<Row, DataPortError> {
        let request = self.read(query)?.header(ACCEPT, OBJECT_MEDIA_TYPE);
        let (_, body) = Self::send(request).await?;
        parse_row(&body)
    }

    async fn single(&self, table: Table, id: Uuid, columns: &str) -> Result<Row, DataPortError> {
        let query = TableQuery::new(table)
            .columns(columns)
            .filter(Filter::eq("id", id));
        self.select_one(&query).await
    }

    async fn list(&self, query: &TableQuery) -> Result<Vec<Row>, DataPortError> {
        let (_, body) = Self::send(self.read(query)?).await?;
        parse_rows(&body)
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> Result<u64, DataPortError> {
        let query = TableQuery::new(table)
            .columns("id")
            .filters(filters.iter().cloned());
        let url = self.url(table.as_str())?;
        let request = self
            .client
            .head(url)
            .query(&query_params(&query))
            .header("Accept-Profile", self.schema.as_str())
            .header("Prefer", "count=exact");
        let (headers, _) = Self::send(self.authorised(request)).await?;
        total_from(&headers)
    }

    async fn rpc(&self, name: &str, params: Value) -> Result<Value, DataPortError> {
        let url = self.url(&format!("rpc/{name}"))?;
        let request = self
            .client
            .post(url)
            .header("Content-Profile", self.schema.as_str())
            .json(&params);
        let (_, body) = Self::send(self.authorised(request)).await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body)
            .map_err(|error| DataPortError::decode(format!("invalid rpc result: {error}")))
    }
}

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE,
};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::gateway::{Filter, ListQuery, RemoteGateway, RowPage};
use crate::{FailureKind, GatewayError};

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// PostgREST root, e.g. `https://project.supabase.co/rest/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

/// [`RemoteGateway`] speaking the PostgREST HTTP dialect.
#[derive(Debug, Clone)]
pub struct PostgrestGateway {
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl PostgrestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(auth_headers(settings.api_key.as_deref())?)
            .build()
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, GatewayError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(GatewayError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(GatewayError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl RemoteGateway for PostgrestGateway {
    async fn query_list(&self, query: &ListQuery) -> Result<RowPage, GatewayError> {
        let mut url = self.endpoint(&query.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &query.select);
            for filter in &query.filters {
                let (key, value) = encode_filter(filter);
                pairs.append_pair(&key, &value);
            }
            if let Some(order) = &query.order {
                let direction = if order.descending { "desc" } else { "asc" };
                pairs.append_pair("order", &format!("{}.{direction}", order.column));
            }
            if let Some(range) = query.range {
                pairs.append_pair("offset", &range.offset.to_string());
                if let Some(limit) = range.limit {
                    pairs.append_pair("limit", &limit.to_string());
                }
            }
        }

        let mut request = self.client.get(url);
        if query.count {
            request = request.header("Prefer", "count=exact");
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total);
        // Offset past the last row.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(RowPage {
                rows: Vec::new(),
                total,
            });
        }
        if !status.is_success() {
            return Err(GatewayError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        let rows: Vec<Value> = serde_json::from_slice(&body)
            .map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))?;
        Ok(RowPage { rows, total })
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, GatewayError> {
        let url = self.endpoint(&format!("rpc/{name}"))?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(args.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body)
            .map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))
    }
}

fn auth_headers(api_key: Option<&str>) -> Result<HeaderMap, GatewayError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key {
        let invalid = |_| GatewayError::new(FailureKind::InvalidUrl, "api key is not a valid header");
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?,
        );
    }
    Ok(headers)
}

/// PostgREST horizontal filter as a query pair.
fn encode_filter(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq { column, value } => (column.clone(), format!("eq.{value}")),
        Filter::ILike { column, pattern } => (column.clone(), format!("ilike.*{pattern}*")),
        Filter::In { column, values } => {
            let quoted: Vec<String> = values
                .iter()
                .map(|value| format!("\"{}\"", value.replace('"', "\\\"")))
                .collect();
            (column.clone(), format!("in.({})", quoted.join(",")))
        }
        Filter::HasTag { column, tag } => (column.clone(), format!("cs.{{{tag}}}")),
        Filter::LacksTag { column, tag } => (
            "or".to_string(),
            format!("({column}.is.null,{column}.not.cs.{{{tag}}})"),
        ),
    }
}

/// `0-24/1347` -> 1347; `*/0` -> 0; `0-24/*` -> unknown.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return GatewayError::new(FailureKind::Decode, err.to_string());
    }
    GatewayError::new(FailureKind::Network, err.to_string())
}

//! Earth Engine REST client.
//!
//! One [`Session`] is created up front from explicit [`Credentials`] and passed
//! to every query. Each aggregation is a single `value:compute` call carrying an
//! expression graph equivalent to
//! `ImageCollection(id).filterDate(start, end).sum().reduceRegion(mean, point, scale)`.

use crate::{
    error::{InitError, QueryError},
    service::{AggregationRequest, AggregationService},
};
use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Cloud project and OAuth access token used for every request.
#[derive(Clone)]
pub struct Credentials {
    pub project: String,
    pub access_token: String,
}

impl Credentials {
    pub fn new(project: impl Into<String>, access_token: impl Into<String>) -> Self {
        Credentials {
            project: project.into(),
            access_token: access_token.into(),
        }
    }
}

// keep the token out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project", &self.project)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// An authenticated connection to Earth Engine.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    endpoint: String,
}

impl Session {
    /// Validate credentials and build the HTTP client.
    ///
    /// Nothing is sent over the network here; an expired token surfaces as
    /// [`QueryError::Unauthorized`] on the first query.
    pub fn connect(credentials: &Credentials, options: &SessionOptions) -> Result<Self, InitError> {
        let project = credentials.project.trim();
        if project.is_empty() {
            return Err(InitError::MissingCredential("project"));
        }
        let token = credentials.access_token.trim();
        if token.is_empty() {
            return Err(InitError::MissingCredential("access token"));
        }
        let base_url = options.base_url.trim_end_matches('/');
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(InitError::BaseUrl(options.base_url.clone()));
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| InitError::InvalidCredential("access token"))?;
        authorization.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Session {
            client,
            endpoint: format!("{base_url}/v1/projects/{project}/value:compute"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AggregationService for Session {
    async fn aggregate(&self, request: &AggregationRequest) -> Result<Option<f64>, QueryError> {
        let body = compute_body(request);
        debug!("POST {} {}", self.endpoint, body);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        parse_compute_response(&text, &request.band)
    }
}

fn invoke(function_name: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function_name,
            "arguments": arguments,
        }
    })
}

fn constant(value: impl Into<Value>) -> Value {
    json!({ "constantValue": value.into() })
}

/// The `value:compute` request body for `request`.
pub fn compute_body(request: &AggregationRequest) -> Value {
    let collection = invoke(
        "ImageCollection.load",
        json!({ "id": constant(request.dataset.as_str()) }),
    );
    let date_range = invoke(
        "DateRange",
        json!({
            "start": invoke("Date", json!({ "value": constant(request.start.as_str()) })),
            "end": invoke("Date", json!({ "value": constant(request.end.as_str()) })),
        }),
    );
    let filter = invoke(
        "Filter.dateRangeContains",
        json!({
            "leftValue": date_range,
            "rightField": constant("system:time_start"),
        }),
    );
    let filtered = invoke(
        "Collection.filter",
        json!({ "collection": collection, "filter": filter }),
    );
    let summed = invoke("reduce.sum", json!({ "collection": filtered }));
    let point = invoke(
        "GeometryConstructors.Point",
        json!({ "coordinates": constant(request.point.coordinates().to_vec()) }),
    );
    let reduced = invoke(
        "Image.reduceRegion",
        json!({
            "image": summed,
            "reducer": invoke(request.reducer.function_name(), Value::Object(Map::new())),
            "geometry": point,
            "scale": constant(request.scale),
        }),
    );
    json!({
        "expression": {
            "result": "0",
            "values": { "0": reduced },
        }
    })
}

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: Value,
}

/// Pull `band` out of a `value:compute` response. A null or absent band is `None`.
pub fn parse_compute_response(body: &str, band: &str) -> Result<Option<f64>, QueryError> {
    let response: ComputeResponse =
        serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))?;
    match response.result {
        Value::Null => Ok(None),
        Value::Object(map) => match map.get(band) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                QueryError::Decode(format!("band {band} is not a number: {value}"))
            }),
        },
        other => Err(QueryError::Decode(format!(
            "expected a dictionary result, got {other}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().chars().take(200).collect(),
    }
}

fn status_error(status: StatusCode, body: &str) -> QueryError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QueryError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => QueryError::Quota(message),
        _ => QueryError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

use axum::body::Bytes;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodFilter;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Delete,
}

impl Verb {
    pub fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
        }
    }

    pub fn method(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }

    pub fn carries_body(self) -> bool {
        matches!(self, Verb::Post | Verb::Patch)
    }
}

/// Which inbound headers reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Nothing is forwarded (login, signup).
    None,
    /// `authorization` is forwarded when present.
    Forward,
    /// `authorization` must be present; otherwise 401 without calling out.
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Verbatim,
    /// Success bodies are replaced by one of their fields, `[]` when absent.
    UnwrapField(&'static str),
    /// Any success becomes 204 without reading the body.
    NoContentOnSuccess,
}

#[derive(Debug, Clone, Copy)]
pub struct ProxyRoute {
    pub name: &'static str,
    pub verb: Verb,
    pub path: &'static str,
    pub auth: AuthPolicy,
    pub shape: ResponseShape,
}

impl ProxyRoute {
    pub const fn forwarded(name: &'static str, verb: Verb, path: &'static str) -> Self {
        Self {
            name,
            verb,
            path,
            auth: AuthPolicy::Forward,
            shape: ResponseShape::Verbatim,
        }
    }

    pub const fn public(name: &'static str, verb: Verb, path: &'static str) -> Self {
        Self {
            auth: AuthPolicy::None,
            ..Self::forwarded(name, verb, path)
        }
    }

    pub const fn authenticated(name: &'static str, verb: Verb, path: &'static str) -> Self {
        Self {
            auth: AuthPolicy::Required,
            ..Self::forwarded(name, verb, path)
        }
    }

    pub const fn with_shape(self, shape: ResponseShape) -> Self {
        Self { shape, ..self }
    }
}

#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    origin: String,
}

pub struct UpstreamRequest<'a> {
    pub verb: Verb,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub authorization: Option<&'a str>,
    pub body: Option<&'a Value>,
}

#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Bytes,
}

impl Upstream {
    pub fn new(origin: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("build http client: {}", e)))?;
        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}{}?{}", self.origin, path, query),
            None => format!("{}{}", self.origin, path),
        }
    }

    pub async fn send(&self, request: UpstreamRequest<'_>) -> Result<UpstreamReply, AppError> {
        let url = self.url_for(request.path, request.query);
        let mut builder = self
            .client
            .request(request.verb.method(), &url)
            .header(CONTENT_TYPE.as_str(), "application/json");
        if let Some(token) = request.authorization {
            builder = builder.header(AUTHORIZATION.as_str(), token);
        }
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpstreamResponse(format!("read body: {}", e)))?;

        Ok(UpstreamReply { status, body })
    }
}

#[derive(Debug, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Strips the same-origin `/api` prefix; the backend mirrors the rest 1:1.
pub fn upstream_path(path: &str) -> &str {
    match path.strip_prefix(API_PREFIX) {
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

pub fn interpret(shape: ResponseShape, reply: &UpstreamReply) -> Result<Relayed, AppError> {
    let status = StatusCode::from_u16(reply.status).map_err(|_| {
        AppError::InvalidUpstreamResponse(format!("unknown status {}", reply.status))
    })?;

    if status == StatusCode::NO_CONTENT
        || (status.is_success() && shape == ResponseShape::NoContentOnSuccess)
    {
        return Ok(Relayed {
            status: StatusCode::NO_CONTENT,
            body: None,
        });
    }

    let body: Value = serde_json::from_slice(&reply.body)
        .map_err(|e| AppError::InvalidUpstreamResponse(format!("decode body: {}", e)))?;

    if !status.is_success() {
        return Ok(Relayed {
            status,
            body: Some(body),
        });
    }

    let body = match shape {
        ResponseShape::UnwrapField(field) => body
            .get(field)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        _ => body,
    };

    Ok(Relayed {
        status,
        body: Some(body),
    })
}

pub async fn forward(
    state: &AppState,
    route: &ProxyRoute,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    state.metrics.inc_requests();

    match try_forward(state, route, uri, headers, body).await {
        Ok(relayed) => {
            if !relayed.status.is_success() {
                let upstream_errors = state.metrics.inc_upstream_errors();
                tracing::debug!(
                    target: "proxy",
                    route = route.name,
                    status = relayed.status.as_u16(),
                    upstream_errors,
                    "relaying backend error"
                );
            }
            relayed.into_response()
        }
        Err(err) => {
            let failures = state.metrics.record_failure(&err);
            match &err {
                AppError::Internal(_) => tracing::error!(
                    target: "proxy",
                    route = route.name,
                    failures,
                    error = %err
                ),
                _ => tracing::warn!(
                    target: "proxy",
                    route = route.name,
                    status = err.status().as_u16(),
                    failures,
                    error = %err
                ),
            }
            err.into_response()
        }
    }
}

async fn try_forward(
    state: &AppState,
    route: &ProxyRoute,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Relayed, AppError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty());

    let authorization = match route.auth {
        AuthPolicy::None => None,
        AuthPolicy::Forward => authorization,
        AuthPolicy::Required => Some(authorization.ok_or_else(|| {
            AppError::Unauthorized("Authorization token required".to_string())
        })?),
    };

    let payload = if route.verb.carries_body() {
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| AppError::Internal(format!("parse request body: {}", e)))?;
        Some(value)
    } else {
        None
    };

    let reply = state
        .upstream
        .send(UpstreamRequest {
            verb: route.verb,
            path: upstream_path(uri.path()),
            query: uri.query(),
            authorization,
            body: payload.as_ref(),
        })
        .await?;

    interpret(route.shape, &reply)
}

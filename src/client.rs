use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::session::Session;

/// Error body produced by the backend, or by the gateway's own `{message}` replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default, deserialize_with = "one_or_many")]
    pub message: Vec<String>,
    #[serde(default)]
    pub error: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(message) => vec![message],
        OneOrMany::Many(messages) => messages,
    })
}

impl ApiError {
    fn from_body(status: StatusCode, body: Option<Value>) -> Self {
        let parsed = body.and_then(|body| serde_json::from_value::<ApiError>(body).ok());
        let mut err = parsed.unwrap_or_else(|| ApiError {
            status_code: 0,
            message: Vec::new(),
            error: String::new(),
        });
        if err.status_code == 0 {
            err.status_code = status.as_u16();
        }
        if err.message.is_empty() {
            err.message
                .push(status.canonical_reason().unwrap_or("Request failed").to_string());
        }
        err
    }

    pub fn message_text(&self) -> String {
        self.message.join(", ")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message_text(), self.status_code)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Api(ApiError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        ClientError::Network(value.to_string())
    }
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status_code),
            _ => None,
        }
    }

    /// Text suitable for an inline error banner.
    pub fn message(&self) -> String {
        match self {
            ClientError::Api(err) => err.message_text(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.api_base_url)
    }

    /// A copy of this client that authenticates as `session`.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn builder(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(endpoint))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Sends and returns the JSON body, or `None` for 204 and non-JSON replies.
    async fn send(&self, builder: RequestBuilder) -> Result<Option<Value>, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let bytes = response.bytes().await?;

        let body = if status == StatusCode::NO_CONTENT || !is_json || bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => Some(value),
                Err(err) if status.is_success() => {
                    return Err(ClientError::Decode(err.to_string()));
                }
                Err(_) => None,
            }
        };

        if !status.is_success() {
            return Err(ClientError::Api(ApiError::from_body(status, body)));
        }
        Ok(body)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let body = self
            .send(builder)
            .await?
            .ok_or_else(|| ClientError::Decode("empty response body".to_string()))?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.json(self.builder(Method::GET, endpoint)).await
    }

    pub async fn get_with_query<Q, T>(&self, endpoint: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(self.builder(Method::GET, endpoint).query(query))
            .await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(self.builder(Method::POST, endpoint).json(body))
            .await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(self.builder(Method::PATCH, endpoint).json(body))
            .await
    }

    /// DELETE whose success may or may not carry a body; 204 yields `None`.
    pub async fn delete_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, ClientError> {
        match self.send(self.builder(Method::DELETE, endpoint)).await? {
            Some(body) => serde_json::from_value(body)
                .map(Some)
                .map_err(|e| ClientError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    /// DELETE for endpoints that answer 204.
    pub async fn delete_empty(&self, endpoint: &str) -> Result<(), ClientError> {
        self.send(self.builder(Method::DELETE, endpoint)).await?;
        Ok(())
    }
}

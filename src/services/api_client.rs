use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Shared HTTP plumbing for every resource service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: Arc::new(RwLock::new(config.api_token.clone())),
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid endpoint path {}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<(RequestBuilder, bool)> {
        let url = self.url(path)?;
        debug!(%method, %url, "api request");
        let mut builder = self.client.request(method, url);
        let token = self.current_token();
        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        Ok((builder, token.is_some()))
    }

    async fn send(&self, builder: RequestBuilder, had_token: bool) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);

        if status == StatusCode::UNAUTHORIZED && had_token {
            warn!("Session expired, clearing stored token");
            self.set_token(None);
            return Err(Error::SessionExpired);
        }

        warn!(%status, detail = ?detail, "api request failed");
        Err(error_for_status(status, detail))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        Ok(serde_json::from_slice(body)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let (builder, had_token) = self.request(Method::GET, path)?;
        let response = self.send(builder, had_token).await?;
        Self::decode(response).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let (builder, had_token) = self.request(Method::GET, path)?;
        let response = self.send(builder.query(query), had_token).await?;
        Self::decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, had_token) = self.request(Method::POST, path)?;
        let response = self.send(builder.json(body), had_token).await?;
        Self::decode(response).await
    }

    /// POST without a body, response ignored.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        let (builder, had_token) = self.request(Method::POST, path)?;
        self.send(builder, had_token).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, had_token) = self.request(Method::PUT, path)?;
        let response = self.send(builder.json(body), had_token).await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let (builder, had_token) = self.request(Method::DELETE, path)?;
        self.send(builder, had_token).await?;
        Ok(())
    }
}

fn error_for_status(status: StatusCode, detail: Option<String>) -> Error {
    let message = detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::BadRequest(message),
        _ => Error::Api { status, message },
    }
}

/// Pulls a readable message out of `{"detail": ...}` or `{"error": ...}` bodies.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) else {
        return (trimmed.len() <= 200).then(|| trimmed.to_string());
    };
    match value.get("detail").or_else(|| value.get("error")) {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|f| f.as_str());
                    Some(match field {
                        Some(field) => format!("{}: {}", field, msg),
                        None => msg.to_string(),
                    })
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

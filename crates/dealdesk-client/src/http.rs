//! Authenticated JSON transport over reqwest

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::session::Session;

pub struct HttpClient {
    client: Client,
    session: Session,
}

impl HttpClient {
    pub fn new(session: Session, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dealdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                message: e.to_string(),
            })?;

        Ok(Self { client, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let request = self.request(Method::GET, url);
        Self::send(request).await
    }

    pub async fn put_json<B, T>(&self, url: Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, url).json(body);
        Self::send(request).await
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        let request = self.client.request(method, url);
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status == 401 {
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;

        if !(200..300).contains(&status) {
            return Err(ApiError::Http { status, body });
        }

        parse_body(&body)
    }
}

/// Decode a 2xx body. An empty body decodes as JSON `null`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

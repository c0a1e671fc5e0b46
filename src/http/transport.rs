//! Transport abstraction and its reqwest implementation.
//!
//! The resilience core only knows [`Transport`]: one GET-like method returning
//! an enveloped payload or a [`TransportError`] carrying a status.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::schema::HttpConfig;
use crate::error::TransportError;
use crate::http::request::RequestOptions;

/// Successful transport response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse<T> {
    pub status: u16,
    pub body: T,
}

impl<T> HttpResponse<T> {
    pub fn new(status: u16, body: T) -> Self {
        Self { status, body }
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

/// Issues a single request attempt.
pub trait Transport: Send + Sync {
    fn get<T>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<HttpResponse<T>, TransportError>> + Send
    where
        T: DeserializeOwned + Send + 'static;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn get<T>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<HttpResponse<T>, TransportError>> + Send
    where
        T: DeserializeOwned + Send + 'static,
    {
        async move {
            let url = Url::parse(url)
                .map_err(|e| TransportError::network(format!("invalid URL '{}': {}", url, e)))?;

            let mut request = self.client.get(url);
            for (name, value) in &options.headers {
                request = request.header(name.as_str(), value.as_str());
            }
            if !options.params.is_empty() {
                request = request.query(&options.params);
            }
            if let Some(timeout) = options.timeout {
                request = request.timeout(timeout);
            }

            let response = request.send().await?;
            let status = response.status();

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                tracing::debug!(status = status.as_u16(), "Upstream returned failure status");
                return Err(TransportError::new(status.as_u16(), text));
            }

            let body = response.json::<T>().await.map_err(|e| {
                TransportError::new(status.as_u16(), format!("invalid response body: {}", e))
            })?;

            Ok(HttpResponse::new(status.as_u16(), body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_has_no_status() {
        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        let result = transport
            .get::<serde_json::Value>("not a url", &RequestOptions::default())
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status, crate::error::NO_HTTP_STATUS);
        assert!(err.message.contains("invalid URL"));
    }

    #[test]
    fn test_into_body() {
        let response = HttpResponse::new(200, vec![1, 2, 3]);
        assert_eq!(response.into_body(), vec![1, 2, 3]);
    }
}

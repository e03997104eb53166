// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::TransportError;
use crate::http_client::build_client;
use async_trait::async_trait;
use core::time::Duration;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tracing::error;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

/// Fetch-style HTTP transport. Any response, whatever its status, is `Ok`;
/// errors mean no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }

    /// Builds the client from proxy and timeout settings, falling back to a
    /// plain client when the proxy configuration cannot be used.
    pub fn from_settings(proxy_url: Option<&str>, timeout: Option<Duration>) -> Self {
        let client = build_client(proxy_url, timeout).unwrap_or_else(|e| {
            error!(
                "Unable to parse proxy configuration: {}, no proxy will be used",
                e
            );
            reqwest::Client::new()
        });
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| TransportError::Connectivity(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn request(url: String) -> HttpRequest {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json".parse().unwrap());
        HttpRequest {
            url,
            method: Method::POST,
            headers,
            body: br#"{"batch":[]}"#.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_status_and_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/batch")
            .match_header("Content-Type", "application/json")
            .match_body(r#"{"batch":[]}"#)
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let transport = ReqwestTransport::from_settings(None, None);
        let response = transport
            .fetch(&request(format!("{}/v1/batch", server.url())))
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.body, "OK");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_still_a_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/batch")
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let transport = ReqwestTransport::from_settings(None, None);
        let response = transport
            .fetch(&request(format!("{}/v1/batch", server.url())))
            .await
            .unwrap();

        assert!(!response.is_ok());
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.status_text, "Bad Request");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let transport = ReqwestTransport::from_settings(None, Some(Duration::from_secs(1)));
        let result = transport
            .fetch(&request("http://127.0.0.1:1/v1/batch".to_string()))
            .await;
        assert!(matches!(result, Err(TransportError::Connectivity(_))));
    }
}

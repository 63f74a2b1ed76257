//! Authenticated JSON transport shared by every service.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::ClientError;
use crate::config::ClientConfig;
use crate::objects::ApiResponse;

const USER_AGENT: &str = concat!("transvoucher-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Replaces the configured timeout for this call.
    pub timeout: Option<Duration>,
    /// Extra headers, applied after the defaults.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Sends `Authorization: Bearer <api key>` JSON requests below the base URL
/// and decodes the `{ success, data, message, errors }` envelope.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: Url,
    config: ClientConfig,
}

impl HttpClient {
    /// Validate `config` and build a `reqwest::Client` honouring its timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let base_url = config.resolved_base_url()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Replace the underlying `reqwest::Client`.
    ///
    /// Authentication and JSON headers are still added per request.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` below the base URL, keeping any path prefix such as `/v1`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&url)?)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::GET, path, query, None::<&()>, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::POST, path, &[], Some(body), options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::PUT, path, &[], Some(body), options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::PATCH, path, &[], Some(body), options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::DELETE, path, &[], None::<&()>, options).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        options: Option<&RequestOptions>,
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(method = %method, url = %url, "Sending API request");

        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(options) = options {
            if let Some(timeout) = options.timeout {
                req = req.timeout(timeout);
            }
            for (name, value) in &options.headers {
                req = req.header(name.as_str(), value.as_str());
            }
        }

        let resp = req.send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<ApiResponse<T>, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let err = ClientError::from_response(status, &bytes);
        tracing::debug!(status = %status, code = err.code(), "API request failed");
        return Err(err);
    }
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{API_KEY, mock_http};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_keeps_version_prefix() {
        let http = HttpClient::new(ClientConfig::sandbox(API_KEY)).unwrap();
        assert_eq!(
            http.endpoint("/payments/7").unwrap().as_str(),
            "https://api-sandbox.transvoucher.com/v1/payments/7"
        );
        assert_eq!(
            http.endpoint("currencies").unwrap().as_str(),
            "https://api-sandbox.transvoucher.com/v1/currencies"
        );
    }

    #[tokio::test]
    async fn test_sends_auth_and_json_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", USER_AGENT))
            .and(header("x-request-id", "abc"))
            .and(body_json(json!({ "hello": "world" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": 1 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = mock_http(&server);
        let options = RequestOptions::default().with_header("X-Request-Id", "abc");
        let resp: ApiResponse<u32> = http
            .post("/echo", &json!({ "hello": "world" }), Some(&options))
            .await
            .unwrap();
        assert_eq!(resp.into_data(), Some(1));
    }

    #[tokio::test]
    async fn test_error_status_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/thing"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "message": "Slow down" })),
            )
            .mount(&server)
            .await;

        let err = mock_http(&server)
            .delete::<serde_json::Value>("/thing", None)
            .await
            .unwrap_err();
        let ClientError::Api { status, message, .. } = err else {
            panic!("expected api error");
        };
        assert_eq!(status.as_u16(), 429);
        assert_eq!(message, "Slow down");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let config = ClientConfig::sandbox(API_KEY).with_base_url(Url::parse(&closed).unwrap());
        let http = HttpClient::new(config).unwrap();

        let err = http.get::<u32>("/payments", &[], None).await.unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(err.to_string(), "Network error: No response received");
    }

    #[tokio::test]
    async fn test_invalid_header_is_request_error() {
        let server = MockServer::start().await;
        let options = RequestOptions::default().with_header("bad header", "x");
        let err = mock_http(&server)
            .get::<u32>("/payments", &[], Some(&options))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Request error: "));
    }
}

use std::time::Duration;

use courier_domain::{CourierError, HttpMethod};
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::errors::ApiError;

/// One fully assembled transport call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON body, ignored for methods that do not send one
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// A successful (2xx) response with its body read to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Single-attempt HTTP transport.
///
/// Every call is raced against its timeout and an optional cancellation
/// token; whichever fires first drops the in-flight request. Retrying is
/// the caller's concern.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Config` when the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, CourierError> {
        Self::builder().build()
    }

    /// Perform one transport attempt.
    ///
    /// # Errors
    ///
    /// - `ApiError::Cancelled` when `cancel` fires first
    /// - `ApiError::Timeout` when `request.timeout` elapses first
    /// - `ApiError::Status` for a non-2xx response
    /// - `ApiError::Network` when no response was received
    pub async fn send(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, ApiError> {
        let timeout = request.timeout;
        let exchange = self.exchange(request);

        let cancelled = async {
            match cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => {
                debug!("HTTP request cancelled by caller");
                Err(ApiError::Cancelled)
            }
            outcome = tokio::time::timeout(timeout, exchange) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    debug!(timeout_ms = timeout.as_millis() as u64, "HTTP request timed out");
                    Err(ApiError::Timeout(timeout))
                }
            },
        }
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = to_reqwest_method(request.method);
        let mut builder = self.client.request(method.clone(), &request.url).headers(request.headers);

        if request.method.sends_body() {
            if let Some(body) = request.body.as_ref().filter(|b| !b.is_null()) {
                builder = builder.json(body);
            }
        }

        debug!(%method, url = %request.url, "sending HTTP request");
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%method, url = %request.url, %status, "received HTTP response");

        if status.is_success() {
            Ok(HttpResponse { status: status.as_u16(), body })
        } else {
            Err(ApiError::Status { status: status.as_u16(), body })
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl HttpClientBuilder {
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    ///
    /// Returns `CourierError::Config` when reqwest rejects the settings.
    pub fn build(self) -> Result<HttpClient, CourierError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|e| CourierError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request(method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn returns_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response =
            client.send(request(HttpMethod::Get, format!("{}/ping", server.uri())), None).await;

        assert_eq!(response.unwrap(), HttpResponse { status: 200, body: "pong".to_string() });
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client.send(request(HttpMethod::Get, server.uri()), None).await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sends_json_body_for_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"id": 1})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let mut req = request(HttpMethod::Post, server.uri());
        req.body = Some(json!({"id": 1}));

        assert_eq!(client.send(req, None).await.unwrap().status, 201);
    }

    #[tokio::test]
    async fn times_out_slow_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let mut req = request(HttpMethod::Get, server.uri());
        req.timeout = Duration::from_millis(50);

        let err = client.send(req, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = client.send(request(HttpMethod::Get, server.uri()), Some(&token)).await;

        assert!(matches!(err, Err(ApiError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = HttpClient::new().unwrap();
        let err = client.send(request(HttpMethod::Get, format!("http://{addr}")), None).await;

        assert!(matches!(err, Err(ApiError::Network(_))), "got {err:?}");
    }
}

//! API client for the ASUBEB dashboard REST backend.
//!
//! All endpoints live under `{host}/api/{version}` and answer with a JSON
//! envelope `{ success, message, data, statusCode }`. No retries and no auth
//! header: the PIN gate is local-only.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;
use crate::config::ApiSettings;
use crate::models::DashboardParams;

/// Admin dashboard endpoint, relative to the versioned base URL
const ADMIN_DASHBOARD_PATH: &str = "admin/dashboard";

/// Response envelope used by every backend endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into an application error.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::application(self.message.as_deref()))
        }
    }
}

/// Where the coordinator gets dashboard payloads from. `ApiClient` talks HTTP;
/// tests substitute in-memory doubles.
#[async_trait]
pub trait DashboardTransport: Send + Sync {
    /// Fetch the raw `data` field of the admin dashboard envelope.
    async fn fetch_admin_dashboard(&self, params: &DashboardParams) -> Result<Value, ApiError>;
}

#[async_trait]
impl<T: DashboardTransport + ?Sized> DashboardTransport for Arc<T> {
    async fn fetch_admin_dashboard(&self, params: &DashboardParams) -> Result<Value, ApiError> {
        (**self).fetch_admin_dashboard(params).await
    }
}

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the body, translating non-2xx into `ApiError::Http`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(url = url, error = %e, "Request failed before a response arrived");
            ApiError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(url = url, status = status.as_u16(), "Non-success status");
            return Err(ApiError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(url = url, error = %e, "Failed to parse JSON response");
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let url = self.endpoint(path);
        debug!(method = %method, url = %url, "API request");
        (self.client.request(method, &url), url)
    }

    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let (request, url) = self.request(Method::GET, path);
        self.send(request.query(query), &url).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let (request, url) = self.request(Method::POST, path);
        self.send(request.json(body), &url).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let (request, url) = self.request(Method::PUT, path);
        self.send(request.json(body), &url).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (request, url) = self.request(Method::DELETE, path);
        self.send(request, &url).await
    }

    /// Fetch the admin dashboard, returning the envelope's raw `data` field.
    pub async fn admin_dashboard(&self, params: &DashboardParams) -> Result<Value, ApiError> {
        let envelope: Envelope<Value> = self.get(ADMIN_DASHBOARD_PATH, params).await?;
        Ok(envelope.into_result()?.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl DashboardTransport for ApiClient {
    async fn fetch_admin_dashboard(&self, params: &DashboardParams) -> Result<Value, ApiError> {
        self.admin_dashboard(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request with the given status line and body.
    /// The spawned task yields the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (ApiClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        let settings = ApiSettings::new(format!("http://{}", addr), "v1");
        (ApiClient::new(&settings).unwrap(), server)
    }

    fn client() -> ApiClient {
        let settings = ApiSettings::new("http://localhost:5000/", "v1");
        ApiClient::new(&settings).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let api = client();
        assert_eq!(api.base_url(), "http://localhost:5000/api/v1");
        assert_eq!(
            api.endpoint("/admin/dashboard"),
            "http://localhost:5000/api/v1/admin/dashboard"
        );
    }

    #[test]
    fn test_envelope_success() {
        let envelope: Envelope<Value> = serde_json::from_value(json!({
            "success": true,
            "message": "ok",
            "data": {"schools": []},
            "statusCode": 200
        }))
        .unwrap();
        assert_eq!(envelope.status_code, Some(200));
        assert_eq!(envelope.into_result().unwrap(), Some(json!({"schools": []})));
    }

    #[test]
    fn test_envelope_failure_surfaces_message() {
        let envelope: Envelope<Value> = serde_json::from_value(json!({
            "success": false,
            "message": "Term not found",
            "statusCode": 200
        }))
        .unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Application("Term not found".to_string()))
        );
    }

    #[test]
    fn test_envelope_missing_fields_default_to_failure() {
        let envelope: Envelope<Value> = serde_json::from_value(json!({})).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert_eq!(err.user_message(), "unknown error");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::new(&ApiSettings::new(format!("http://{}", addr), "v1")).unwrap();
        let err = api.admin_dashboard(&DashboardParams::default()).await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
        assert!(err.user_message().starts_with("API not available"));
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let (api, server) = serve_once(
            "400 Bad Request",
            r#"{"success":false,"message":"Invalid term id","statusCode":400}"#,
        )
        .await;
        let params = DashboardParams {
            term_id: Some("t2".to_string()),
            ..Default::default()
        };

        let err = api.admin_dashboard(&params).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 400,
                message: "Invalid term id".to_string()
            }
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/admin/dashboard?termId=t2 HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_error_status_without_message() {
        let (api, server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        let err = api.admin_dashboard(&DashboardParams::default()).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.user_message(), "HTTP error! status: 502");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_application_error() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"success":false,"message":"Term not found","statusCode":200}"#,
        )
        .await;
        let err = api.admin_dashboard(&DashboardParams::default()).await.unwrap_err();
        assert_eq!(err, ApiError::Application("Term not found".to_string()));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_successful_envelope_returns_data() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"success":true,"message":"ok","data":{"schools":[{"id":"1","name":"X"}]},"statusCode":200}"#,
        )
        .await;
        let data = api.admin_dashboard(&DashboardParams::default()).await.unwrap();
        assert_eq!(data, json!({"schools": [{"id": "1", "name": "X"}]}));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/admin/dashboard HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let (api, server) = serve_once("200 OK", "not json").await;
        let err = api
            .fetch_admin_dashboard(&DashboardParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)), "got {:?}", err);
        server.await.unwrap();
    }
}

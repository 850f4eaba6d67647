use anyhow::Result;
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            base_url: base_url.to_string(),
            client,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, path, None, &[]).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub async fn post_with_headers<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body), headers).await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.request(Method::PUT, path, Some(body), &[]).await
    }

    /// POST a raw, possibly malformed, JSON body
    pub async fn post_raw(&self, path: &str, body: &str) -> Result<ApiResponse> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))?;
        let response = self.client.request(request).await?;

        ApiResponse::from_response(response).await
    }

    async fn request<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req_builder = Request::builder().method(method).uri(&url);

        for (name, value) in headers {
            req_builder = req_builder.header(*name, *value);
        }

        let body_bytes = if let Some(body) = body {
            req_builder = req_builder.header("Content-Type", "application/json");
            Full::new(Bytes::from(serde_json::to_vec(body)?))
        } else {
            Full::new(Bytes::new())
        };

        let request = req_builder.body(body_bytes)?;
        let response = self.client.request(request).await?;

        ApiResponse::from_response(response).await
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub body_bytes: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    async fn from_response(response: Response<hyper::body::Incoming>) -> Result<Self> {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body_bytes = response.into_body().collect().await?.to_bytes().to_vec();

        let body = if !body_bytes.is_empty() {
            serde_json::from_slice(&body_bytes).ok()
        } else {
            None
        };

        Ok(Self {
            status,
            body,
            body_bytes,
            headers,
        })
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {} but got {}. Body: {:?}",
            expected, self.status, self.body
        );
        self
    }

    /// Assert the JSON error body carries the expected category
    pub fn assert_error_category(&self, expected: &str) -> &Self {
        let category = self
            .body
            .as_ref()
            .and_then(|b| b.get("category"))
            .and_then(|c| c.as_str())
            .expect("Missing category field in error response");

        assert_eq!(category, expected, "Body: {:?}", self.body);
        self
    }

    #[allow(dead_code)]
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body_bytes)?)
    }

    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn assert_header(&self, name: &str, value: &str) -> &Self {
        let actual = self
            .headers
            .get(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(actual, value, "Header '{}' value mismatch", name);
        self
    }
}

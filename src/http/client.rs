//! JSON request client that attaches identity headers to every call.

use std::sync::Arc;

use log::{debug, error};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{RequestError, RequestOptions};
use crate::config::{ClientConfig, Identity};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Issues requests against the configured base address.
///
/// Holds only immutable configuration and a pooled [`Client`], so clones are
/// cheap and can be shared across any number of call-sites. Every call is a
/// single attempt: no retries, no timeout.
#[derive(Clone)]
pub struct RequestClient {
    client: Client,
    config: Arc<ClientConfig>,
}

impl RequestClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: ClientConfig) -> Result<Self, RequestError> {
        let client = Client::builder()
            .user_agent(concat!("pfmt-client/", env!("PFMT_CLIENT_VERSION")))
            .build()
            .map_err(RequestError::Transport)?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a client wrapping an existing reqwest Client.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn identity(&self) -> &Identity {
        &self.config.identity
    }

    /// Sends `options.method` to `base_url + endpoint` and parses the JSON reply.
    #[tracing::instrument(skip(self, options))]
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, RequestError> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!("{} {}...", options.method, url);

        self.send(&url, options)
            .await
            .inspect_err(|e| error!("API request failed: {}", e))
    }

    /// Like [`request`](Self::request), deserializing into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, RequestError> {
        let value = self.request(endpoint, options).await?;

        serde_json::from_value(value)
            .map_err(RequestError::Parse)
            .inspect_err(|e| error!("API request failed: {}", e))
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value, RequestError> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, data: &B) -> Result<Value, RequestError> {
        let options = Self::with_payload(Method::POST, data)?;
        self.request(endpoint, options).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, data: &B) -> Result<Value, RequestError> {
        let options = Self::with_payload(Method::PUT, data)?;
        self.request(endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, RequestError> {
        self.request(endpoint, RequestOptions::new(Method::DELETE)).await
    }

    fn with_payload<B: Serialize + ?Sized>(method: Method, data: &B) -> Result<RequestOptions, RequestError> {
        RequestOptions::new(method)
            .json(data)
            .inspect_err(|e| error!("API request failed: {}", e))
    }

    /// Identity defaults and JSON content type, then caller overrides.
    pub(crate) fn build_headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, RequestError> {
        let identity = &self.config.identity;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let defaults = [
            (USER_ID_HEADER, identity.user_id.as_str()),
            (USER_NAME_HEADER, identity.user_name.as_str()),
            (USER_ROLE_HEADER, identity.user_role.as_str()),
        ];
        for (name, value) in defaults {
            headers.insert(HeaderName::from_static(name), header_value(name, value)?);
        }

        for (name, value) in overrides {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| RequestError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value(name, value)?);
        }

        Ok(headers)
    }

    async fn send(&self, url: &str, options: RequestOptions) -> Result<Value, RequestError> {
        let headers = self.build_headers(&options.headers)?;

        let carries_body = options.method == Method::POST || options.method == Method::PUT;
        let mut builder = self.client.request(options.method, url).headers(headers);
        match options.body {
            Some(body) if carries_body => builder = builder.body(body),
            Some(_) => debug!("Dropping request body: only POST and PUT send one"),
            None => {}
        }

        let response = builder.send().await.map_err(RequestError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(RequestError::Transport)?;
        serde_json::from_slice(&body).map_err(RequestError::Parse)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, RequestError> {
    HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(url: &str) -> RequestClient {
        RequestClient::with_client(Client::new(), ClientConfig::new(url))
    }

    #[test]
    fn test_build_headers_defaults() {
        let client = client_for("http://localhost:3004");
        let headers = client.build_headers(&[]).unwrap();

        assert_eq!(headers.len(), 4);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[USER_ID_HEADER], "550e8400-e29b-41d4-a716-446655440002");
        assert_eq!(headers[USER_NAME_HEADER], "Development User");
        assert_eq!(headers[USER_ROLE_HEADER], "Project Manager");
    }

    #[test]
    fn test_build_headers_override_is_case_insensitive() {
        let client = client_for("http://localhost:3004");
        let overrides = vec![("X-User-Role".to_string(), "Director".to_string())];
        let headers = client.build_headers(&overrides).unwrap();

        assert_eq!(headers.len(), 4);
        assert_eq!(headers[USER_ROLE_HEADER], "Director");
        assert_eq!(headers[USER_NAME_HEADER], "Development User");
    }

    #[test]
    fn test_build_headers_rejects_bad_name() {
        let client = client_for("http://localhost:3004");
        let overrides = vec![("bad header".to_string(), "x".to_string())];
        let result = client.build_headers(&overrides);

        assert!(matches!(result, Err(RequestError::InvalidHeader { name, .. }) if name == "bad header"));
    }

    #[tokio::test]
    async fn test_get_sends_identity_headers() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/api/test")
            .match_header("content-type", "application/json")
            .match_header("x-user-id", "550e8400-e29b-41d4-a716-446655440002")
            .match_header("x-user-name", "Development User")
            .match_header("x-user-role", "Project Manager")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "API test successful"}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        let result = client.get("/api/test").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"message": "API test successful"}));
    }

    #[tokio::test]
    async fn test_request_header_override() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/api/projects")
            .match_header("x-user-role", "Director")
            .match_header("x-user-id", "550e8400-e29b-41d4-a716-446655440002")
            .match_header("x-user-name", "Development User")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&url);
        let options = RequestOptions::new(Method::GET).header("x-user-role", "Director");
        let result = client.request("/api/projects", options).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn test_body_only_sent_for_post_and_put() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let get = server
            .mock("GET", "/api/projects")
            .match_body("")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/projects/7")
            .match_body("")
            .with_status(200)
            .with_body(r#"{"deleted": true}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        client
            .request("/api/projects", RequestOptions::new(Method::GET).body(r#"{"stray":1}"#))
            .await
            .unwrap();
        client
            .request("/api/projects/7", RequestOptions::new(Method::DELETE).body(r#"{"stray":1}"#))
            .await
            .unwrap();

        get.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_maps_to_status_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/api/missing")
            .with_status(404)
            .with_body(r#"{"error": "not here"}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        let err = client.get("/api/missing").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.to_string(), "HTTP error! status: 404");
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/api/broken")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = client_for(&url);
        let err = client.get("/api/broken").await.unwrap_err();

        assert!(matches!(err, RequestError::Parse(_)));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("DELETE", "/api/projects/7")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&url);
        let err = client.delete("/api/projects/7").await.unwrap_err();

        assert!(matches!(err, RequestError::Parse(_)));
    }

    #[tokio::test]
    async fn test_post_serializes_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/api/projects")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"name": "Bridge rehab", "budget": 1200000})))
            .with_status(201)
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        let result = client
            .post("/api/projects", &json!({"name": "Bridge rehab", "budget": 1200000}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result["id"], 7);
    }

    #[tokio::test]
    async fn test_put_serializes_struct() {
        #[derive(Serialize)]
        struct StatusUpdate<'a> {
            status: &'a str,
        }

        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("PUT", "/api/projects/7")
            .match_body(Matcher::Json(json!({"status": "approved"})))
            .with_status(200)
            .with_body(r#"{"id": 7, "status": "approved"}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        let result = client
            .put("/api/projects/7", &StatusUpdate { status: "approved" })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result["status"], "approved");
    }

    #[tokio::test]
    async fn test_request_as_typed() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Project {
            id: u32,
            name: String,
        }

        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/api/projects/7")
            .with_status(200)
            .with_body(r#"{"id": 7, "name": "Bridge rehab"}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        let project: Project = client
            .request_as("/api/projects/7", RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(
            project,
            Project {
                id: 7,
                name: "Bridge rehab".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_request_as_shape_mismatch_is_parse_error() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Project {
            id: u32,
        }

        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/api/projects/7")
            .with_status(200)
            .with_body(r#"{"id": "seven"}"#)
            .create_async()
            .await;

        let client = client_for(&url);
        let result = client
            .request_as::<Project>("/api/projects/7", RequestOptions::default())
            .await;

        assert!(matches!(result, Err(RequestError::Parse(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.get("/api/test").await.unwrap_err();

        assert!(matches!(err, RequestError::Transport(_)));
    }

    #[tokio::test]
    async fn test_single_attempt_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/api/flaky")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&url);
        let err = client.get("/api/flaky").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_accessors() {
        let client = client_for("http://localhost:3004");
        assert_eq!(client.base_url(), "http://localhost:3004");
        assert_eq!(client.identity().user_role, "Project Manager");
    }

    #[test]
    fn test_new_builds_client() {
        let client = RequestClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3004");
    }
}

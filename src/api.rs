//! Client side of the single action/payload endpoint the school store
//! exposes. Every remote operation goes through [`ApiClient::call`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::models::Record;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// An action name with its payload, ready to be sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub action: String,
    pub payload: Value,
}

impl ApiRequest {
    pub fn new(action: impl Into<String>, payload: Value) -> Self {
        Self {
            action: action.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set when the request never produced a readable reply.
    #[serde(skip)]
    pub transport_failure: bool,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            transport_failure: true,
            ..Self::rejected(message)
        }
    }

    pub fn error_message(&self) -> String {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ if self.transport_failure => "Failed to connect to the backend.".to_string(),
            _ => "The request was rejected.".to_string(),
        }
    }

    pub fn into_result(self) -> Result<Option<Value>, ApiError> {
        if self.success {
            Ok(self.data)
        } else if self.transport_failure {
            Err(ApiError::Transport(self.error_message()))
        } else {
            Err(ApiError::Rejected(self.error_message()))
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let data = self.into_result()?.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `data` as a list of rows; a missing list reads as empty.
    pub fn records(self) -> Result<Vec<Record>, ApiError> {
        match self.into_result()? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    action: &'a str,
    payload: &'a Value,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One POST, one attempt. Transport problems come back as an
    /// unsuccessful response instead of an error.
    pub async fn call(&self, action: &str, payload: Option<Value>) -> ApiResponse {
        let payload = payload.unwrap_or_else(|| json!({}));
        debug!(action, "calling backend");

        let response = match self
            .http
            .post(&self.endpoint)
            .json(&Envelope {
                action,
                payload: &payload,
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(action, error = %err, "backend unreachable");
                return ApiResponse::transport(format!("Failed to connect to the backend: {err}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(action, %status, "backend returned an error status");
            return ApiResponse::transport(format!("Backend responded with status {status}"));
        }

        match response.json::<ApiResponse>().await {
            Ok(reply) => {
                if !reply.success {
                    debug!(action, message = ?reply.message, "backend rejected request");
                }
                reply
            }
            Err(err) => {
                warn!(action, error = %err, "unreadable backend response");
                ApiResponse::transport(format!("Unreadable response from the backend: {err}"))
            }
        }
    }

    pub async fn send(&self, request: ApiRequest) -> ApiResponse {
        self.call(&request.action, Some(request.payload)).await
    }

    /// Issues every request concurrently and waits for all of them to
    /// settle. Results keep the caller's tag; completion order is arbitrary.
    pub async fn send_all<K>(&self, requests: Vec<(K, ApiRequest)>) -> Vec<(K, ApiResponse)>
    where
        K: Send + 'static,
    {
        let mut set = JoinSet::new();
        for (tag, request) in requests {
            let client = self.clone();
            set.spawn(async move {
                let response = client.send(request).await;
                (tag, response)
            });
        }

        let mut results = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(pair) => results.push(pair),
                Err(err) => warn!(error = %err, "backend call task failed"),
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/exec")
    }

    async fn echo(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({ "success": true, "data": body }))
    }

    #[tokio::test]
    async fn call_posts_action_envelope() {
        let url = spawn_server(Router::new().route("/exec", post(echo))).await;
        let client = ApiClient::new(url);

        let reply = client
            .call("getStudents", Some(json!({ "class_id": "C1" })))
            .await;

        assert!(reply.success);
        assert_eq!(
            reply.data,
            Some(json!({ "action": "getStudents", "payload": { "class_id": "C1" } }))
        );
    }

    #[tokio::test]
    async fn missing_payload_is_sent_as_empty_object() {
        let url = spawn_server(Router::new().route("/exec", post(echo))).await;
        let reply = ApiClient::new(url).call("getCourses", None).await;
        assert_eq!(reply.data, Some(json!({ "action": "getCourses", "payload": {} })));
    }

    #[tokio::test]
    async fn application_rejection_passes_through() {
        let app = Router::new().route(
            "/exec",
            post(|| async { Json(json!({ "success": false, "message": "Invalid credentials" })) }),
        );
        let url = spawn_server(app).await;

        let reply = ApiClient::new(url).call("login", None).await;
        assert!(!reply.success);
        assert!(!reply.transport_failure);
        assert_eq!(reply.error_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn error_status_is_normalized() {
        let app = Router::new().route("/exec", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let url = spawn_server(app).await;

        let reply = ApiClient::new(url).call("getTeachers", None).await;
        assert!(!reply.success);
        assert!(reply.transport_failure);
        assert!(reply.error_message().contains("500"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_normalized() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let reply = ApiClient::new(format!("http://{addr}/exec"))
            .call("getTeachers", None)
            .await;
        assert!(!reply.success);
        assert!(matches!(reply.into_result(), Err(ApiError::Transport(_))));
    }

    #[tokio::test]
    async fn send_all_keeps_every_result() {
        let url = spawn_server(Router::new().route("/exec", post(echo))).await;
        let client = ApiClient::new(url);

        let mut results = client
            .send_all(vec![
                (1, ApiRequest::new("getStudents", json!({}))),
                (2, ApiRequest::new("getTeachers", json!({}))),
                (3, ApiRequest::new("getCourses", json!({}))),
            ])
            .await;
        results.sort_by_key(|(tag, _)| *tag);

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].1.data.as_ref().unwrap()["action"], "getTeachers");
    }

    /// Echoes every action except `getTeachers`, which fails with a 500.
    async fn echo_or_fail(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
        if body["action"] == "getTeachers" {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(Json(json!({ "success": true, "data": body })))
    }

    #[tokio::test]
    async fn one_failed_call_does_not_cancel_its_siblings() {
        let url = spawn_server(Router::new().route("/exec", post(echo_or_fail))).await;
        let client = ApiClient::new(url);

        let mut results = client
            .send_all(vec![
                ("students", ApiRequest::new("getStudents", json!({}))),
                ("teachers", ApiRequest::new("getTeachers", json!({}))),
                ("courses", ApiRequest::new("getCourses", json!({}))),
            ])
            .await;
        results.sort_by_key(|(tag, _)| *tag);

        let tags: Vec<_> = results.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, ["courses", "students", "teachers"]);

        let (_, courses) = &results[0];
        assert!(courses.success);
        assert_eq!(courses.data.as_ref().unwrap()["action"], "getCourses");

        let (_, students) = &results[1];
        assert!(students.success);
        assert_eq!(students.data.as_ref().unwrap()["action"], "getStudents");

        let (_, teachers) = &results[2];
        assert!(!teachers.success);
        assert!(teachers.transport_failure);
        assert!(teachers.error_message().contains("500"));
    }

    #[test]
    fn records_decodes_rows_and_tolerates_missing_data() {
        let rows = ApiResponse::ok(json!([{ "student_id": "S1" }, { "student_id": 2 }]))
            .records()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text("student_id"), "2");

        let empty = ApiResponse { success: true, ..Default::default() }.records().unwrap();
        assert!(empty.is_empty());

        let bad = ApiResponse::ok(json!("nope")).records();
        assert!(matches!(bad, Err(ApiError::Decode(_))));
    }

    #[test]
    fn rejection_without_message_gets_generic_text() {
        let err = ApiResponse::default().into_result().unwrap_err();
        assert_eq!(err, ApiError::Rejected("The request was rejected.".to_string()));
    }
}

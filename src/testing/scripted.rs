//! Scripted in-memory transport for unit tests

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{ApiRequest, ApiResponse, Method, Transport};
use crate::common::{Error, Result};

/// Canned reply for a route
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, &'static str),
    Bytes(u16, &'static str, Vec<u8>),
    Refused,
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

/// Answers requests from per-route reply queues
///
/// A route matches when the request URL ends with its path. Replies are
/// consumed in order; the last one repeats. Unmatched requests get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<(Method, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, reply: Reply) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            match routes
                .iter_mut()
                .find(|r| r.method == method && r.path == path)
            {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(Route {
                    method,
                    path: path.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    /// A platform where every scenario succeeds; training completes on the
    /// second progress check
    pub fn healthy() -> Self {
        Self::healthy_with_progress(vec![
            Reply::Json(200, json!({"status": "running", "progress": 50})),
            Reply::Json(200, json!({"status": "completed", "progress": 100})),
        ])
    }

    /// Like [`ScriptedTransport::healthy`], with a custom progress sequence
    pub fn healthy_with_progress(progress: Vec<Reply>) -> Self {
        let transport = Self::new()
            .on(Method::Get, "/api/", Reply::Json(200, json!({"message": "ML Platform API"})))
            .on(
                Method::Get,
                "/api/models/list",
                Reply::Json(200, json!({"supervised": {}, "unsupervised": {}})),
            )
            .on(
                Method::Get,
                "/api/models/parameters/supervised/Logistic Regression?model_category=classification",
                Reply::Json(200, json!({"C": {"type": "float"}})),
            )
            .on(
                Method::Get,
                "/api/models/parameters/unsupervised/K-Means",
                Reply::Json(200, json!({"n_clusters": {"type": "int"}})),
            )
            .on(
                Method::Post,
                "/api/dataset/upload",
                Reply::Json(200, json!({"dataset_id": "ds-1"})),
            )
            .on(
                Method::Get,
                "/api/dataset/ds-1/columns",
                Reply::Json(200, json!({"columns": ["sepal_length", "species"]})),
            )
            .on(
                Method::Post,
                "/api/dataset/clean",
                Reply::Json(200, json!({"status": "cleaned"})),
            )
            .on(
                Method::Post,
                "/api/model/train",
                Reply::Json(200, json!({"job_id": "job-1"})),
            )
            .on(
                Method::Get,
                "/api/model/download/job-1",
                Reply::Bytes(200, "application/octet-stream", b"model-bytes".to_vec()),
            );

        progress.into_iter().fold(transport, |t, reply| {
            t.on(Method::Get, "/api/model/progress/job-1", reply)
        })
    }

    /// Every route the scenarios reach, all answering `reply`
    pub fn uniform(reply: Reply) -> Self {
        [
            (Method::Get, "/api/"),
            (Method::Get, "/api/models/list"),
            (Method::Get, "?model_category=classification"),
            (Method::Get, "/api/models/parameters/unsupervised/K-Means"),
            (Method::Post, "/api/dataset/upload"),
            (Method::Get, "/columns"),
            (Method::Post, "/api/dataset/clean"),
            (Method::Post, "/api/model/train"),
            (Method::Get, "/api/model/progress/job-1"),
            (Method::Get, "/api/model/download/job-1"),
        ]
        .into_iter()
        .fold(Self::new(), |t, (method, path)| t.on(method, path, reply.clone()))
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((request.method, request.url.clone()));

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.method == request.method && request.url.ends_with(&r.path))
                .and_then(|route| {
                    if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    }
                })
        };

        match reply.unwrap_or(Reply::Json(404, json!({"detail": "Not Found"}))) {
            Reply::Json(status, value) => Ok(ApiResponse {
                status,
                content_type: Some("application/json".to_string()),
                body: serde_json::to_vec(&value)?,
            }),
            Reply::Text(status, text) => Ok(ApiResponse {
                status,
                content_type: Some("text/plain".to_string()),
                body: text.as_bytes().to_vec(),
            }),
            Reply::Bytes(status, content_type, body) => Ok(ApiResponse {
                status,
                content_type: Some(content_type.to_string()),
                body,
            }),
            Reply::Refused => Err(Error::transport(
                &request.url,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }
}

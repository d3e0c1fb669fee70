// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

#[derive(Clone)]
enum MockResponse {
    Fixed(u16, String),
    /// Respond with the request body, as the API server does for a create
    Echo(u16),
}

/// A mock HTTP service that returns predefined responses by method and path,
/// and records every request it receives.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), MockResponse>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer GET requests to `path` with a fixed status and body
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.insert("GET", path, MockResponse::Fixed(status, body.to_string()));
        self
    }

    /// Serve the discovery documents for the core group and `apps/v1`
    pub fn with_discovery(self) -> Self {
        self.on_get("/api", 200, &api_versions_json(&["v1"]))
            .on_get(
                "/api/v1",
                200,
                &api_resource_list_json(
                    "v1",
                    &[
                        ("namespaces", "Namespace", false),
                        ("serviceaccounts", "ServiceAccount", true),
                        ("configmaps", "ConfigMap", true),
                    ],
                ),
            )
            .on_get("/apis", 200, &api_group_list_json(&[("apps", "v1")]))
            .on_get(
                "/apis/apps/v1",
                200,
                &api_resource_list_json("apps/v1", &[("deployments", "Deployment", true)]),
            )
    }

    /// Answer POST requests to `path` with a fixed status and body
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.insert("POST", path, MockResponse::Fixed(status, body.to_string()));
        self
    }

    /// Answer POST requests to `path` with 201 and the posted object
    pub fn on_create(self, path: &str) -> Self {
        self.insert("POST", path, MockResponse::Echo(201));
        self
    }

    /// Requests received so far as (method, path)
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Paths of the POST requests received so far
    pub fn posted(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|(method, _)| method == "POST")
            .map(|(_, path)| path)
            .collect()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "velero")
    }

    fn insert(&self, method: &str, path: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), response);
    }

    fn find_response(&self, method: &str, path: &str) -> Option<MockResponse> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, path));

        Box::pin(async move {
            let (status, body) = match response {
                Some(MockResponse::Fixed(status, body)) => (status, Bytes::from(body)),
                Some(MockResponse::Echo(status)) => {
                    (status, req.into_body().collect().await?.to_bytes())
                }
                None => (404, Bytes::from(not_found_json("resource", "unknown"))),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.to_vec()))
                .unwrap())
        })
    }
}

/// Create a Status failure response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response body
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create an APIVersions body, as served on `/api`
pub fn api_versions_json(versions: &[&str]) -> String {
    serde_json::json!({
        "kind": "APIVersions",
        "versions": versions,
        "serverAddressByClientCIDRs": [
            { "clientCIDR": "0.0.0.0/0", "serverAddress": "10.0.0.1:6443" }
        ]
    })
    .to_string()
}

/// Create an APIGroupList body from (group, preferred version) pairs
pub fn api_group_list_json(groups: &[(&str, &str)]) -> String {
    let groups: Vec<_> = groups
        .iter()
        .map(|(name, version)| {
            let group_version = serde_json::json!({
                "groupVersion": format!("{}/{}", name, version),
                "version": version
            });
            serde_json::json!({
                "name": name,
                "versions": [group_version.clone()],
                "preferredVersion": group_version
            })
        })
        .collect();

    serde_json::json!({
        "kind": "APIGroupList",
        "apiVersion": "v1",
        "groups": groups
    })
    .to_string()
}

/// Create an APIResourceList body from (plural, kind, namespaced) triples
pub fn api_resource_list_json(group_version: &str, resources: &[(&str, &str, bool)]) -> String {
    let resources: Vec<_> = resources
        .iter()
        .map(|(plural, kind, namespaced)| {
            serde_json::json!({
                "name": plural,
                "singularName": kind.to_lowercase(),
                "namespaced": namespaced,
                "kind": kind,
                "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]
            })
        })
        .collect();

    serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources
    })
    .to_string()
}

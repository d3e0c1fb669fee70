// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Connection config resolution and client handles

use crate::constants::api;
use crate::error::{Result, VeleroError};
use http::header::{HeaderValue, USER_AGENT};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{ApiResource, DynamicObject, GroupVersionKind},
    client::ClientBuilder,
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Config as KConfig, Resource,
};
use std::path::Path;
use std::time::Duration;
use tower::limit::RateLimitLayer;
use tracing::{debug, instrument};

/// Resolved connection parameters for constructing clients.
///
/// Rate limiting is not part of `kube::Config`, so QPS and burst travel
/// alongside it and are applied as a tower layer when a client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub config: KConfig,
    pub user_agent: String,
    pub qps: f32,
    pub burst: u32,
}

impl ClientConfig {
    /// Build a kube client from this config
    pub fn build_client(self) -> std::result::Result<Client, kube::Error> {
        let limit = rate_limit(self.qps, self.burst);
        let builder = ClientBuilder::try_from(self.config)?;

        Ok(match limit {
            Some((num, per)) => {
                debug!("Client rate limited to {} requests per {:?}", num, per);
                builder.with_layer(&RateLimitLayer::new(num, per)).build()
            }
            None => builder.build(),
        })
    }
}

/// Resolve the connection config.
///
/// An explicit kubeconfig path is read directly. Otherwise the default
/// kubeconfig locations are used when a context is requested, falling back to
/// inference (KUBECONFIG, ~/.kube/config, in-cluster) when it is not.
#[instrument]
pub async fn client_config(
    kubeconfig: Option<&Path>,
    context: Option<&str>,
    base_name: &str,
    qps: f32,
    burst: u32,
) -> Result<ClientConfig> {
    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };

    let mut config = match kubeconfig {
        Some(path) => {
            let parsed = Kubeconfig::read_from(path).map_err(|e| {
                VeleroError::ConfigError(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            KConfig::from_custom_kubeconfig(parsed, &options)
                .await
                .map_err(|e| VeleroError::ConfigError(format!("Failed to load kubeconfig: {}", e)))?
        }
        None if context.is_some() => KConfig::from_kubeconfig(&options)
            .await
            .map_err(|e| VeleroError::ConfigError(format!("Failed to load kubeconfig: {}", e)))?,
        None => KConfig::infer()
            .await
            .map_err(|e| VeleroError::ConfigError(format!("Failed to infer config: {}", e)))?,
    };

    let user_agent = user_agent(base_name);
    let header = HeaderValue::from_str(&user_agent)
        .map_err(|e| VeleroError::ConfigError(format!("Invalid user agent {}: {}", user_agent, e)))?;
    config.headers.push((USER_AGENT, header));

    debug!("Resolved cluster {} for {}", config.cluster_url, user_agent);

    Ok(ClientConfig {
        config,
        user_agent,
        qps,
        burst,
    })
}

/// User agent string identifying the calling command
pub fn user_agent(base_name: &str) -> String {
    format!(
        "{}/{} ({}/{})",
        base_name,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Translate QPS/burst into a tower rate: `burst` requests per `burst / qps` seconds.
/// A non-positive QPS disables rate limiting.
pub fn rate_limit(qps: f32, burst: u32) -> Option<(u64, Duration)> {
    if qps.is_nan() || qps <= 0.0 {
        return None;
    }
    let num = burst.max(1);
    Some((num as u64, Duration::from_secs_f64(num as f64 / qps as f64)))
}

/// Client for Velero custom resources, scoped to the Velero namespace
#[derive(Clone)]
pub struct VeleroClient {
    client: Client,
    namespace: String,
}

impl VeleroClient {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Typed API for a namespaced resource in the Velero namespace
    pub fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// Untyped API for a `velero.io/v1` kind in the Velero namespace
    pub fn resource(&self, kind: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(api::GROUP, api::VERSION, kind);
        Api::namespaced_with(
            self.client.clone(),
            &self.namespace,
            &ApiResource::from_gvk(&gvk),
        )
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Client for arbitrary, not statically typed resources
#[derive(Clone)]
pub struct DynamicClient {
    client: Client,
}

impl DynamicClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// API for a resource type, namespaced when a namespace is given
    pub fn resource(&self, resource: &ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, resource),
            None => Api::all_with(self.client.clone(), resource),
        }
    }

    /// API for a namespaced resource type in the client's default namespace
    pub fn default_namespaced(&self, resource: &ApiResource) -> Api<DynamicObject> {
        Api::default_namespaced_with(self.client.clone(), resource)
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

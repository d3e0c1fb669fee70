// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capability set of clients a command can ask for

use crate::error::Result;
use crate::kubernetes::client::{ClientConfig, DynamicClient, VeleroClient};
use async_trait::async_trait;
use kube::Client;

/// Provides the clients commands talk to the cluster with.
///
/// Every accessor resolves the connection config anew, so changes made to
/// the provider between calls apply to the next client it hands out.
#[async_trait]
pub trait ClusterClientProvider: Send + Sync {
    /// Resolve the connection config used by the client accessors
    async fn client_config(&self) -> Result<ClientConfig>;

    /// Client for Velero custom resources
    async fn velero_client(&self) -> Result<VeleroClient>;

    /// Client for the core Kubernetes API
    async fn kube_client(&self) -> Result<Client>;

    /// Client for arbitrary resources
    async fn dynamic_client(&self) -> Result<DynamicClient>;

    /// Namespace the clients operate in
    fn namespace(&self) -> &str;
}

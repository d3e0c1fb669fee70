// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Creates a list of resources on the cluster through the dynamic client.

use crate::error::{Result, VeleroError};
use crate::kubernetes::DynamicClient;
use async_trait::async_trait;
use kube::{
    api::{ApiResource, DynamicObject, GroupVersionKind, PostParams},
    discovery::{Discovery, Scope},
    Client, ResourceExt,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// API coordinates of a resource and whether it lives in a namespace
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub api_resource: ApiResource,
    pub namespaced: bool,
}

/// Maps a resource's group/version/kind to the API resource to create it through
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, gvk: &GroupVersionKind, object: &DynamicObject)
        -> Result<ResolvedResource>;
}

/// Built-in kinds that are not namespaced
const CLUSTER_SCOPED_KINDS: &[&str] = &[
    "APIService",
    "ClusterRole",
    "ClusterRoleBinding",
    "CustomResourceDefinition",
    "IngressClass",
    "MutatingWebhookConfiguration",
    "Namespace",
    "Node",
    "PersistentVolume",
    "PriorityClass",
    "StorageClass",
    "ValidatingWebhookConfiguration",
    "VolumeSnapshotClass",
    "VolumeSnapshotContent",
];

/// Resolves without talking to the cluster: the resource name is the
/// lowercased plural of the kind, and every kind outside a fixed list of
/// cluster-scoped kinds is treated as namespaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticResolver;

#[async_trait]
impl ResourceResolver for StaticResolver {
    async fn resolve(
        &self,
        gvk: &GroupVersionKind,
        _object: &DynamicObject,
    ) -> Result<ResolvedResource> {
        Ok(ResolvedResource {
            api_resource: ApiResource::from_gvk(gvk),
            namespaced: !CLUSTER_SCOPED_KINDS.contains(&gvk.kind.as_str()),
        })
    }
}

/// Resolves through API discovery, so plurals and scope come from the server
pub struct DiscoveryResolver {
    discovery: Discovery,
}

impl DiscoveryResolver {
    /// Run discovery for the API groups used by `resources`.
    ///
    /// Every resource needs a valid apiVersion and kind here, so one bad
    /// resource fails the install before anything is created.
    #[instrument(skip(client, resources), fields(resources = resources.len()))]
    pub async fn new(client: Client, resources: &[DynamicObject]) -> Result<Self> {
        let mut groups = BTreeSet::new();
        for resource in resources {
            groups.insert(resource_gvk(resource)?.group);
        }
        let groups: Vec<&str> = groups.iter().map(String::as_str).collect();
        debug!("Discovering API groups {:?}", groups);

        let discovery = Discovery::new(client).filter(&groups).run().await?;
        Ok(Self { discovery })
    }
}

#[async_trait]
impl ResourceResolver for DiscoveryResolver {
    async fn resolve(
        &self,
        gvk: &GroupVersionKind,
        _object: &DynamicObject,
    ) -> Result<ResolvedResource> {
        let (api_resource, capabilities) = self.discovery.resolve_gvk(gvk).ok_or_else(|| {
            VeleroError::ResourceResolution(format!(
                "{}/{} {} is not served by the cluster",
                gvk.group, gvk.version, gvk.kind
            ))
        })?;

        Ok(ResolvedResource {
            api_resource,
            namespaced: matches!(capabilities.scope, Scope::Namespaced),
        })
    }
}

/// Group/version/kind of a resource, from its apiVersion and kind
pub fn resource_gvk(resource: &DynamicObject) -> Result<GroupVersionKind> {
    let types = resource.types.as_ref().ok_or_else(|| {
        VeleroError::InvalidResource(format!(
            "{} has no apiVersion/kind",
            resource.name_any()
        ))
    })?;

    if types.kind.is_empty() || types.api_version.is_empty() {
        return Err(VeleroError::InvalidResource(format!(
            "{} has an empty apiVersion or kind",
            resource.name_any()
        )));
    }

    let (group, version) = match types.api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", types.api_version.as_str()),
    };

    Ok(GroupVersionKind::gvk(group, version, &types.kind))
}

/// Create each resource in order, stopping at the first failure.
///
/// Resources created before a failure are left in place.
pub async fn install(
    client: &DynamicClient,
    resolver: &dyn ResourceResolver,
    resources: &[DynamicObject],
) -> Result<()> {
    for resource in resources {
        let gvk = resource_gvk(resource)?;
        let name = resource.name_any();
        if name.is_empty() {
            return Err(VeleroError::InvalidResource(format!(
                "{} has no name",
                gvk.kind
            )));
        }

        info!(resource = %format!("{}/{}", gvk.kind, name), "Creating resource");

        let target = resolver.resolve(&gvk, resource).await?;
        let api = match (target.namespaced, resource.namespace()) {
            (true, Some(ns)) => client.resource(&target.api_resource, Some(ns.as_str())),
            (true, None) => client.default_namespaced(&target.api_resource),
            (false, _) => client.resource(&target.api_resource, None),
        };

        api.create(&PostParams::default(), resource)
            .await
            .map_err(|source| VeleroError::ResourceCreation {
                kind: gvk.kind.clone(),
                name: name.clone(),
                source,
            })?;
    }

    Ok(())
}

/// Parse a multi-document YAML manifest into resources, in document order
pub fn load_resources(manifest: &str) -> Result<Vec<DynamicObject>> {
    let mut resources = Vec::new();

    for document in serde_yaml::Deserializer::from_str(manifest) {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| VeleroError::InvalidResource(format!("Failed to parse manifest: {}", e)))?;
        if value.is_null() {
            continue;
        }

        let resource: DynamicObject = serde_yaml::from_value(value)
            .map_err(|e| VeleroError::InvalidResource(format!("Failed to parse resource: {}", e)))?;
        resources.push(resource);
    }

    Ok(resources)
}

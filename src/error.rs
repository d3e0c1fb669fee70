// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeleroError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to resolve client configuration: {0}")]
    ConfigError(String),

    #[error("Failed to construct {client} client: {source}")]
    ClientConstructionError {
        client: &'static str,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to access config file {}: {source}", .path.display())]
    ConfigFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Home directory not found")]
    ConfigDirNotFound,

    #[error("Error creating resource {kind}/{name}: {source}")]
    ResourceCreation {
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Failed to resolve resource: {0}")]
    ResourceResolution(String),
}

pub type Result<T> = std::result::Result<T, VeleroError>;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client factory: resolves connection settings from flags, environment and
//! the user config file, and builds clients from them.

use crate::config::{Environment, ProcessEnv, VeleroConfig};
use crate::constants::{env, DEFAULT_NAMESPACE};
use crate::error::{Result, VeleroError};
use crate::features::FeatureFlagSet;
use crate::kubernetes::client::{client_config, ClientConfig, DynamicClient, VeleroClient};
use crate::kubernetes::provider::ClusterClientProvider;
use async_trait::async_trait;
use clap::{Args, Command};
use kube::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Flags shared by every command that talks to the cluster
#[derive(Args, Debug, Clone, Default)]
pub struct FactoryArgs {
    /// Path to the kubeconfig file to use to talk to the Kubernetes apiserver. If unset, try the
    /// environment variable KUBECONFIG, as well as in-cluster configuration
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// The namespace in which Velero should operate
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// The context to use to talk to the Kubernetes apiserver. If unset defaults to whatever
    /// your current-context is (kubectl config current-context)
    #[arg(long, global = true)]
    pub kubecontext: Option<String>,

    /// Comma-separated list of features to enable for this Velero process. Combines with values
    /// from $HOME/.config/velero/config.json if present
    #[arg(long, value_delimiter = ',', global = true)]
    pub features: Vec<String>,
}

/// Builds Velero and Kubernetes clients.
///
/// Namespace precedence is `--namespace` flag, then `VELERO_NAMESPACE`, then
/// the config file, then the default namespace. Features from the config file
/// and `--features` are combined.
#[derive(Debug, Clone)]
pub struct Factory {
    features: FeatureFlagSet,
    kubeconfig: Option<PathBuf>,
    kubecontext: Option<String>,
    base_name: String,
    namespace: String,
    client_qps: f32,
    client_burst: u32,
}

impl Factory {
    /// Create a factory from the process environment and the default config file
    pub fn new(base_name: &str) -> Self {
        match VeleroConfig::default_path() {
            Ok(path) => Self::from_sources(base_name, &ProcessEnv, Some(&path)),
            Err(e) => {
                warn!("Error locating config file: {}", e);
                Self::from_sources(base_name, &ProcessEnv, None)
            }
        }
    }

    /// Create a factory from explicit sources.
    ///
    /// A config file that cannot be read is logged and treated as empty.
    pub fn from_sources(
        base_name: &str,
        environment: &dyn Environment,
        config_path: Option<&Path>,
    ) -> Self {
        let config = match config_path.map(VeleroConfig::load_from) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!("Error retrieving namespace from config file: {}", e);
                VeleroConfig::default()
            }
            None => VeleroConfig::default(),
        };

        let namespace = environment
            .var(env::NAMESPACE)
            .filter(|ns| !ns.is_empty())
            .or_else(|| config.namespace().map(String::from))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        debug!("Resolved namespace {} before flag parsing", namespace);

        Self {
            features: FeatureFlagSet::new(config.features()),
            kubeconfig: None,
            kubecontext: None,
            base_name: base_name.to_string(),
            namespace,
            client_qps: 0.0,
            client_burst: 0,
        }
    }

    /// Register the factory flags on a command, defaulting `--namespace` to
    /// the namespace resolved so far.
    pub fn bind_flags(&self, cmd: Command) -> Command {
        FactoryArgs::augment_args(cmd)
            .mut_arg("namespace", |arg| arg.default_value(self.namespace.clone()))
    }

    /// Apply parsed flags. Namespace, kubeconfig and context replace the
    /// current values; features are added to the config file ones.
    pub fn apply_flags(&mut self, args: &FactoryArgs) {
        if let Some(namespace) = args.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            self.namespace = namespace.to_string();
        }
        if let Some(kubeconfig) = &args.kubeconfig {
            self.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(kubecontext) = &args.kubecontext {
            self.kubecontext = Some(kubecontext.clone());
        }
        self.features.extend(
            args.features
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty()),
        );
    }

    /// Change the user-agent base name, e.g. for the server subcommand
    pub fn set_base_name(&mut self, name: &str) {
        self.base_name = name.to_string();
    }

    pub fn set_client_qps(&mut self, qps: f32) {
        self.client_qps = qps;
    }

    pub fn set_client_burst(&mut self, burst: u32) {
        self.client_burst = burst;
    }

    pub fn features(&self) -> &FeatureFlagSet {
        &self.features
    }

    fn build_client(&self, config: ClientConfig, client: &'static str) -> Result<Client> {
        config
            .build_client()
            .map_err(|source| VeleroError::ClientConstructionError { client, source })
    }
}

#[async_trait]
impl ClusterClientProvider for Factory {
    async fn client_config(&self) -> Result<ClientConfig> {
        client_config(
            self.kubeconfig.as_deref(),
            self.kubecontext.as_deref(),
            &self.base_name,
            self.client_qps,
            self.client_burst,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn velero_client(&self) -> Result<VeleroClient> {
        let config = self.client_config().await?;
        let client = self.build_client(config, "velero")?;
        Ok(VeleroClient::new(client, self.namespace.clone()))
    }

    #[instrument(skip(self))]
    async fn kube_client(&self) -> Result<Client> {
        let config = self.client_config().await?;
        self.build_client(config, "kubernetes")
    }

    #[instrument(skip(self))]
    async fn dynamic_client(&self) -> Result<DynamicClient> {
        let config = self.client_config().await?;
        let client = self.build_client(config, "dynamic")?;
        Ok(DynamicClient::new(client))
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

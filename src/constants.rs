// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace used when neither flags, environment nor config file name one
pub const DEFAULT_NAMESPACE: &str = "velero";

/// Base name used in the user-agent of constructed clients
pub const DEFAULT_BASE_NAME: &str = "velero";

/// Environment variables consulted during namespace resolution
pub mod env {
    /// Overrides the namespace from the config file
    pub const NAMESPACE: &str = "VELERO_NAMESPACE";
}

/// Persisted user config file location and keys
pub mod config_file {
    /// Directory under $HOME holding the config file
    pub const DIR: [&str; 2] = [".config", "velero"];
    pub const FILE_NAME: &str = "config.json";

    pub const KEY_NAMESPACE: &str = "namespace";
    pub const KEY_FEATURES: &str = "features";
}

/// Velero custom resource API coordinates
pub mod api {
    pub const GROUP: &str = "velero.io";
    pub const VERSION: &str = "v1";
}

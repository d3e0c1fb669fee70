// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Set of enabled feature names

/// Enabled features, listed in the order they were first enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlagSet {
    flags: Vec<String>,
}

impl FeatureFlagSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            set.enable(name);
        }
        set
    }

    /// Check whether a feature is enabled
    pub fn enabled(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    /// Enable a feature. Enabling an already enabled feature keeps its position.
    pub fn enable(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.enabled(&name) {
            self.flags.push(name);
        }
    }

    pub fn all(&self) -> &[String] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<S: Into<String>> Extend<S> for FeatureFlagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.enable(name);
        }
    }
}

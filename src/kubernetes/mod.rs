// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes connection resolution and client construction.

pub mod client;
pub mod factory;
pub mod provider;

pub use client::{ClientConfig, DynamicClient, VeleroClient};
pub use factory::{Factory, FactoryArgs};
pub use provider::ClusterClientProvider;

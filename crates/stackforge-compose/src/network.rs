//! Network factory for the compose document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stackforge_common::constants::APP_NETWORK;

/// A top-level compose network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network driver.
    pub driver: String,
    /// Whether external connectivity is removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<bool>,
    /// Whether standalone containers may attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachable: Option<bool>,
    /// Network labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// The shared application network: bridge mode, attachable.
#[must_use]
pub fn app_network() -> NetworkConfig {
    NetworkConfig {
        driver: "bridge".into(),
        internal: None,
        attachable: Some(true),
        labels: BTreeMap::new(),
    }
}

/// An isolated bridge network with no external access.
#[must_use]
pub fn internal_network() -> NetworkConfig {
    NetworkConfig {
        driver: "bridge".into(),
        internal: Some(true),
        attachable: Some(false),
        labels: BTreeMap::new(),
    }
}

/// The networks section of a generated project.
#[must_use]
pub fn networks() -> BTreeMap<String, NetworkConfig> {
    let mut networks = BTreeMap::new();
    let _ = networks.insert(APP_NETWORK.to_string(), app_network());
    networks
}

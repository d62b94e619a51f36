use std::path::Path;

use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "meetsync";
pub const MANUFACTURER: &str = "Meetsync";

/// Bridge configuration, read once at startup from a JSON file.
///
/// Every field has a default, so an empty or missing file yields a bridge
/// that talks to a local broker and a local conferencing client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BridgeConfig {
    #[serde(default = "default_mqtt_host")]
    pub mqtt_host: String,
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,
    #[serde(default)]
    pub mqtt_username: Option<String>,
    #[serde(default)]
    pub mqtt_password: Option<String>,
    #[serde(default = "default_discovery_prefix")]
    pub discovery_prefix: String,
    #[serde(default = "default_socket_host")]
    pub socket_host: String,
    #[serde(default = "default_socket_port")]
    pub socket_port: u16,
    /// Name the entities are grouped under in Home Assistant.
    #[serde(default = "default_device")]
    pub device: String,
    /// Keyring account the session token is stored against.
    #[serde(default = "default_user")]
    pub user: String,
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_discovery_prefix() -> String {
    "homeassistant".to_string()
}

fn default_socket_host() -> String {
    "localhost".to_string()
}

fn default_socket_port() -> u16 {
    8124
}

fn default_device() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "workstation".to_string())
}

fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| SERVICE_NAME.to_string())
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mqtt_host: default_mqtt_host(),
            mqtt_port: default_mqtt_port(),
            mqtt_username: None,
            mqtt_password: None,
            discovery_prefix: default_discovery_prefix(),
            socket_host: default_socket_host(),
            socket_port: default_socket_port(),
            device: default_device(),
            user: default_user(),
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        "invalid config {}: {e}; falling back to defaults",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn mqtt_client_id(&self) -> String {
        format!("{SERVICE_NAME}-{}", self.user)
    }

    pub fn socket_endpoint(&self) -> String {
        format!("ws://{}:{}", self.socket_host, self.socket_port)
    }
}

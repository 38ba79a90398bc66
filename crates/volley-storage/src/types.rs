use serde::{Deserialize, Serialize};

/// A saved broadcast configuration, as stored and as returned to the
/// dashboard (camelCase on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastConfig {
    pub id: i64,
    pub owner_email: String,
    pub name: String,
    pub token: String,
    pub message: String,
    pub channel_ids: Vec<String>,
    pub delay_seconds: u32,
    pub image_urls: Vec<String>,
    /// RFC-3339 creation instant.
    pub created_at: String,
}

/// Payload for saving a config. The owner email comes from the
/// authenticated identity, never from the request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBroadcastConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub token: String,
    pub message: String,
    pub channel_ids: Vec<String>,
    #[serde(default = "default_delay")]
    pub delay_seconds: u32,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

fn default_name() -> String {
    "Default Config".to_string()
}

fn default_delay() -> u32 {
    60
}

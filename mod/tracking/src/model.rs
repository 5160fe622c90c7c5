use serde::{Deserialize, Serialize};

/// TrackingPixel — one recorded hit against the pixel endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPixel {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Client address that triggered the pixel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// User agent string of the browser or device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Referrer URL the pixel was embedded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    /// RFC 3339 creation timestamp. Immutable after creation.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for recording a new tracking pixel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePixel {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
}

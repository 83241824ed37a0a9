// Wire types for the Aseko REST API (`/api/v1`).
//
// Field names are camelCase on the wire. Everything except the unit
// serial number is optional; absent fields fall back to defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /auth/check`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCheckResponse {
    #[serde(default)]
    pub valid: bool,
}

/// One page of a paginated list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// Entry of `GET /paired-units`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitListItem {
    pub serial_number: String,
}

/// `brandName` object on a unit detail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandName {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
}

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// `ERROR` and `WARNING` messages raise the unit's warning flag.
    pub fn is_problem(self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }
}

/// Entry of `statusMessages` on a unit detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// `GET /paired-units/{serialNumber}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetailResponse {
    pub serial_number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub brand_name: Option<BrandName>,
    #[serde(default)]
    pub status_messages: Vec<StatusMessage>,
    #[serde(default)]
    pub status_values: Map<String, Value>,
}

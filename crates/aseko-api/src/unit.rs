// ── Unit snapshot ──
//
// Parsed, immutable view of one controller unit as returned by the
// detail endpoint. Built fresh on every successful fetch.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::{BrandName, StatusMessage, UnitDetailResponse};

/// Last-known state of a single pool/spa controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSnapshot {
    /// Stable unique identifier across the account. Never empty.
    pub serial_number: String,
    pub name: Option<String>,
    pub note: Option<String>,
    pub online: bool,
    /// True iff any status message is `ERROR` or `WARNING`.
    pub has_warning: bool,
    /// `"{primary} {secondary}"`, trimmed; `None` when that is empty.
    pub brand_name: Option<String>,
    /// Raw status values; keys vary per unit model.
    pub status_values: Map<String, Value>,
    pub status_messages: Vec<StatusMessage>,
}

impl UnitSnapshot {
    /// Look up a raw status value.
    pub fn status_value(&self, key: &str) -> Option<&Value> {
        self.status_values.get(key)
    }

    /// Messages with `ERROR` or `WARNING` severity, in API order.
    pub fn problem_messages(&self) -> impl Iterator<Item = &StatusMessage> {
        self.status_messages
            .iter()
            .filter(|m| m.severity.is_some_and(|s| s.is_problem()))
    }
}

impl TryFrom<UnitDetailResponse> for UnitSnapshot {
    type Error = Error;

    fn try_from(resp: UnitDetailResponse) -> Result<Self, Self::Error> {
        if resp.serial_number.trim().is_empty() {
            return Err(Error::Deserialization {
                message: "unit detail has an empty serialNumber".into(),
                body: String::new(),
            });
        }

        let has_warning = resp
            .status_messages
            .iter()
            .any(|m| m.severity.is_some_and(|s| s.is_problem()));

        Ok(Self {
            serial_number: resp.serial_number,
            name: resp.name,
            note: resp.note,
            online: resp.online.unwrap_or(false),
            has_warning,
            brand_name: resp.brand_name.and_then(compose_brand_name),
            status_values: resp.status_values,
            status_messages: resp.status_messages,
        })
    }
}

fn compose_brand_name(brand: BrandName) -> Option<String> {
    let primary = brand.primary.unwrap_or_default();
    let secondary = brand.secondary.unwrap_or_default();
    let joined = format!("{primary} {secondary}");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

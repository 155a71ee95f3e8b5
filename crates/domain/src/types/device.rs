//! Device/area master data as seen by the visit lifecycle

use serde::{Deserialize, Serialize};

/// Device resolved from an NFC card.
///
/// Owned by the master-data collaborator; the core only reads it. Several
/// cards may resolve to the same device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub card_id: String,
    pub device_id: String,
    pub device_name: String,
    pub area: String,
}

impl DeviceRef {
    pub fn new(
        card_id: impl Into<String>,
        device_id: impl Into<String>,
        device_name: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            device_id: device_id.into(),
            device_name: device_name.into(),
            area: area.into(),
        }
    }
}

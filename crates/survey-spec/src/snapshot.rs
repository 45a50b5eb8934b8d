use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::responses::ResponseStore;

/// Retention window applied by hosts that do not configure their own.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot as json: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("failed to decode snapshot json: {0}")]
    JsonDecode(#[source] serde_json::Error),
    #[error("failed to encode snapshot as cbor: {0}")]
    CborEncode(#[source] serde_cbor::Error),
    #[error("failed to decode snapshot cbor: {0}")]
    CborDecode(#[source] serde_cbor::Error),
}

/// Partially collected answers saved for later recovery.
///
/// Freshness is the persisting host's call; the engine restores whatever it
/// is handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySnapshot {
    pub survey_id: String,
    pub responses: ResponseStore,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl RecoverySnapshot {
    pub fn new(survey_id: impl Into<String>, responses: ResponseStore, timestamp: u64) -> Self {
        Self {
            survey_id: survey_id.into(),
            responses,
            timestamp,
        }
    }

    /// Whether the snapshot is younger than `retention` at time `now`.
    /// Timestamps in the future count as fresh.
    pub fn is_fresh(&self, now: u64, retention: Duration) -> bool {
        now.saturating_sub(self.timestamp) < retention.as_secs()
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::JsonEncode)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::JsonDecode)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, SnapshotError> {
        serde_cbor::to_vec(self).map_err(SnapshotError::CborEncode)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, SnapshotError> {
        serde_cbor::from_slice(bytes).map_err(SnapshotError::CborDecode)
    }
}

use study_core::model::AppState;

use crate::repository::StorageError;

pub(crate) fn encode_state(state: &AppState) -> Result<String, StorageError> {
    serde_json::to_string(state).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parses a stored blob and repairs it with [`AppState::normalize`].
pub(crate) fn decode_state(raw: &str) -> Result<AppState, StorageError> {
    let mut state: AppState =
        serde_json::from_str(raw).map_err(|e| StorageError::Deserialization(e.to_string()))?;
    if state.normalize() {
        tracing::info!("stored state was missing fields; defaults merged in");
    }
    Ok(state)
}

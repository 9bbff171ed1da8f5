//! Envelope format of the persisted slot and the hydration rules.
//!
//! The slot holds `{"state": <AppState>, "version": <u32>}`. On load, the
//! persisted `state` object is shallow-merged over the current state: top-level
//! keys present in storage replace the current ones, missing keys keep their
//! current value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use capyflows_types::AppState;

use crate::storage::StateStorage;

/// Storage slot holding the client state.
pub const STORAGE_KEY: &str = "app-storage";

/// Schema version written into the envelope.
pub const STATE_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOptions {
    /// Storage key of the slot.
    pub name: String,
    pub version: u32,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            name: STORAGE_KEY.to_owned(),
            version: STATE_VERSION,
        }
    }
}

/// How the last hydration attempt resolved.
///
/// Everything except `Restored` leaves the state untouched, which on first
/// hydration means the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// No slot in storage.
    Fresh,
    Restored,
    /// The slot exists but is not a valid envelope.
    Corrupt,
    /// The envelope was written with a different schema version. `found` is
    /// `None` when the stored version is a number but not a non-negative integer.
    VersionMismatch { found: Option<u64>, expected: u32 },
    /// The storage backend failed to read the slot.
    Unavailable,
}

impl Hydration {
    /// Whether hydration ran to completion. Only read and parse failures
    /// leave it incomplete; a missing slot or another version still completes.
    #[must_use]
    pub fn is_complete(self) -> bool {
        !matches!(self, Hydration::Corrupt | Hydration::Unavailable)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a AppState,
    version: u32,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    state: Value,
    /// Compared only when it is a number; anything else is ignored.
    #[serde(default)]
    version: Value,
}

pub(crate) fn encode(state: &AppState, version: u32) -> serde_json::Result<String> {
    serde_json::to_string(&EnvelopeRef { state, version })
}

fn merge(current: &AppState, persisted: Value) -> serde_json::Result<AppState> {
    match persisted {
        Value::Null => Ok(current.clone()),
        Value::Object(persisted) => {
            let mut merged = serde_json::to_value(current)?;
            if let Value::Object(fields) = &mut merged {
                fields.extend(persisted);
            }
            serde_json::from_value(merged)
        }
        other => serde_json::from_value(other),
    }
}

/// Read the slot and merge it over `current`.
///
/// Returns the state to use plus the outcome. Failures are logged here and
/// never surfaced as errors.
pub(crate) fn hydrate<S: StateStorage>(
    storage: &S,
    options: &PersistOptions,
    current: &AppState,
) -> (Option<AppState>, Hydration) {
    let raw = match storage.get_item(&options.name) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key = %options.name, "No persisted state, using defaults");
            return (None, Hydration::Fresh);
        }
        Err(e) => {
            tracing::warn!(key = %options.name, "Failed to read persisted state: {e}");
            return (None, Hydration::Unavailable);
        }
    };

    let envelope: RawEnvelope = match serde_json::from_str(&raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(key = %options.name, "Persisted state is corrupt, resetting to defaults: {e}");
            return (None, Hydration::Corrupt);
        }
    };

    if let Value::Number(found) = &envelope.version
        && found.as_u64() != Some(u64::from(options.version))
    {
        tracing::warn!(
            key = %options.name,
            %found,
            expected = options.version,
            "Persisted state version mismatch, starting fresh"
        );
        return (
            None,
            Hydration::VersionMismatch {
                found: found.as_u64(),
                expected: options.version,
            },
        );
    }

    match merge(current, envelope.state) {
        Ok(state) => {
            tracing::debug!(key = %options.name, "Restored persisted state");
            (Some(state), Hydration::Restored)
        }
        Err(e) => {
            tracing::warn!(key = %options.name, "Persisted state is corrupt, resetting to defaults: {e}");
            (None, Hydration::Corrupt)
        }
    }
}

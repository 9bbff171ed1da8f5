//! The persisted client state: who is connected and which token is active.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Address;

/// Token selected when nothing has been persisted yet.
pub const DEFAULT_TOKEN: &str = "0x9A676e781A523b5d0C0e43731313A708CB607508";

/// The connected identity.
///
/// Invariant: `name` and `id` change together. The only way to mutate a
/// profile is [`Profile::set`] (both fields from a [`ProfileInput`]) or
/// [`Profile::clear`] (both fields reset). Deserialization rejects a name
/// without an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct Profile {
    name: String,
    id: Option<Address>,
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    id: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("profile {name:?} has no id")]
pub struct PartialProfile {
    pub name: String,
}

impl TryFrom<RawProfile> for Profile {
    type Error = PartialProfile;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        if raw.id.is_none() && !raw.name.is_empty() {
            return Err(PartialProfile { name: raw.name });
        }
        Ok(Self {
            name: raw.name,
            id: raw.id,
        })
    }
}

/// Arguments to set a profile. `id` is required, so a set profile is never partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub id: Address,
}

impl ProfileInput {
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<Address>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl Profile {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn id(&self) -> Option<&Address> {
        self.id.as_ref()
    }

    /// True when no identity is connected (`{name: "", id: null}`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_empty()
    }

    pub fn set(&mut self, input: ProfileInput) {
        *self = Self::from(input);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl From<ProfileInput> for Profile {
    fn from(input: ProfileInput) -> Self {
        Self {
            name: input.name,
            id: Some(input.id),
        }
    }
}

/// Snapshot of the whole client state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub profile: Profile,
    pub token: Address,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            token: Address::from(DEFAULT_TOKEN),
        }
    }
}

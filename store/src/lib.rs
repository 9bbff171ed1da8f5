//! Persisted profile/token store.
//!
//! [`Store`] owns one [`AppState`] snapshot, exposes the three client actions
//! (`set_current_profile`, `clear_current_profile`, `set_token`), notifies
//! subscribers on every change and writes the full snapshot through to a
//! [`StateStorage`] slot after every mutation. Construction rehydrates from that
//! slot, falling back to defaults when it is missing or unreadable.

mod file;
mod persist;
mod storage;
mod store;

pub use capyflows_types::{Address, AppState, DEFAULT_TOKEN, Profile, ProfileInput};
pub use file::FileStorage;
pub use persist::{Hydration, PersistOptions, STATE_VERSION, STORAGE_KEY};
pub use storage::{MemoryStorage, StateStorage, StorageError};
pub use store::{Store, SubscriptionId};

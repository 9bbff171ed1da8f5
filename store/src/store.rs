use std::fmt;
use std::mem;
use std::sync::Arc;

use capyflows_types::{Address, AppState, Profile, ProfileInput};

use crate::persist::{self, Hydration, PersistOptions};
use crate::storage::StateStorage;

type Listener = Box<dyn FnMut(&AppState, &AppState) + Send>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The persisted client state container.
///
/// Snapshots are immutable `Arc<AppState>` values. Every mutation clones the
/// current snapshot into a draft, applies the change and commits a new `Arc`, so
/// a snapshot obtained from [`Store::state`] never changes underneath its holder
/// and `Arc::ptr_eq` tells whether anything changed in between.
///
/// All mutators take `&mut self`: there is exactly one writer at a time.
pub struct Store<S: StateStorage> {
    storage: S,
    options: PersistOptions,
    state: Arc<AppState>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    hydration: Hydration,
}

impl<S: StateStorage> Store<S> {
    /// Build a store on `storage`, rehydrating from the `"app-storage"` slot.
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, PersistOptions::default())
    }

    pub fn with_options(storage: S, options: PersistOptions) -> Self {
        let defaults = AppState::default();
        let (restored, hydration) = persist::hydrate(&storage, &options, &defaults);
        Self {
            storage,
            options,
            state: Arc::new(restored.unwrap_or(defaults)),
            listeners: Vec::new(),
            next_subscription: 0,
            hydration,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.state.profile
    }

    #[must_use]
    pub fn token(&self) -> &Address {
        &self.state.token
    }

    #[must_use]
    pub fn hydration(&self) -> Hydration {
        self.hydration
    }

    /// Whether the last hydration finished. True on a first run with no slot;
    /// false only when the slot could not be read or parsed.
    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        self.hydration.is_complete()
    }

    #[must_use]
    pub fn options(&self) -> &PersistOptions {
        &self.options
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_current_profile(&mut self, profile: ProfileInput) {
        self.update(|draft| draft.profile.set(profile));
    }

    pub fn clear_current_profile(&mut self) {
        self.update(|draft| draft.profile.clear());
    }

    pub fn set_token(&mut self, token: impl Into<Address>) {
        let token = token.into();
        self.update(|draft| draft.token = token);
    }

    /// Apply `recipe` to a draft copy of the state and commit it.
    ///
    /// Subscribers are notified only if the draft differs from the current
    /// snapshot; the slot is written either way.
    pub fn update(&mut self, recipe: impl FnOnce(&mut AppState)) {
        let mut draft = AppState::clone(&self.state);
        recipe(&mut draft);
        self.commit(draft);
        self.persist();
    }

    /// Register `listener`, called with `(state, previous)` after every change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&AppState, &AppState) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Re-read the slot, e.g. after another process wrote it.
    ///
    /// On anything but [`Hydration::Restored`] the in-memory state is kept.
    pub fn rehydrate(&mut self) -> Hydration {
        let (restored, hydration) = persist::hydrate(&self.storage, &self.options, &self.state);
        if let Some(state) = restored {
            self.commit(state);
        }
        self.hydration = hydration;
        hydration
    }

    /// Remove the slot from storage. In-memory state is untouched, and the next
    /// mutation writes it back.
    pub fn clear_storage(&mut self) {
        if let Err(e) = self.storage.remove_item(&self.options.name) {
            tracing::warn!(key = %self.options.name, "Failed to clear persisted state: {e}");
        }
    }

    fn commit(&mut self, next: AppState) {
        if *self.state == next {
            return;
        }
        let previous = mem::replace(&mut self.state, Arc::new(next));
        for (_, listener) in &mut self.listeners {
            listener(self.state.as_ref(), previous.as_ref());
        }
    }

    fn persist(&self) {
        let encoded = match persist::encode(&self.state, self.options.version) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %self.options.name, "Failed to serialize state: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&self.options.name, &encoded) {
            tracing::warn!(key = %self.options.name, "Failed to persist state: {e}");
        }
    }
}

impl<S: StateStorage + fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("storage", &self.storage)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("hydration", &self.hydration)
            .finish()
    }
}

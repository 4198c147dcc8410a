//! Recipient registry.
//!
//! Maps a recipient id to the place it watches and the set of event ids already delivered
//! to it.  `register`/`unregister` are driven by the embedding program's connection
//! lifecycle and may happen at any time; `mark_delivered` is only called by the poll loop.
//!
//! Invariant: a delivered-set only grows for the lifetime of a registration.  The only way
//! to forget history is to drop the registration, which is exactly what a reconnect does.
//!

use std::collections::HashSet;

use dashmap::DashMap;
use temblor_common::Location;
use tracing::trace;

/// What we keep per recipient.
///
#[derive(Clone, Debug)]
struct Registration {
    /// Watched place, fixed at registration time.  A recipient that moves re-registers.
    location: Location,
    /// Event ids already delivered
    delivered: HashSet<String>,
}

/// Point-in-time copy of one registration, safe to iterate without holding any lock.
///
#[derive(Clone, Debug)]
pub struct RegistrationView {
    pub id: String,
    pub location: Location,
    pub delivered: HashSet<String>,
}

/// The registry itself.  All operations take `&self`, the per-entry locking of the
/// underlying map serializes concurrent `mark_delivered` calls on the same recipient.
///
#[derive(Debug, Default)]
pub struct Registry {
    inner: DashMap<String, Registration>,
}

impl Registry {
    /// Basic `new()`
    ///
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registration with an empty delivered-set.  Re-registering an existing id
    /// replaces it, so a disconnect/reconnect forgets history.
    ///
    #[tracing::instrument(skip(self))]
    pub fn register(&self, id: &str, location: Location) {
        trace!("register {id}");

        self.inner.insert(
            id.to_string(),
            Registration {
                location,
                delivered: HashSet::new(),
            },
        );
    }

    /// Remove a registration.  Unknown ids are fine, the connection may already be gone.
    ///
    #[tracing::instrument(skip(self))]
    pub fn unregister(&self, id: &str) {
        trace!("unregister {id}");

        self.inner.remove(id);
    }

    /// Union `event_ids` into the recipient's delivered-set.  A missing id is a no-op: the
    /// registration may have been removed while a poll cycle was in flight.
    ///
    #[tracing::instrument(skip(self, event_ids))]
    pub fn mark_delivered<I>(&self, id: &str, event_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(mut entry) = self.inner.get_mut(id) {
            entry.delivered.extend(event_ids);
        } else {
            trace!("mark_delivered on unknown {id}, ignored");
        }
    }

    /// Point-in-time copy for the poll loop to iterate over.  Registrations added or
    /// removed afterwards are picked up on the next cycle.
    ///
    pub fn snapshot(&self) -> Vec<RegistrationView> {
        self.inner
            .iter()
            .map(|entry| RegistrationView {
                id: entry.key().clone(),
                location: entry.value().location,
                delivered: entry.value().delivered.clone(),
            })
            .collect()
    }

    /// Number of live registrations
    ///
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

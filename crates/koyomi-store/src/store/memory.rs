//! In-process document store with change notifications.

use std::collections::HashMap;

use futures::future::BoxFuture;
use tokio::sync::{RwLock, broadcast};

use koyomi_core::constants::{EVENT_DOC_PREFIX, PROFILE_DOC_PREFIX};

use crate::error::{StoreError, StoreResult};
use crate::model::{SchedulingEvent, UserProfile};
use crate::store::{EventPatch, EventStore, EventWatch, ProfileStore};

/// Snapshots buffered per subscriber before slow readers start skipping.
const CHANNEL_CAPACITY: usize = 16;

/// Reference `EventStore`/`ProfileStore` implementation over in-process
/// maps. Each write runs in one critical section, so a patch is applied
/// entirely or not at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<String, SchedulingEvent>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
    channels: RwLock<HashMap<String, broadcast::Sender<SchedulingEvent>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn publish(&self, event_id: &str, snapshot: SchedulingEvent) {
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(event_id) {
            // No receivers is fine; the send result only signals that.
            sender.send(snapshot).ok();
        }
    }
}

impl EventStore for MemoryStore {
    fn get<'a>(
        &'a self,
        event_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<SchedulingEvent>>> {
        Box::pin(async move {
            let events = self.events.read().await;
            Ok(events.get(event_id).cloned())
        })
    }

    fn insert<'a>(&'a self, event: SchedulingEvent) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let snapshot = {
                let mut events = self.events.write().await;
                if events.contains_key(&event.id) {
                    return Err(StoreError::DuplicateDocument(format!(
                        "{EVENT_DOC_PREFIX}{}",
                        event.id
                    )));
                }
                tracing::debug!(event_id = %event.id, "Inserting event document");
                events.insert(event.id.clone(), event.clone());
                event
            };
            let event_id = snapshot.id.clone();
            self.publish(&event_id, snapshot).await;
            Ok(())
        })
    }

    fn apply<'a>(
        &'a self,
        event_id: &'a str,
        patch: EventPatch,
    ) -> BoxFuture<'a, StoreResult<SchedulingEvent>> {
        Box::pin(async move {
            let snapshot = {
                let mut events = self.events.write().await;
                let event = events.get_mut(event_id).ok_or_else(|| {
                    StoreError::MissingDocument(format!("{EVENT_DOC_PREFIX}{event_id}"))
                })?;

                if let Some(expected) = patch.expected_revision
                    && expected != event.revision
                {
                    return Err(StoreError::RevisionMismatch {
                        expected,
                        actual: event.revision,
                    });
                }

                patch.apply_to(event);
                tracing::debug!(event_id, revision = event.revision, "Applied event patch");
                event.clone()
            };
            self.publish(event_id, snapshot.clone()).await;
            Ok(snapshot)
        })
    }

    fn subscribe<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, StoreResult<EventWatch>> {
        Box::pin(async move {
            {
                let events = self.events.read().await;
                if !events.contains_key(event_id) {
                    return Err(StoreError::MissingDocument(format!(
                        "{EVENT_DOC_PREFIX}{event_id}"
                    )));
                }
            }
            let mut channels = self.channels.write().await;
            let sender = channels
                .entry(event_id.to_string())
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
            Ok(EventWatch::new(sender.subscribe()))
        })
    }
}

impl ProfileStore for MemoryStore {
    fn profile<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<UserProfile>>> {
        Box::pin(async move {
            let profiles = self.profiles.read().await;
            Ok(profiles.get(user_id).cloned())
        })
    }

    fn upsert_profile<'a>(&'a self, profile: UserProfile) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let mut profiles = self.profiles.write().await;
            tracing::trace!(path = %format!("{PROFILE_DOC_PREFIX}{}", profile.id), "Upserting profile");
            profiles.insert(profile.id.clone(), profile);
            Ok(())
        })
    }
}

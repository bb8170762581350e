//! Storage adapters - durable homes for the application snapshot.
//!
//! Callers never see which backend they talk to. Every logical operation is
//! expressed as a list of [`Change`]s handed to [`StorageAdapter::apply`], and
//! each backend guarantees that either all of them land or none do:
//!
//! - [`LocalStore`] keeps the whole snapshot as one JSON blob and rewrites it
//!   atomically (temp file, fsync, rename).
//! - [`RelationalStore`] keeps five tables and runs every change list inside a
//!   single database transaction.
//!
//! Concurrent writers from different processes are not detected; the last
//! write wins.

pub mod local;
pub mod mapping;
pub mod relational;

pub use local::LocalStore;
pub use relational::RelationalStore;

use crate::{
    errors::Result,
    models::{Announcement, AppSnapshot, Media, Module, Settings, User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// What [`StorageAdapter::bootstrap`] found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// A record already existed; nothing was written.
    Existing,
    /// The store was empty and the seed snapshot was written.
    Seeded,
    /// The store was empty and an older namespace's record was copied forward.
    Migrated {
        /// Namespace the record came from
        namespace: String,
    },
}

/// One per-entity mutation. A data-access operation emits one or more of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Insert or replace the user with this phone
    PutUser(User),
    /// Delete the user with this phone
    DeleteUser(String),
    /// Insert or replace the module with this id
    PutModule(Module),
    /// Delete the module with this id (media must be removed first)
    DeleteModule(String),
    /// Insert or replace the media item with this id
    PutMedia(Media),
    /// Delete the media item with this id
    DeleteMedia(String),
    /// Delete every media item owned by this module id
    DeleteModuleMedia(String),
    /// Insert or replace the announcement with this id
    PutAnnouncement(Announcement),
    /// Delete the announcement with this id
    DeleteAnnouncement(String),
    /// Replace the settings record
    PutSettings(Settings),
}

impl Change {
    /// Applies this change to an in-memory snapshot.
    ///
    /// Puts replace in place when the key exists and append otherwise; deletes
    /// of absent keys do nothing.
    pub fn apply_to(&self, snapshot: &mut AppSnapshot) {
        match self {
            Self::PutUser(user) => upsert(&mut snapshot.users, user, |u| &u.phone),
            Self::DeleteUser(phone) => snapshot.users.retain(|u| &u.phone != phone),
            Self::PutModule(module) => upsert(&mut snapshot.modules, module, |m| &m.id),
            Self::DeleteModule(id) => snapshot.modules.retain(|m| &m.id != id),
            Self::PutMedia(media) => upsert(&mut snapshot.media, media, |m| &m.id),
            Self::DeleteMedia(id) => snapshot.media.retain(|m| &m.id != id),
            Self::DeleteModuleMedia(module_id) => {
                snapshot.media.retain(|m| &m.module_id != module_id);
            }
            Self::PutAnnouncement(announcement) => {
                upsert(&mut snapshot.announcements, announcement, |a| &a.id);
            }
            Self::DeleteAnnouncement(id) => snapshot.announcements.retain(|a| &a.id != id),
            Self::PutSettings(settings) => snapshot.settings = settings.clone(),
        }
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, key: impl Fn(&T) -> &String) {
    match items.iter_mut().find(|existing| key(existing) == key(item)) {
        Some(existing) => *existing = item.clone(),
        None => items.push(item.clone()),
    }
}

/// Persistence of the application snapshot.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Writes the seed snapshot if, and only if, no record exists yet.
    ///
    /// Idempotent: a second call on the same store returns [`Bootstrap::Existing`]
    /// and writes nothing.
    async fn bootstrap(&self, now: DateTime<Utc>) -> Result<Bootstrap>;

    /// Reads the whole snapshot, bootstrapping first. Modules come back sorted
    /// by `order`, announcements newest first.
    async fn load(&self) -> Result<AppSnapshot>;

    /// Like [`StorageAdapter::load`], but an unreadable record is an error
    /// instead of falling back to seed data.
    async fn load_strict(&self) -> Result<AppSnapshot> {
        self.load().await
    }

    /// Replaces everything with `snapshot`. On failure the previous record is untouched.
    async fn save(&self, snapshot: &AppSnapshot) -> Result<()>;

    /// Applies `changes` in order as one all-or-nothing unit.
    async fn apply(&self, changes: &[Change]) -> Result<()>;
}

/// Identifies one student's progress through one module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgressKey {
    /// Normalized phone of the student
    pub user_phone: String,
    /// Module being tracked
    pub module_id: String,
}

impl ProgressKey {
    /// Builds a key from its parts.
    pub fn new(user_phone: impl Into<String>, module_id: impl Into<String>) -> Self {
        Self {
            user_phone: user_phone.into(),
            module_id: module_id.into(),
        }
    }
}

/// Completion sets, stored apart from the snapshot and never exported.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Media ids marked complete under `key`; empty when nothing was recorded.
    async fn completed(&self, key: &ProgressKey) -> Result<BTreeSet<String>>;

    /// Replaces the completion set under `key`.
    async fn set_completed(&self, key: &ProgressKey, completed: &BTreeSet<String>) -> Result<()>;
}

/// A store that holds both the snapshot and progress. Both backends qualify.
pub trait Backend: StorageAdapter + ProgressStore {}

impl<T: StorageAdapter + ProgressStore> Backend for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_snapshot;

    #[test]
    fn test_put_replaces_in_place() {
        let mut snapshot = seed_snapshot(Utc::now());
        let mut module = snapshot.modules[0].clone();
        module.title = "Renamed".to_string();

        Change::PutModule(module).apply_to(&mut snapshot);

        assert_eq!(snapshot.modules.len(), 1);
        assert_eq!(snapshot.modules[0].title, "Renamed");
    }

    #[test]
    fn test_put_appends_new_key() {
        let mut snapshot = seed_snapshot(Utc::now());
        let mut user = snapshot.users[0].clone();
        user.phone = "5511".to_string();

        Change::PutUser(user).apply_to(&mut snapshot);

        assert_eq!(snapshot.users.len(), 2);
        assert_eq!(snapshot.users[1].phone, "5511");
    }

    #[test]
    fn test_delete_module_media_only_touches_that_module() {
        let mut snapshot = seed_snapshot(Utc::now());
        let mut other = snapshot.media[0].clone();
        other.id = "m2".to_string();
        other.module_id = "2".to_string();
        snapshot.media.push(other);

        Change::DeleteModuleMedia("1".to_string()).apply_to(&mut snapshot);

        assert_eq!(snapshot.media.len(), 1);
        assert_eq!(snapshot.media[0].module_id, "2");
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let mut snapshot = seed_snapshot(Utc::now());
        let before = snapshot.clone();

        Change::DeleteAnnouncement("missing".to_string()).apply_to(&mut snapshot);

        assert_eq!(snapshot, before);
    }
}

//! Announcement business logic.
//!
//! Announcements are always listed newest first.

use crate::{
    errors::{Error, Result},
    models::Announcement,
    storage::{Change, StorageAdapter},
};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Validation {
            message: "Announcement text cannot be empty".to_string(),
        });
    }
    Ok(())
}

async fn find<S>(store: &S, id: &str) -> Result<Announcement>
where
    S: StorageAdapter + ?Sized,
{
    store
        .load()
        .await?
        .announcements
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| Error::not_found("announcement", id))
}

/// All announcements, newest first.
pub async fn list_announcements<S>(store: &S) -> Result<Vec<Announcement>>
where
    S: StorageAdapter + ?Sized,
{
    Ok(store.load().await?.announcements)
}

/// Announcements students currently see, newest first.
pub async fn active_announcements<S>(store: &S) -> Result<Vec<Announcement>>
where
    S: StorageAdapter + ?Sized,
{
    let mut announcements = list_announcements(store).await?;
    announcements.retain(|a| a.active);
    Ok(announcements)
}

/// Publishes a new, active announcement dated `now`.
#[instrument(skip(store, text))]
pub async fn add_announcement<S>(store: &S, text: &str, now: DateTime<Utc>) -> Result<Announcement>
where
    S: StorageAdapter + ?Sized,
{
    validate_text(text)?;
    let announcement = Announcement {
        id: uuid::Uuid::new_v4().to_string(),
        text: text.trim().to_string(),
        active: true,
        date: now,
    };
    store
        .apply(&[Change::PutAnnouncement(announcement.clone())])
        .await?;
    info!("Published announcement {}", announcement.id);
    Ok(announcement)
}

/// Rewrites the text of an announcement, keeping its date and state.
///
/// # Errors
/// Returns [`Error::NotFound`] if no announcement has `id`.
#[instrument(skip(store, text))]
pub async fn update_announcement<S>(store: &S, id: &str, text: &str) -> Result<Announcement>
where
    S: StorageAdapter + ?Sized,
{
    validate_text(text)?;
    let mut announcement = find(store, id).await?;
    announcement.text = text.trim().to_string();
    store
        .apply(&[Change::PutAnnouncement(announcement.clone())])
        .await?;
    info!("Edited announcement {}", id);
    Ok(announcement)
}

/// Flips `active` and returns the new state.
///
/// # Errors
/// Returns [`Error::NotFound`] if no announcement has `id`.
#[instrument(skip(store))]
pub async fn toggle_announcement<S>(store: &S, id: &str) -> Result<bool>
where
    S: StorageAdapter + ?Sized,
{
    let mut announcement = find(store, id).await?;
    announcement.active = !announcement.active;
    let active = announcement.active;
    store
        .apply(&[Change::PutAnnouncement(announcement)])
        .await?;
    info!("Announcement {} is now {}", id, if active { "active" } else { "hidden" });
    Ok(active)
}

/// Deletes an announcement.
///
/// # Errors
/// Returns [`Error::NotFound`] if no announcement has `id`.
#[instrument(skip(store))]
pub async fn remove_announcement<S>(store: &S, id: &str) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    find(store, id).await?;
    store
        .apply(&[Change::DeleteAnnouncement(id.to_string())])
        .await?;
    info!("Removed announcement {}", id);
    Ok(())
}

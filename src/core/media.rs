//! Media business logic - lesson items inside a module.

use crate::{
    entities::MediaType,
    errors::{Error, Result},
    models::Media,
    storage::{Change, StorageAdapter},
};
use tracing::{info, instrument};

/// Input for [`add_media`]; the id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewMedia {
    /// Existing module to add to
    pub module_id: String,
    /// How the item is presented
    pub kind: MediaType,
    /// Embed, image, or link URL
    pub url: String,
    /// Title shown in the lesson list
    pub title: String,
    /// Optional notes under the title
    pub description: Option<String>,
}

fn validate(title: &str, url: &str) -> Result<()> {
    if title.trim().is_empty() || url.trim().is_empty() {
        return Err(Error::Validation {
            message: "Media needs a title and a URL".to_string(),
        });
    }
    Ok(())
}

/// Media of one module, in stored order.
pub async fn list_media<S>(store: &S, module_id: &str) -> Result<Vec<Media>>
where
    S: StorageAdapter + ?Sized,
{
    let snapshot = store.load().await?;
    Ok(snapshot.media_for(module_id).cloned().collect())
}

/// Adds a media item to an existing module.
///
/// # Errors
/// - [`Error::Validation`] on a blank title or URL
/// - [`Error::NotFound`] if the module does not exist
#[instrument(skip(store, new), fields(module_id = %new.module_id))]
pub async fn add_media<S>(store: &S, new: NewMedia) -> Result<Media>
where
    S: StorageAdapter + ?Sized,
{
    validate(&new.title, &new.url)?;
    let snapshot = store.load().await?;
    if snapshot.module(&new.module_id).is_none() {
        return Err(Error::not_found("module", new.module_id));
    }

    let media = Media {
        id: uuid::Uuid::new_v4().to_string(),
        module_id: new.module_id,
        kind: new.kind,
        url: new.url.trim().to_string(),
        title: new.title.trim().to_string(),
        description: new.description.filter(|d| !d.trim().is_empty()),
    };
    store.apply(&[Change::PutMedia(media.clone())]).await?;
    info!("Added media {} to module {}", media.id, media.module_id);
    Ok(media)
}

/// Replaces every field of an existing media item. Moving it to another
/// module is allowed as long as that module exists.
///
/// # Errors
/// Returns [`Error::NotFound`] if the media item or its target module is missing.
#[instrument(skip(store, media), fields(id = %media.id))]
pub async fn update_media<S>(store: &S, media: Media) -> Result<Media>
where
    S: StorageAdapter + ?Sized,
{
    validate(&media.title, &media.url)?;
    let snapshot = store.load().await?;
    if !snapshot.media.iter().any(|m| m.id == media.id) {
        return Err(Error::not_found("media", media.id));
    }
    if snapshot.module(&media.module_id).is_none() {
        return Err(Error::not_found("module", media.module_id));
    }

    store.apply(&[Change::PutMedia(media.clone())]).await?;
    info!("Updated media {}", media.id);
    Ok(media)
}

/// Deletes one media item.
///
/// # Errors
/// Returns [`Error::NotFound`] if no media item has `id`.
#[instrument(skip(store))]
pub async fn remove_media<S>(store: &S, id: &str) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    let snapshot = store.load().await?;
    if !snapshot.media.iter().any(|m| m.id == id) {
        return Err(Error::not_found("media", id));
    }
    store.apply(&[Change::DeleteMedia(id.to_string())]).await?;
    info!("Removed media {}", id);
    Ok(())
}

//! Backup and restore of the whole snapshot as a JSON document.
//!
//! Import validates the entire document before touching the store. A rejected
//! document leaves the stored data exactly as it was.

use crate::{
    core::{module::validate_drip_days, user::normalize_phone},
    errors::{Error, Result},
    models::{Announcement, AppSnapshot, Media, Module, Settings, User, seed_snapshot},
    storage::{Change, StorageAdapter},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{collections::HashSet, fmt, str::FromStr};
use tracing::{info, instrument};

/// How an imported document meets the data already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Overwrite everything; collections missing from the document end up empty.
    #[default]
    Replace,
    /// Insert or update by key; anything the document does not mention stays.
    Upsert,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Upsert => write!(f, "upsert"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "upsert" => Ok(Self::Upsert),
            other => Err(Error::Validation {
                message: format!("unknown import mode '{other}' (expected replace or upsert)"),
            }),
        }
    }
}

/// What an import wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Mode the import ran in
    pub mode: ImportMode,
    /// Users in the document
    pub users: usize,
    /// Modules in the document
    pub modules: usize,
    /// Media items in the document
    pub media: usize,
    /// Announcements in the document
    pub announcements: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} import: {} users, {} modules, {} media, {} announcements",
            self.mode, self.users, self.modules, self.media, self.announcements
        )
    }
}

/// A document that passed shape validation. Collections are `None` when the
/// document did not carry them.
#[derive(Debug)]
struct ParsedDocument {
    users: Vec<User>,
    modules: Option<Vec<Module>>,
    media: Option<Vec<Media>>,
    announcements: Option<Vec<Announcement>>,
    settings: Settings,
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidImport {
        reason: reason.into(),
    }
}

fn collection<T: DeserializeOwned>(root: &Map<String, Value>, key: &str) -> Result<Option<Vec<T>>> {
    match root.get(key) {
        None => Ok(None),
        Some(value @ Value::Array(_)) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| invalid(format!("'{key}' has a malformed entry: {e}"))),
        Some(_) => Err(invalid(format!("'{key}' must be an array"))),
    }
}

fn parse_document(doc: &str) -> Result<ParsedDocument> {
    let root: Value = serde_json::from_str(doc).map_err(|e| invalid(format!("not JSON: {e}")))?;
    let root = root
        .as_object()
        .ok_or_else(|| invalid("the document must be a JSON object"))?;

    let settings = match root.get("settings") {
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
            .map_err(|e| invalid(format!("'settings' is malformed: {e}")))?,
        Some(_) => return Err(invalid("'settings' must be an object")),
        None => return Err(invalid("'settings' is missing")),
    };
    let users = collection(root, "users")?.ok_or_else(|| invalid("'users' is missing"))?;

    Ok(ParsedDocument {
        users,
        modules: collection(root, "modules")?,
        media: collection(root, "media")?,
        announcements: collection(root, "announcements")?,
        settings,
    })
}

/// Normalizes phones and rejects duplicate keys (phones, module, media and
/// announcement ids), out-of-range drip delays, and media pointing at modules
/// that will not exist after the import.
fn check_integrity(parsed: &mut ParsedDocument, existing_modules: &HashSet<String>) -> Result<()> {
    let mut phones = HashSet::new();
    for user in &mut parsed.users {
        user.phone = normalize_phone(&user.phone).map_err(|e| invalid(e.to_string()))?;
        if !phones.insert(user.phone.clone()) {
            return Err(invalid(format!("phone {} appears twice", user.phone)));
        }
    }

    let mut module_ids = existing_modules.clone();
    let mut seen = HashSet::new();
    for module in parsed.modules.iter().flatten() {
        if !seen.insert(module.id.as_str()) {
            return Err(invalid(format!("module {} appears twice", module.id)));
        }
        validate_drip_days(&module.id, module.drip_days).map_err(|e| invalid(e.to_string()))?;
        module_ids.insert(module.id.clone());
    }

    let mut seen = HashSet::new();
    for media in parsed.media.iter().flatten() {
        if !seen.insert(media.id.as_str()) {
            return Err(invalid(format!("media {} appears twice", media.id)));
        }
        if !module_ids.contains(&media.module_id) {
            return Err(invalid(format!(
                "media {} references missing module {}",
                media.id, media.module_id
            )));
        }
    }

    let mut seen = HashSet::new();
    for announcement in parsed.announcements.iter().flatten() {
        if !seen.insert(announcement.id.as_str()) {
            return Err(invalid(format!("announcement {} appears twice", announcement.id)));
        }
    }
    Ok(())
}

/// Serializes the full snapshot, unredacted, as pretty-printed JSON.
///
/// # Errors
/// Fails if the stored record cannot be read; seed data is never exported in its place.
#[instrument(skip(store))]
pub async fn export_snapshot<S>(store: &S) -> Result<String>
where
    S: StorageAdapter + ?Sized,
{
    let snapshot = store.load_strict().await?;
    let doc = serde_json::to_string_pretty(&snapshot)?;
    info!(
        "Exported {} users, {} modules, {} media",
        snapshot.users.len(),
        snapshot.modules.len(),
        snapshot.media.len()
    );
    Ok(doc)
}

/// Restores a document produced by [`export_snapshot`].
///
/// The document must be an object with a `settings` object and a `users`
/// array; `modules`, `media`, and `announcements` are optional arrays.
///
/// # Errors
/// Returns [`Error::InvalidImport`] for any malformed document, before anything is written.
#[instrument(skip(store, doc), fields(bytes = doc.len()))]
pub async fn import_snapshot<S>(store: &S, doc: &str, mode: ImportMode) -> Result<ImportSummary>
where
    S: StorageAdapter + ?Sized,
{
    let mut parsed = parse_document(doc)?;
    let existing_modules = match mode {
        ImportMode::Replace => HashSet::new(),
        ImportMode::Upsert => store
            .load()
            .await?
            .modules
            .into_iter()
            .map(|m| m.id)
            .collect(),
    };
    check_integrity(&mut parsed, &existing_modules)?;

    let summary = ImportSummary {
        mode,
        users: parsed.users.len(),
        modules: parsed.modules.as_ref().map_or(0, Vec::len),
        media: parsed.media.as_ref().map_or(0, Vec::len),
        announcements: parsed.announcements.as_ref().map_or(0, Vec::len),
    };

    match mode {
        ImportMode::Replace => {
            let mut snapshot = AppSnapshot {
                users: parsed.users,
                modules: parsed.modules.unwrap_or_default(),
                media: parsed.media.unwrap_or_default(),
                announcements: parsed.announcements.unwrap_or_default(),
                settings: parsed.settings,
            };
            snapshot.normalize();
            store.save(&snapshot).await?;
        }
        ImportMode::Upsert => {
            // Modules go in before the media that reference them
            let changes: Vec<Change> = parsed
                .users
                .into_iter()
                .map(Change::PutUser)
                .chain(parsed.modules.into_iter().flatten().map(Change::PutModule))
                .chain(parsed.media.into_iter().flatten().map(Change::PutMedia))
                .chain(
                    parsed
                        .announcements
                        .into_iter()
                        .flatten()
                        .map(Change::PutAnnouncement),
                )
                .chain(std::iter::once(Change::PutSettings(parsed.settings)))
                .collect();
            store.apply(&changes).await?;
        }
    }

    info!("{}", summary);
    Ok(summary)
}

/// Overwrites the store with the seed snapshot dated `now`.
#[instrument(skip(store))]
pub async fn reset_to_seed<S>(store: &S, now: DateTime<Utc>) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    store.save(&seed_snapshot(now)).await?;
    info!("Store reset to seed data");
    Ok(())
}

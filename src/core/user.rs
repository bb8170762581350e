//! User business logic - registration, edits, and the student login gate.
//!
//! Phones are the user key and are always stored digits-only. Lookup is split
//! in two: [`lookup_user`] is a pure query, while [`authenticate_and_touch`]
//! is the login command that also records `last_login`.

use crate::{
    errors::{Error, Result},
    models::User,
    storage::{Change, StorageAdapter},
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Strips every non-digit from `raw`.
///
/// # Errors
/// Returns [`Error::Validation`] if no digits remain.
pub fn normalize_phone(raw: &str) -> Result<String> {
    let phone: String = raw.chars().filter(char::is_ascii_digit).collect();
    if phone.is_empty() {
        return Err(Error::Validation {
            message: format!("'{raw}' contains no phone digits"),
        });
    }
    Ok(phone)
}

/// All users in stored order.
pub async fn list_users<S>(store: &S) -> Result<Vec<User>>
where
    S: StorageAdapter + ?Sized,
{
    Ok(store.load().await?.users)
}

/// Registers a new user created now.
///
/// # Errors
/// Returns [`Error::DuplicateUser`] if the normalized phone is taken.
#[instrument(skip(store, name))]
pub async fn add_user<S>(store: &S, phone: &str, name: Option<String>, active: bool) -> Result<User>
where
    S: StorageAdapter + ?Sized,
{
    let phone = normalize_phone(phone)?;
    let snapshot = store.load().await?;
    if snapshot.user(&phone).is_some() {
        return Err(Error::DuplicateUser { phone });
    }

    let user = User {
        phone,
        active,
        name: name.filter(|n| !n.trim().is_empty()),
        created_at: Utc::now(),
        last_login: None,
    };
    store.apply(&[Change::PutUser(user.clone())]).await?;
    info!("Registered user {}", user.phone);
    Ok(user)
}

/// Fields to change on an existing user; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
    /// New phone (re-keys the user)
    pub phone: Option<String>,
    /// New active flag
    pub active: Option<bool>,
}

/// Merges `patch` into the user stored under `original_phone`.
///
/// # Errors
/// - [`Error::NotFound`] if no user has `original_phone`
/// - [`Error::DuplicateUser`] if the new phone belongs to someone else
#[instrument(skip(store, patch))]
pub async fn update_user<S>(store: &S, original_phone: &str, patch: UserPatch) -> Result<User>
where
    S: StorageAdapter + ?Sized,
{
    let original_phone = normalize_phone(original_phone)?;
    let snapshot = store.load().await?;
    let mut user = snapshot
        .user(&original_phone)
        .cloned()
        .ok_or_else(|| Error::not_found("user", &original_phone))?;

    if let Some(name) = patch.name {
        user.name = Some(name).filter(|n| !n.trim().is_empty());
    }
    if let Some(active) = patch.active {
        user.active = active;
    }

    let mut changes = Vec::with_capacity(2);
    if let Some(phone) = patch.phone {
        let phone = normalize_phone(&phone)?;
        if phone != original_phone {
            if snapshot.user(&phone).is_some() {
                return Err(Error::DuplicateUser { phone });
            }
            changes.push(Change::DeleteUser(original_phone.clone()));
            user.phone = phone;
        }
    }
    changes.push(Change::PutUser(user.clone()));

    store.apply(&changes).await?;
    info!("Updated user {} (now {})", original_phone, user.phone);
    Ok(user)
}

/// Hard-deletes a user.
///
/// # Errors
/// Returns [`Error::NotFound`] if no user has `phone`.
#[instrument(skip(store))]
pub async fn remove_user<S>(store: &S, phone: &str) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    let phone = normalize_phone(phone)?;
    let snapshot = store.load().await?;
    if snapshot.user(&phone).is_none() {
        return Err(Error::not_found("user", phone));
    }
    store.apply(&[Change::DeleteUser(phone.clone())]).await?;
    info!("Removed user {}", phone);
    Ok(())
}

/// Finds an active user by phone. Never writes.
pub async fn lookup_user<S>(store: &S, phone: &str) -> Result<Option<User>>
where
    S: StorageAdapter + ?Sized,
{
    let phone = normalize_phone(phone)?;
    let snapshot = store.load().await?;
    let found = snapshot.user(&phone).filter(|u| u.active).cloned();
    debug!("Lookup for {}: {}", phone, found.is_some());
    Ok(found)
}

/// The student login: checks maintenance mode and the user's state, then
/// stamps `last_login = now` and persists it.
///
/// # Errors
/// - [`Error::Maintenance`] while maintenance mode is on
/// - [`Error::UnknownUser`] if no user has the phone
/// - [`Error::InactiveUser`] if the user exists but is disabled
#[instrument(skip(store))]
pub async fn authenticate_and_touch<S>(store: &S, raw_phone: &str, now: DateTime<Utc>) -> Result<User>
where
    S: StorageAdapter + ?Sized,
{
    let snapshot = store.load().await?;
    if snapshot.settings.maintenance_mode {
        warn!("Login refused: maintenance mode");
        return Err(Error::Maintenance);
    }

    let phone = normalize_phone(raw_phone)?;
    let mut user = snapshot
        .user(&phone)
        .cloned()
        .ok_or_else(|| Error::UnknownUser {
            phone: phone.clone(),
        })?;
    if !user.active {
        return Err(Error::InactiveUser { phone });
    }

    user.last_login = Some(now);
    store.apply(&[Change::PutUser(user.clone())]).await?;
    info!("User {} logged in", user.phone);
    Ok(user)
}

//! Shared test utilities.
//!
//! This module provides helpers for setting up both storage backends and for
//! creating test entities with sensible defaults.

use crate::{
    core::{media, module, user},
    entities::{Category, MediaType},
    errors::Result,
    models::{self, AppSnapshot},
    storage::{LocalStore, RelationalStore, StorageAdapter},
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::create_connection("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A relational store over a fresh in-memory database. Not yet bootstrapped.
pub async fn setup_relational_store() -> Result<RelationalStore> {
    Ok(RelationalStore::new(setup_test_db().await?))
}

/// A local store in a fresh temp directory. Keep the `TempDir` alive for the
/// duration of the test.
pub fn setup_local_store() -> Result<(TempDir, LocalStore)> {
    let dir = TempDir::new()?;
    let store = LocalStore::new(dir.path(), "KidsEnglishDB_test");
    Ok((dir, store))
}

/// A relational store holding an empty snapshot (no seed rows).
pub async fn setup_empty_store() -> Result<RelationalStore> {
    let store = setup_relational_store().await?;
    store.save(&AppSnapshot::empty()).await?;
    Ok(store)
}

/// 2024-01-01T00:00:00Z, the fixed signup time used across tests.
#[must_use]
pub fn jan_first() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Builds an in-memory module without touching storage.
///
/// # Defaults
/// * `category`: videos
/// * `active`: true
/// * visibility flags and drip days unset
#[must_use]
pub fn module_fixture(id: &str, order: i32) -> models::Module {
    models::Module {
        id: id.to_string(),
        title: format!("Module {id}"),
        category: Category::Videos,
        order,
        active: true,
        icon: None,
        description: None,
        banner: None,
        banner_size: None,
        drip_days: None,
        show_in_vertical: None,
        show_in_horizontal: None,
    }
}

/// Builds an in-memory active user created at `created_at`.
#[must_use]
pub fn user_fixture(phone: &str, created_at: DateTime<Utc>) -> models::User {
    models::User {
        phone: phone.to_string(),
        active: true,
        name: None,
        created_at,
        last_login: None,
    }
}

/// Creates a test module with sensible defaults through the data-access layer.
pub async fn create_test_module<S>(store: &S, title: &str) -> Result<models::Module>
where
    S: StorageAdapter + ?Sized,
{
    module::add_module(store, module::NewModule::new(title, Category::Videos)).await
}

/// Creates a video media item in `module_id`.
pub async fn create_test_media<S>(store: &S, module_id: &str, title: &str) -> Result<models::Media>
where
    S: StorageAdapter + ?Sized,
{
    media::add_media(
        store,
        media::NewMedia {
            module_id: module_id.to_string(),
            kind: MediaType::Video,
            url: format!("https://example.com/{title}"),
            title: title.to_string(),
            description: None,
        },
    )
    .await
}

/// Creates an active test user.
pub async fn create_test_user<S>(store: &S, phone: &str) -> Result<models::User>
where
    S: StorageAdapter + ?Sized,
{
    user::add_user(store, phone, Some("Test Student".to_string()), true).await
}

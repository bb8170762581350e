//! Relational store - five tables behind `SeaORM`.
//!
//! Reads are five independent queries assembled into one snapshot. Writes go
//! through [`StorageAdapter::apply`], which executes each change as a
//! per-entity statement inside one transaction, so a module delete and its
//! media cascade either both happen or neither does.

use super::{Bootstrap, Change, ProgressKey, ProgressStore, StorageAdapter};
use crate::{
    entities::{
        Announcement, AnnouncementColumn, Media, MediaColumn, Module, ModuleColumn, Progress,
        ProgressColumn, Settings, SettingsColumn, User, UserColumn, announcement, media, module,
        progress, settings, user,
    },
    errors::Result,
    models::{self, AppSnapshot, seed_snapshot},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, Iterable, QueryOrder, Set, TransactionTrait,
    prelude::*, sea_query::OnConflict,
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Snapshot store backed by a relational database.
#[derive(Debug, Clone)]
pub struct RelationalStore {
    db: DatabaseConnection,
}

impl RelationalStore {
    /// Wraps an open connection. Tables must already exist (see
    /// [`crate::config::database::create_tables`]).
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

async fn is_empty<C: ConnectionTrait>(db: &C) -> Result<bool> {
    Ok(User::find().one(db).await?.is_none()
        && Module::find().one(db).await?.is_none()
        && Media::find().one(db).await?.is_none()
        && Announcement::find().one(db).await?.is_none()
        && Settings::find().one(db).await?.is_none())
}

async fn read_snapshot<C: ConnectionTrait>(db: &C) -> Result<AppSnapshot> {
    let users = User::find()
        .order_by_asc(UserColumn::CreatedAt)
        .all(db)
        .await?;
    let modules = Module::find()
        .order_by_asc(ModuleColumn::Order)
        .all(db)
        .await?;
    let media = Media::find().order_by_asc(MediaColumn::Id).all(db).await?;
    let announcements = Announcement::find()
        .order_by_desc(AnnouncementColumn::Date)
        .all(db)
        .await?;
    let settings = Settings::find_by_id(settings::SETTINGS_ROW_ID).one(db).await?;

    Ok(AppSnapshot {
        users: users.into_iter().map(Into::into).collect(),
        modules: modules.into_iter().map(Into::into).collect(),
        media: media.into_iter().map(Into::into).collect(),
        announcements: announcements.into_iter().map(Into::into).collect(),
        // An absent settings row reads as the defaults
        settings: settings.map(Into::into).unwrap_or_default(),
    })
}

async fn put_user(txn: &DatabaseTransaction, row: &models::User) -> Result<()> {
    User::insert(user::ActiveModel::from(row))
        .on_conflict(
            OnConflict::column(UserColumn::Phone)
                .update_columns(UserColumn::iter().filter(|c| !matches!(c, UserColumn::Phone)))
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn put_module(txn: &DatabaseTransaction, row: &models::Module) -> Result<()> {
    Module::insert(module::ActiveModel::from(row))
        .on_conflict(
            OnConflict::column(ModuleColumn::Id)
                .update_columns(ModuleColumn::iter().filter(|c| !matches!(c, ModuleColumn::Id)))
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn put_media(txn: &DatabaseTransaction, row: &models::Media) -> Result<()> {
    Media::insert(media::ActiveModel::from(row))
        .on_conflict(
            OnConflict::column(MediaColumn::Id)
                .update_columns(MediaColumn::iter().filter(|c| !matches!(c, MediaColumn::Id)))
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn put_announcement(txn: &DatabaseTransaction, row: &models::Announcement) -> Result<()> {
    Announcement::insert(announcement::ActiveModel::from(row))
        .on_conflict(
            OnConflict::column(AnnouncementColumn::Id)
                .update_columns(
                    AnnouncementColumn::iter().filter(|c| !matches!(c, AnnouncementColumn::Id)),
                )
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn put_settings(txn: &DatabaseTransaction, row: &models::Settings) -> Result<()> {
    Settings::insert(settings::ActiveModel::from(row))
        .on_conflict(
            OnConflict::column(SettingsColumn::Id)
                .update_columns(SettingsColumn::iter().filter(|c| !matches!(c, SettingsColumn::Id)))
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn apply_change(txn: &DatabaseTransaction, change: &Change) -> Result<()> {
    match change {
        Change::PutUser(row) => put_user(txn, row).await?,
        Change::DeleteUser(phone) => {
            User::delete_by_id(phone.clone()).exec(txn).await?;
        }
        Change::PutModule(row) => put_module(txn, row).await?,
        Change::DeleteModule(id) => {
            Module::delete_by_id(id.clone()).exec(txn).await?;
        }
        Change::PutMedia(row) => put_media(txn, row).await?,
        Change::DeleteMedia(id) => {
            Media::delete_by_id(id.clone()).exec(txn).await?;
        }
        Change::DeleteModuleMedia(module_id) => {
            let deleted = Media::delete_many()
                .filter(MediaColumn::ModuleId.eq(module_id.as_str()))
                .exec(txn)
                .await?;
            debug!(
                "Removed {} media rows of module {}",
                deleted.rows_affected, module_id
            );
        }
        Change::PutAnnouncement(row) => put_announcement(txn, row).await?,
        Change::DeleteAnnouncement(id) => {
            Announcement::delete_by_id(id.clone()).exec(txn).await?;
        }
        Change::PutSettings(row) => put_settings(txn, row).await?,
    }
    Ok(())
}

/// Deletes every snapshot row and inserts `snapshot` in its place.
async fn replace_all(txn: &DatabaseTransaction, snapshot: &AppSnapshot) -> Result<()> {
    // Media first: its rows reference modules
    Media::delete_many().exec(txn).await?;
    Module::delete_many().exec(txn).await?;
    User::delete_many().exec(txn).await?;
    Announcement::delete_many().exec(txn).await?;
    Settings::delete_many().exec(txn).await?;

    if !snapshot.users.is_empty() {
        User::insert_many(snapshot.users.iter().map(user::ActiveModel::from))
            .exec_without_returning(txn)
            .await?;
    }
    if !snapshot.modules.is_empty() {
        Module::insert_many(snapshot.modules.iter().map(module::ActiveModel::from))
            .exec_without_returning(txn)
            .await?;
    }
    if !snapshot.media.is_empty() {
        Media::insert_many(snapshot.media.iter().map(media::ActiveModel::from))
            .exec_without_returning(txn)
            .await?;
    }
    if !snapshot.announcements.is_empty() {
        Announcement::insert_many(
            snapshot
                .announcements
                .iter()
                .map(announcement::ActiveModel::from),
        )
        .exec_without_returning(txn)
        .await?;
    }
    Settings::insert(settings::ActiveModel::from(&snapshot.settings))
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

#[async_trait]
impl StorageAdapter for RelationalStore {
    #[instrument(skip(self))]
    async fn bootstrap(&self, now: DateTime<Utc>) -> Result<Bootstrap> {
        let txn = self.db.begin().await?;
        if !is_empty(&txn).await? {
            txn.rollback().await?;
            return Ok(Bootstrap::Existing);
        }

        replace_all(&txn, &seed_snapshot(now)).await?;
        txn.commit().await?;
        info!("Seeded empty database");
        Ok(Bootstrap::Seeded)
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<AppSnapshot> {
        self.bootstrap(Utc::now()).await?;
        let snapshot = read_snapshot(&self.db).await?;
        debug!(
            "Loaded snapshot: {} users, {} modules, {} media",
            snapshot.users.len(),
            snapshot.modules.len(),
            snapshot.media.len()
        );
        Ok(snapshot)
    }

    #[instrument(skip(self, snapshot))]
    async fn save(&self, snapshot: &AppSnapshot) -> Result<()> {
        let txn = self.db.begin().await?;
        replace_all(&txn, snapshot).await?;
        txn.commit().await?;
        info!("Replaced all tables from snapshot");
        Ok(())
    }

    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn apply(&self, changes: &[Change]) -> Result<()> {
        // Dropping the transaction on an early return rolls it back
        let txn = self.db.begin().await?;
        for change in changes {
            apply_change(&txn, change).await?;
        }
        txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for RelationalStore {
    async fn completed(&self, key: &ProgressKey) -> Result<BTreeSet<String>> {
        let rows = Progress::find()
            .filter(ProgressColumn::UserPhone.eq(key.user_phone.as_str()))
            .filter(ProgressColumn::ModuleId.eq(key.module_id.as_str()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| row.media_id).collect())
    }

    #[instrument(skip(self, completed))]
    async fn set_completed(&self, key: &ProgressKey, completed: &BTreeSet<String>) -> Result<()> {
        let txn = self.db.begin().await?;
        Progress::delete_many()
            .filter(ProgressColumn::UserPhone.eq(key.user_phone.as_str()))
            .filter(ProgressColumn::ModuleId.eq(key.module_id.as_str()))
            .exec(&txn)
            .await?;

        if !completed.is_empty() {
            Progress::insert_many(completed.iter().map(|media_id| progress::ActiveModel {
                user_phone: Set(key.user_phone.clone()),
                module_id: Set(key.module_id.clone()),
                media_id: Set(media_id.clone()),
            }))
            .exec_without_returning(&txn)
            .await?;
        }
        txn.commit().await?;
        Ok(())
    }
}

//! Database configuration module for the relational backend.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{Announcement, Media, Module, Progress, Settings, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Default database used when neither the config file nor `DATABASE_URL` names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/kidsenglish.sqlite?mode=rwc";

/// Gets the database URL from the environment, falling back to `configured`
/// and then to [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
///
/// Modules are created before media because media rows reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut users = schema.create_table_from_entity(User);
    let mut modules = schema.create_table_from_entity(Module);
    let mut media = schema.create_table_from_entity(Media);
    let mut announcements = schema.create_table_from_entity(Announcement);
    let mut settings = schema.create_table_from_entity(Settings);
    let mut progress = schema.create_table_from_entity(Progress);

    db.execute(builder.build(users.if_not_exists())).await?;
    db.execute(builder.build(modules.if_not_exists())).await?;
    db.execute(builder.build(media.if_not_exists())).await?;
    db.execute(builder.build(announcements.if_not_exists())).await?;
    db.execute(builder.build(settings.if_not_exists())).await?;
    db.execute(builder.build(progress.if_not_exists())).await?;

    info!("Database tables ensured");
    Ok(())
}

//! Announcement entity - A banner message shown to every student while active.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Announcement database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    /// Opaque identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Message text
    pub text: String,
    /// Shown to students when true
    pub active: bool,
    /// Creation time, listed newest first
    pub date: DateTimeUtc,
}

/// `Announcement` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

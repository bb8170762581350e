//! Module entity - A course unit grouping media items.
//!
//! Modules are sorted by `order` and gated per user by `drip_days`.

use super::enums::Category;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Module database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    /// Opaque identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Title shown on the module card
    pub title: String,
    /// Content category
    pub category: Category,
    /// Display position, ascending
    pub order: i32,
    /// Hidden from students when false
    pub active: bool,
    /// Emoji or short icon text
    pub icon: Option<String>,
    /// Longer description
    pub description: Option<String>,
    /// Banner image as data URI or URL
    #[sea_orm(column_type = "Text", nullable)]
    pub banner: Option<String>,
    /// Human-readable size of the banner (e.g. `"12.3 KB"`)
    pub banner_size: Option<String>,
    /// Days after signup before the module unlocks
    pub drip_days: Option<i32>,
    /// Listed in the main vertical list (default true)
    pub show_in_vertical: Option<bool>,
    /// Listed in the horizontal carousel (default false)
    pub show_in_horizontal: Option<bool>,
}

/// Defines relationships between Module and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One module has many media items
    #[sea_orm(has_many = "super::media::Entity")]
    Media,
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Media entity - A lesson item (video, image, or link) inside a module.

use super::enums::MediaType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Media database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media")]
pub struct Model {
    /// Opaque identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning module
    pub module_id: String,
    /// Presentation type
    #[sea_orm(column_name = "type")]
    pub kind: MediaType,
    /// Source URL
    #[sea_orm(column_type = "Text")]
    pub url: String,
    /// Title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
}

/// Defines relationships between Media and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each media item belongs to one module
    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

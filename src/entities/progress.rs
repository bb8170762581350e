//! Progress entity - One completed media item for one user in one module.
//!
//! Kept apart from the snapshot tables: progress is never exported or imported.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "progress")]
pub struct Model {
    /// Phone of the student
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_phone: String,
    /// Module the media belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub module_id: String,
    /// Completed media item
    #[sea_orm(primary_key, auto_increment = false)]
    pub media_id: String,
}

/// `Progress` has no modelled relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

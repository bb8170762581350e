//! User entity - A student allowed through the login gate.
//!
//! The phone number is the natural key; there is no surrogate id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Normalized phone (digits only), unique per user
    #[sea_orm(primary_key, auto_increment = false)]
    pub phone: String,
    /// Display name
    pub name: Option<String>,
    /// Whether the user may log in
    pub active: bool,
    /// Signup time, the anchor for drip unlocks
    pub created_at: DateTimeUtc,
    /// Last successful login
    pub last_login: Option<DateTimeUtc>,
}

/// Users have no modelled relations; progress rows reference them by phone only.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

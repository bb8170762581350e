//! Settings entity - The singleton branding and behaviour record.
//!
//! Exactly one row is kept, under [`SETTINGS_ROW_ID`].

use super::enums::{FontFamily, ModuleTheme, TitleAlignment};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the only settings row
pub const SETTINGS_ROW_ID: i32 = 1;

/// Settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Always [`SETTINGS_ROW_ID`]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub app_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub logo_url: Option<String>,
    pub logo_width: i32,
    pub font_family: FontFamily,
    pub title_alignment: TitleAlignment,
    pub primary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub header_spacing: i32,
    pub login_title: String,
    pub login_subtitle: String,
    pub admin_login_title: String,
    pub admin_login_subtitle: Option<String>,
    pub show_admin_link: Option<bool>,
    /// Student logins are refused while set
    pub maintenance_mode: bool,
    pub horizontal_section_title: String,
    pub footer_text: String,
    pub module_design_theme: Option<ModuleTheme>,
}

/// `Settings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

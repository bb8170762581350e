//! String-backed enums shared by the entity rows and the snapshot model.
//!
//! Each variant carries both its database string (`sea_orm`) and its JSON
//! string (`serde`). The two always agree, so a value read from one backend
//! can be written to the other unchanged.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Content category of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Category {
    /// Stories
    #[sea_orm(string_value = "historias")]
    #[serde(rename = "historias")]
    Stories,
    /// Videos
    #[sea_orm(string_value = "videos")]
    #[serde(rename = "videos")]
    Videos,
    /// Games
    #[sea_orm(string_value = "jogos")]
    #[serde(rename = "jogos")]
    Games,
    /// Songs
    #[sea_orm(string_value = "musicas")]
    #[serde(rename = "musicas")]
    Songs,
}

/// How a media item is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Embedded video player
    #[sea_orm(string_value = "video")]
    Video,
    /// Inline image
    #[sea_orm(string_value = "image")]
    Image,
    /// External link
    #[sea_orm(string_value = "link")]
    Link,
}

/// Font families the theme editor offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum FontFamily {
    #[sea_orm(string_value = "Fredoka")]
    #[serde(rename = "Fredoka")]
    Fredoka,
    #[sea_orm(string_value = "Lilita One")]
    #[serde(rename = "Lilita One")]
    LilitaOne,
    #[sea_orm(string_value = "Quicksand")]
    #[serde(rename = "Quicksand")]
    Quicksand,
    #[sea_orm(string_value = "Nunito")]
    #[serde(rename = "Nunito")]
    Nunito,
    #[sea_orm(string_value = "Comic Neue")]
    #[serde(rename = "Comic Neue")]
    ComicNeue,
    #[sea_orm(string_value = "Bubblegum Sans")]
    #[serde(rename = "Bubblegum Sans")]
    BubblegumSans,
    #[sea_orm(string_value = "Outfit")]
    #[serde(rename = "Outfit")]
    Outfit,
    #[sea_orm(string_value = "Baloo 2")]
    #[serde(rename = "Baloo 2")]
    Baloo2,
    #[sea_orm(string_value = "sans-serif")]
    #[serde(rename = "sans-serif")]
    SansSerif,
}

/// Horizontal alignment of page titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TitleAlignment {
    #[sea_orm(string_value = "start")]
    Start,
    #[sea_orm(string_value = "center")]
    Center,
    #[sea_orm(string_value = "end")]
    End,
}

/// Named presets for how module cards are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "kebab-case")]
pub enum ModuleTheme {
    #[sea_orm(string_value = "modern-glass")]
    ModernGlass,
    #[sea_orm(string_value = "playful-kids")]
    PlayfulKids,
    #[sea_orm(string_value = "cinema-dark")]
    CinemaDark,
    #[sea_orm(string_value = "minimal-list")]
    MinimalList,
    #[sea_orm(string_value = "gamer-grid")]
    GamerGrid,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_json_and_db_strings_agree() {
        for font in FontFamily::iter() {
            let json = serde_json::to_value(font).unwrap();
            assert_eq!(json.as_str().unwrap(), font.to_value());
        }
        for theme in ModuleTheme::iter() {
            let json = serde_json::to_value(theme).unwrap();
            assert_eq!(json.as_str().unwrap(), theme.to_value());
        }
        for category in Category::iter() {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json.as_str().unwrap(), category.to_value());
        }
    }

    #[test]
    fn test_media_type_parses_lowercase() {
        let kind: MediaType = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, MediaType::Video);
        assert!(serde_json::from_str::<MediaType>("\"Video\"").is_err());
    }
}

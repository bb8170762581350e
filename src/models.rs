//! Snapshot model - the in-memory shape of all application data.
//!
//! These types serialize to the camelCase JSON used by backups and by the
//! local blob store. Optional fields are omitted when unset so a document
//! round-trips without gaining keys it never had.

use crate::entities::{Category, FontFamily, MediaType, ModuleTheme, TitleAlignment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student account, keyed by phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Digits-only phone, the user key
    pub phone: String,
    /// Whether the student may log in
    pub active: bool,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Signup time; drip delays count from here
    pub created_at: DateTime<Utc>,
    /// Last successful student login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// A course unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Unique identifier
    pub id: String,
    /// Title shown on the card
    pub title: String,
    /// Content category
    pub category: Category,
    /// Position in the lists, `1..=N`
    pub order: i32,
    /// Hidden from students when false
    pub active: bool,
    /// Emoji or icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Short blurb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Banner image as a data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Human-readable banner size (`"12.3 KB"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_size: Option<String>,
    /// Days after signup before the module opens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drip_days: Option<u32>,
    /// Listed in the vertical list (unset means true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_vertical: Option<bool>,
    /// Listed in the horizontal list (unset means false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_horizontal: Option<bool>,
}

impl Module {
    /// Unlock delay in days; unset means immediately.
    #[must_use]
    pub fn drip_days(&self) -> u32 {
        self.drip_days.unwrap_or(0)
    }

    /// Whether the module belongs in the vertical list (default true).
    #[must_use]
    pub fn shows_in_vertical(&self) -> bool {
        self.show_in_vertical.unwrap_or(true)
    }

    /// Whether the module belongs in the horizontal list (default false).
    #[must_use]
    pub fn shows_in_horizontal(&self) -> bool {
        self.show_in_horizontal.unwrap_or(false)
    }
}

/// A lesson item inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Unique identifier
    pub id: String,
    /// Owning module
    pub module_id: String,
    /// How the item is presented
    #[serde(rename = "type")]
    pub kind: MediaType,
    /// Embed, image, or link URL
    pub url: String,
    /// Title shown in the lesson list
    pub title: String,
    /// Optional notes under the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A message broadcast to all students while active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Unique identifier
    pub id: String,
    /// Message body
    pub text: String,
    /// Shown to students when true
    pub active: bool,
    /// Publication time
    pub date: DateTime<Utc>,
}

/// Branding and behaviour settings. Missing keys in a document fall back to
/// the seed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Brand name
    pub app_name: String,
    /// Logo image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Logo width in pixels
    pub logo_width: i32,
    /// Title font
    pub font_family: FontFamily,
    /// Title alignment
    pub title_alignment: TitleAlignment,
    /// Primary colour (hex)
    pub primary_color: String,
    /// Accent colour (hex)
    pub accent_color: String,
    /// Page background colour (hex)
    pub background_color: String,
    /// Space above the header in pixels
    pub header_spacing: i32,
    /// Student login heading
    pub login_title: String,
    /// Student login subheading
    pub login_subtitle: String,
    /// Admin login heading
    pub admin_login_title: String,
    /// Admin login subheading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_login_subtitle: Option<String>,
    /// Show the admin link on the student login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_admin_link: Option<bool>,
    /// Refuse student logins while true
    pub maintenance_mode: bool,
    /// Heading of the horizontal list
    pub horizontal_section_title: String,
    /// Footer line
    pub footer_text: String,
    /// Card design preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_design_theme: Option<ModuleTheme>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "KidsEnglish".to_string(),
            logo_url: None,
            logo_width: 180,
            font_family: FontFamily::LilitaOne,
            title_alignment: TitleAlignment::Start,
            primary_color: "#1A237E".to_string(),
            accent_color: "#3D5AFE".to_string(),
            background_color: "#FFFFFF".to_string(),
            header_spacing: 48,
            login_title: "Acesso Exclusivo".to_string(),
            login_subtitle: "Premium Education".to_string(),
            admin_login_title: "Console Admin".to_string(),
            admin_login_subtitle: None,
            show_admin_link: None,
            maintenance_mode: false,
            horizontal_section_title: "Mais Aventuras".to_string(),
            footer_text: "KIDSENGLISH PREMIUM".to_string(),
            module_design_theme: None,
        }
    }
}

/// Every entity collection plus settings: the unit of backup and of local persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSnapshot {
    /// Student accounts
    pub users: Vec<User>,
    /// Course units, by `order`
    pub modules: Vec<Module>,
    /// Lesson items of every module
    pub media: Vec<Media>,
    /// Announcements, newest first
    pub announcements: Vec<Announcement>,
    /// Branding and behaviour
    pub settings: Settings,
}

impl AppSnapshot {
    /// Snapshot with no entities and default settings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            users: Vec::new(),
            modules: Vec::new(),
            media: Vec::new(),
            announcements: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Sorts modules by `order` and announcements newest first, the order every reader expects.
    pub fn normalize(&mut self) {
        self.modules.sort_by_key(|m| m.order);
        self.announcements.sort_by(|a, b| b.date.cmp(&a.date));
    }

    /// Finds a user by normalized phone.
    #[must_use]
    pub fn user(&self, phone: &str) -> Option<&User> {
        self.users.iter().find(|u| u.phone == phone)
    }

    /// Finds a module by id.
    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Media belonging to `module_id`, in stored order.
    pub fn media_for<'a>(&'a self, module_id: &'a str) -> impl Iterator<Item = &'a Media> + 'a {
        self.media.iter().filter(move |m| m.module_id == module_id)
    }
}

/// The data written on first start: one admin user, one module with one
/// video, and one welcome announcement.
#[must_use]
pub fn seed_snapshot(now: DateTime<Utc>) -> AppSnapshot {
    AppSnapshot {
        users: vec![User {
            phone: "98988650771".to_string(),
            active: true,
            name: Some("Admin João".to_string()),
            created_at: now,
            last_login: None,
        }],
        modules: vec![Module {
            id: "1".to_string(),
            title: "Welcome Stories".to_string(),
            category: Category::Stories,
            order: 1,
            active: true,
            icon: Some("📚".to_string()),
            description: Some("First steps into English adventures!".to_string()),
            banner: None,
            banner_size: None,
            drip_days: None,
            show_in_vertical: None,
            show_in_horizontal: None,
        }],
        media: vec![Media {
            id: "m1".to_string(),
            module_id: "1".to_string(),
            kind: MediaType::Video,
            url: "https://www.youtube.com/embed/dQw4w9WgXcQ".to_string(),
            title: "Let's Begin!".to_string(),
            description: Some("Watch this video to start your journey.".to_string()),
        }],
        announcements: vec![Announcement {
            id: "a1".to_string(),
            text: "Welcome to KidsEnglish! 🚀".to_string(),
            active: true,
            date: now,
        }],
        settings: Settings::default(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_module_flag_defaults() {
        let snapshot = seed_snapshot(Utc::now());
        let module = &snapshot.modules[0];
        assert_eq!(module.drip_days(), 0);
        assert!(module.shows_in_vertical());
        assert!(!module.shows_in_horizontal());
    }

    #[test]
    fn test_snapshot_json_uses_camel_case() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(seed_snapshot(now)).unwrap();

        assert_eq!(json["users"][0]["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(json["media"][0]["moduleId"], "1");
        assert_eq!(json["media"][0]["type"], "video");
        assert_eq!(json["settings"]["fontFamily"], "Lilita One");
        assert_eq!(json["settings"]["maintenanceMode"], false);
        // Unset optionals are omitted, not written as null
        assert!(json["users"][0].get("lastLogin").is_none());
        assert!(json["modules"][0].get("dripDays").is_none());
    }

    #[test]
    fn test_partial_settings_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"appName": "Other", "maintenanceMode": true}"#).unwrap();
        assert_eq!(settings.app_name, "Other");
        assert!(settings.maintenance_mode);
        assert_eq!(settings.logo_width, 180);
        assert_eq!(settings.font_family, FontFamily::LilitaOne);
    }

    #[test]
    fn test_normalize_orders_collections() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut snapshot = seed_snapshot(now);
        let mut second = snapshot.modules[0].clone();
        second.id = "2".to_string();
        second.order = 0;
        snapshot.modules.push(second);
        snapshot.announcements.push(Announcement {
            id: "a2".to_string(),
            text: "Later".to_string(),
            active: true,
            date: now + chrono::Duration::days(1),
        });

        snapshot.normalize();

        assert_eq!(snapshot.modules[0].id, "2");
        assert_eq!(snapshot.announcements[0].id, "a2");
    }
}

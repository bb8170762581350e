//! Field mapping between table rows (snake_case wire names) and the snapshot
//! model (camelCase JSON names).
//!
//! | model field           | column                 |
//! |-----------------------|------------------------|
//! | `User.createdAt`      | `users.created_at`     |
//! | `User.lastLogin`      | `users.last_login`     |
//! | `Module.bannerSize`   | `modules.banner_size`  |
//! | `Module.dripDays`     | `modules.drip_days` (`u32` <-> `i32`; data access rejects values above `i32::MAX`, writes clamp) |
//! | `Module.showInVertical` / `showInHorizontal` | `modules.show_in_vertical` / `show_in_horizontal` |
//! | `Media.moduleId`      | `media.module_id`      |
//! | `Media.type`          | `media.type`           |
//! | `Settings.*`          | `settings.*` (snake_case of each field), singleton row id 1 |

use crate::{
    entities::{announcement, media, module, settings, user},
    models::{Announcement, Media, Module, Settings, User},
};
use sea_orm::Set;

impl From<user::Model> for User {
    fn from(row: user::Model) -> Self {
        Self {
            phone: row.phone,
            active: row.active,
            name: row.name,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

impl From<&User> for user::ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            phone: Set(user.phone.clone()),
            name: Set(user.name.clone()),
            active: Set(user.active),
            created_at: Set(user.created_at),
            last_login: Set(user.last_login),
        }
    }
}

impl From<module::Model> for Module {
    fn from(row: module::Model) -> Self {
        Self {
            id: row.id,
            title: row.title,
            category: row.category,
            order: row.order,
            active: row.active,
            icon: row.icon,
            description: row.description,
            banner: row.banner,
            banner_size: row.banner_size,
            // A negative stored delay is meaningless; treat it as unset
            drip_days: row.drip_days.and_then(|d| u32::try_from(d).ok()),
            show_in_vertical: row.show_in_vertical,
            show_in_horizontal: row.show_in_horizontal,
        }
    }
}

impl From<&Module> for module::ActiveModel {
    fn from(module: &Module) -> Self {
        Self {
            id: Set(module.id.clone()),
            title: Set(module.title.clone()),
            category: Set(module.category),
            order: Set(module.order),
            active: Set(module.active),
            icon: Set(module.icon.clone()),
            description: Set(module.description.clone()),
            banner: Set(module.banner.clone()),
            banner_size: Set(module.banner_size.clone()),
            drip_days: Set(module
                .drip_days
                .map(|d| i32::try_from(d).unwrap_or(i32::MAX))),
            show_in_vertical: Set(module.show_in_vertical),
            show_in_horizontal: Set(module.show_in_horizontal),
        }
    }
}

impl From<media::Model> for Media {
    fn from(row: media::Model) -> Self {
        Self {
            id: row.id,
            module_id: row.module_id,
            kind: row.kind,
            url: row.url,
            title: row.title,
            description: row.description,
        }
    }
}

impl From<&Media> for media::ActiveModel {
    fn from(media: &Media) -> Self {
        Self {
            id: Set(media.id.clone()),
            module_id: Set(media.module_id.clone()),
            kind: Set(media.kind),
            url: Set(media.url.clone()),
            title: Set(media.title.clone()),
            description: Set(media.description.clone()),
        }
    }
}

impl From<announcement::Model> for Announcement {
    fn from(row: announcement::Model) -> Self {
        Self {
            id: row.id,
            text: row.text,
            active: row.active,
            date: row.date,
        }
    }
}

impl From<&Announcement> for announcement::ActiveModel {
    fn from(announcement: &Announcement) -> Self {
        Self {
            id: Set(announcement.id.clone()),
            text: Set(announcement.text.clone()),
            active: Set(announcement.active),
            date: Set(announcement.date),
        }
    }
}

impl From<settings::Model> for Settings {
    fn from(row: settings::Model) -> Self {
        Self {
            app_name: row.app_name,
            logo_url: row.logo_url,
            logo_width: row.logo_width,
            font_family: row.font_family,
            title_alignment: row.title_alignment,
            primary_color: row.primary_color,
            accent_color: row.accent_color,
            background_color: row.background_color,
            header_spacing: row.header_spacing,
            login_title: row.login_title,
            login_subtitle: row.login_subtitle,
            admin_login_title: row.admin_login_title,
            admin_login_subtitle: row.admin_login_subtitle,
            show_admin_link: row.show_admin_link,
            maintenance_mode: row.maintenance_mode,
            horizontal_section_title: row.horizontal_section_title,
            footer_text: row.footer_text,
            module_design_theme: row.module_design_theme,
        }
    }
}

impl From<&Settings> for settings::ActiveModel {
    fn from(settings: &Settings) -> Self {
        Self {
            id: Set(settings::SETTINGS_ROW_ID),
            app_name: Set(settings.app_name.clone()),
            logo_url: Set(settings.logo_url.clone()),
            logo_width: Set(settings.logo_width),
            font_family: Set(settings.font_family),
            title_alignment: Set(settings.title_alignment),
            primary_color: Set(settings.primary_color.clone()),
            accent_color: Set(settings.accent_color.clone()),
            background_color: Set(settings.background_color.clone()),
            header_spacing: Set(settings.header_spacing),
            login_title: Set(settings.login_title.clone()),
            login_subtitle: Set(settings.login_subtitle.clone()),
            admin_login_title: Set(settings.admin_login_title.clone()),
            admin_login_subtitle: Set(settings.admin_login_subtitle.clone()),
            show_admin_link: Set(settings.show_admin_link),
            maintenance_mode: Set(settings.maintenance_mode),
            horizontal_section_title: Set(settings.horizontal_section_title.clone()),
            footer_text: Set(settings.footer_text.clone()),
            module_design_theme: Set(settings.module_design_theme),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_negative_drip_days_read_as_unset() {
        let row = module::Model {
            id: "1".to_string(),
            title: "T".to_string(),
            category: crate::entities::Category::Videos,
            order: 1,
            active: true,
            icon: None,
            description: None,
            banner: None,
            banner_size: None,
            drip_days: Some(-3),
            show_in_vertical: None,
            show_in_horizontal: None,
        };
        assert_eq!(Module::from(row).drip_days, None);
    }

    #[test]
    fn test_user_row_round_trip() {
        let row = user::Model {
            phone: "123".to_string(),
            name: Some("Ana".to_string()),
            active: false,
            created_at: Utc::now(),
            last_login: None,
        };
        let model = User::from(row.clone());
        let active = user::ActiveModel::from(&model);
        assert_eq!(active.phone.unwrap(), row.phone);
        assert!(!active.active.unwrap());
    }
}

//! Entity module - Contains all SeaORM entity definitions for the relational backend.
//! These entities represent the database tables and their relationships.
//! Column names are the snake_case wire names; `storage::mapping` translates
//! them to the camelCase snapshot model.

pub mod announcement;
pub mod enums;
pub mod media;
pub mod module;
pub mod progress;
pub mod settings;
pub mod user;

// Re-export specific types to avoid conflicts
pub use announcement::{
    Column as AnnouncementColumn, Entity as Announcement, Model as AnnouncementModel,
};
pub use enums::{Category, FontFamily, MediaType, ModuleTheme, TitleAlignment};
pub use media::{Column as MediaColumn, Entity as Media, Model as MediaModel};
pub use module::{Column as ModuleColumn, Entity as Module, Model as ModuleModel};
pub use progress::{Column as ProgressColumn, Entity as Progress, Model as ProgressModel};
pub use settings::{Column as SettingsColumn, Entity as Settings, Model as SettingsModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};

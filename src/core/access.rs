//! Access policy - which modules a student can see and open right now.
//!
//! Everything here is a pure function of its inputs. The clock is always
//! passed in as `now`, never read.
//!
//! A module is visible when it is active and, outside admin preview, its drip
//! delay has elapsed: `now >= user.created_at + drip_days days`.

use crate::{
    errors::{Error, Result},
    models::{AppSnapshot, Media, Module, User},
};
use chrono::{DateTime, Days, Utc};

/// The two module lists of the student home screen, each sorted by `order`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleModules {
    /// Main list
    pub vertical: Vec<Module>,
    /// Carousel list
    pub horizontal: Vec<Module>,
}

/// First instant `module` opens for `user`. `None` if the delay runs past
/// the end of the calendar, which means never.
#[must_use]
pub fn unlock_at(module: &Module, user: &User) -> Option<DateTime<Utc>> {
    user.created_at
        .checked_add_days(Days::new(u64::from(module.drip_days())))
}

/// Whether the drip delay of `module` has elapsed for `user` at `now`.
#[must_use]
pub fn is_unlocked(module: &Module, user: &User, now: DateTime<Utc>) -> bool {
    unlock_at(module, user).is_some_and(|at| now >= at)
}

/// Whether `user` may open `module` at `now`. Preview skips the drip check
/// but never shows an inactive module.
#[must_use]
pub fn can_open_module(module: &Module, user: &User, now: DateTime<Utc>, preview: bool) -> bool {
    module.active && (preview || is_unlocked(module, user, now))
}

/// Splits the modules `user` can open at `now` into the vertical and
/// horizontal lists. A module lands in each list its flags ask for, so it
/// may appear in both or neither.
#[must_use]
pub fn visible_modules(
    modules: &[Module],
    user: &User,
    now: DateTime<Utc>,
    preview: bool,
) -> VisibleModules {
    let mut visible = VisibleModules::default();
    for module in modules
        .iter()
        .filter(|m| can_open_module(m, user, now, preview))
    {
        if module.shows_in_vertical() {
            visible.vertical.push(module.clone());
        }
        if module.shows_in_horizontal() {
            visible.horizontal.push(module.clone());
        }
    }
    visible.vertical.sort_by_key(|m| m.order);
    visible.horizontal.sort_by_key(|m| m.order);
    visible
}

/// Media of `module_id` in stored order.
#[must_use]
pub fn visible_media<'a>(snapshot: &'a AppSnapshot, module_id: &str) -> Vec<&'a Media> {
    snapshot
        .media
        .iter()
        .filter(|m| m.module_id == module_id)
        .collect()
}

/// A module opened by a student, with its media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContents<'a> {
    /// The opened module
    pub module: &'a Module,
    /// Its media in stored order
    pub media: Vec<&'a Media>,
}

/// Opens `module_id` for `user`.
///
/// # Errors
/// - [`Error::NotFound`] if the module does not exist or is inactive
/// - [`Error::ModuleLocked`] if its drip delay has not elapsed (never in preview)
pub fn module_contents<'a>(
    snapshot: &'a AppSnapshot,
    module_id: &str,
    user: &User,
    now: DateTime<Utc>,
    preview: bool,
) -> Result<ModuleContents<'a>> {
    let module = snapshot
        .module(module_id)
        .filter(|m| m.active)
        .ok_or_else(|| Error::not_found("module", module_id))?;

    if !preview && !is_unlocked(module, user, now) {
        return Err(Error::ModuleLocked {
            id: module.id.clone(),
            unlocks_at: unlock_at(module, user).unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    Ok(ModuleContents {
        module,
        media: visible_media(snapshot, module_id),
    })
}

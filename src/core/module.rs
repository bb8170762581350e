//! Module business logic - creating, editing, ordering, and deleting course units.
//!
//! Deleting a module removes its media in the same storage operation, and
//! reordering always leaves `order` as the dense sequence `1..=N`.

use crate::{
    entities::Category,
    errors::{Error, Result},
    models::Module,
    storage::{Change, StorageAdapter},
};
use tracing::{info, instrument, warn};

/// Input for [`add_module`]; the id and order are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewModule {
    /// Non-blank title
    pub title: String,
    /// Content category
    pub category: Category,
    /// Visible to students
    pub active: bool,
    /// Emoji or icon name
    pub icon: Option<String>,
    /// Short blurb
    pub description: Option<String>,
    /// Banner image as a data URL
    pub banner: Option<String>,
    /// Days after signup before it opens, at most [`MAX_DRIP_DAYS`]
    pub drip_days: u32,
    /// Listed in the vertical list
    pub show_in_vertical: bool,
    /// Listed in the horizontal list
    pub show_in_horizontal: bool,
}

impl NewModule {
    /// An active, immediately unlocked module shown in the vertical list only.
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            category,
            active: true,
            icon: None,
            description: None,
            banner: None,
            drip_days: 0,
            show_in_vertical: true,
            show_in_horizontal: false,
        }
    }
}

/// Where [`reorder_module`] should move a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorder {
    /// One position earlier
    Up,
    /// One position later
    Down,
    /// To this zero-based position, clamped to the list
    To(usize),
}

/// Size label stored alongside a banner, in KiB with one decimal (`"12.3 KB"`).
#[must_use]
#[allow(clippy::cast_precision_loss)] // Banner sizes are far below 2^52 bytes
pub fn banner_size_label(banner: &str) -> String {
    format!("{:.1} KB", banner.len() as f64 / 1024.0)
}

/// Recomputes `banner_size` from `banner`, clearing both when the banner is blank.
fn annotate_banner(module: &mut Module) {
    module.banner = module.banner.take().filter(|b| !b.trim().is_empty());
    module.banner_size = module.banner.as_deref().map(banner_size_label);
}

/// Longest drip delay a module may carry; the relational `drip_days` column is 32-bit signed.
pub const MAX_DRIP_DAYS: u32 = i32::MAX.unsigned_abs();

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation {
            message: "Module title cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Rejects a drip delay above [`MAX_DRIP_DAYS`].
///
/// # Errors
/// Returns [`Error::Validation`] naming the module.
pub fn validate_drip_days(module_id: &str, drip_days: Option<u32>) -> Result<()> {
    match drip_days {
        Some(days) if days > MAX_DRIP_DAYS => Err(Error::Validation {
            message: format!("module {module_id}: drip delay {days} exceeds {MAX_DRIP_DAYS} days"),
        }),
        _ => Ok(()),
    }
}

/// All modules sorted by `order`.
pub async fn list_modules<S>(store: &S) -> Result<Vec<Module>>
where
    S: StorageAdapter + ?Sized,
{
    Ok(store.load().await?.modules)
}

/// Creates a module at the end of the list.
#[instrument(skip(store, new), fields(title = %new.title))]
pub async fn add_module<S>(store: &S, new: NewModule) -> Result<Module>
where
    S: StorageAdapter + ?Sized,
{
    validate_title(&new.title)?;
    validate_drip_days(&new.title, Some(new.drip_days))?;
    let snapshot = store.load().await?;
    let order = snapshot.modules.iter().map(|m| m.order).max().unwrap_or(0) + 1;

    let mut module = Module {
        id: uuid::Uuid::new_v4().to_string(),
        title: new.title.trim().to_string(),
        category: new.category,
        order,
        active: new.active,
        icon: new.icon,
        description: new.description,
        banner: new.banner,
        banner_size: None,
        drip_days: Some(new.drip_days),
        show_in_vertical: Some(new.show_in_vertical),
        show_in_horizontal: Some(new.show_in_horizontal),
    };
    annotate_banner(&mut module);

    store.apply(&[Change::PutModule(module.clone())]).await?;
    info!("Created module {} at position {}", module.id, module.order);
    Ok(module)
}

/// Replaces every field of an existing module.
///
/// # Errors
/// Returns [`Error::NotFound`] if no module has `module.id`.
#[instrument(skip(store, module), fields(id = %module.id))]
pub async fn update_module<S>(store: &S, mut module: Module) -> Result<Module>
where
    S: StorageAdapter + ?Sized,
{
    validate_title(&module.title)?;
    validate_drip_days(&module.id, module.drip_days)?;
    let snapshot = store.load().await?;
    if snapshot.module(&module.id).is_none() {
        return Err(Error::not_found("module", module.id));
    }

    annotate_banner(&mut module);
    store.apply(&[Change::PutModule(module.clone())]).await?;
    info!("Updated module {}", module.id);
    Ok(module)
}

/// Deletes a module and every media item that belongs to it, as one
/// operation. Returns how many media items went with it.
///
/// # Errors
/// Returns [`Error::NotFound`] if no module has `id`.
#[instrument(skip(store))]
pub async fn remove_module<S>(store: &S, id: &str) -> Result<usize>
where
    S: StorageAdapter + ?Sized,
{
    let snapshot = store.load().await?;
    if snapshot.module(id).is_none() {
        return Err(Error::not_found("module", id));
    }
    let media_count = snapshot.media_for(id).count();

    store
        .apply(&[
            Change::DeleteModuleMedia(id.to_string()),
            Change::DeleteModule(id.to_string()),
        ])
        .await?;
    info!("Removed module {} and {} media items", id, media_count);
    Ok(media_count)
}

/// Moves a module and renumbers every module to `1..=N`.
///
/// Moving past either end leaves the sequence as is (but still renumbered).
/// Returns the modules in their new order.
///
/// # Errors
/// Returns [`Error::NotFound`] if no module has `id`.
#[instrument(skip(store))]
pub async fn reorder_module<S>(store: &S, id: &str, to: Reorder) -> Result<Vec<Module>>
where
    S: StorageAdapter + ?Sized,
{
    let mut modules = store.load().await?.modules;
    let index = modules
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| Error::not_found("module", id))?;

    let last = modules.len() - 1;
    let target = match to {
        Reorder::Up => index.checked_sub(1),
        Reorder::Down => Some(index + 1).filter(|&i| i <= last),
        Reorder::To(position) => Some(position.min(last)),
    };
    match target {
        Some(target) => {
            let module = modules.remove(index);
            modules.insert(target, module);
        }
        None => warn!("Module {} is already at the edge; not moved", id),
    }

    let mut changes = Vec::new();
    for (module, order) in modules.iter_mut().zip(1..) {
        if module.order != order {
            module.order = order;
            changes.push(Change::PutModule(module.clone()));
        }
    }
    if !changes.is_empty() {
        store.apply(&changes).await?;
    }
    info!("Reordered modules ({} renumbered)", changes.len());
    Ok(modules)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn orders(modules: &[Module]) -> Vec<i32> {
        modules.iter().map(|m| m.order).collect()
    }

    #[test]
    fn test_banner_size_label() {
        assert_eq!(banner_size_label(&"x".repeat(2048)), "2.0 KB");
        assert_eq!(banner_size_label(""), "0.0 KB");
    }

    #[tokio::test]
    async fn test_add_module_appends_with_defaults() -> Result<()> {
        let store = setup_empty_store().await?;
        let first = create_test_module(&store, "First").await?;
        let second = create_test_module(&store, "Second").await?;

        assert_eq!(first.order, 1);
        assert_eq!(second.order, 2);
        assert_ne!(first.id, second.id);
        assert!(second.shows_in_vertical());
        assert!(!second.shows_in_horizontal());
        assert_eq!(second.drip_days(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_module_rejects_blank_title() -> Result<()> {
        let store = setup_empty_store().await?;
        let result = add_module(&store, NewModule::new("   ", Category::Games)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_banner_is_annotated() -> Result<()> {
        let store = setup_empty_store().await?;
        let mut new = NewModule::new("Banner", Category::Stories);
        new.banner = Some("data:image/jpeg;base64,".to_string() + &"A".repeat(1000));
        let mut module = add_module(&store, new).await?;
        assert_eq!(module.banner_size.as_deref(), Some("1.0 KB"));

        module.banner = Some(String::new());
        let cleared = update_module(&store, module).await?;
        assert!(cleared.banner.is_none());
        assert!(cleared.banner_size.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_drip_days_beyond_column_range_are_rejected() -> Result<()> {
        let store = setup_empty_store().await?;
        let mut new = NewModule::new("Far future", Category::Songs);
        new.drip_days = MAX_DRIP_DAYS + 1;
        let result = add_module(&store, new).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut module = create_test_module(&store, "Edge").await?;
        module.drip_days = Some(MAX_DRIP_DAYS);
        let stored = update_module(&store, module.clone()).await?;
        assert_eq!(list_modules(&store).await?[0], stored);

        module.drip_days = Some(u32::MAX);
        let result = update_module(&store, module).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(list_modules(&store).await?[0].drip_days, Some(MAX_DRIP_DAYS));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_module_is_not_found() -> Result<()> {
        let store = setup_empty_store().await?;
        let result = update_module(&store, module_fixture("ghost", 1)).await;
        assert!(result.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_module_cascades_to_media() -> Result<()> {
        let store = setup_empty_store().await?;
        let doomed = create_test_module(&store, "Doomed").await?;
        let kept = create_test_module(&store, "Kept").await?;
        create_test_media(&store, &doomed.id, "a").await?;
        create_test_media(&store, &doomed.id, "b").await?;
        create_test_media(&store, &kept.id, "c").await?;

        let removed = remove_module(&store, &doomed.id).await?;

        assert_eq!(removed, 2);
        let snapshot = store.load().await?;
        assert!(snapshot.media.iter().all(|m| m.module_id != doomed.id));
        assert_eq!(snapshot.media.len(), 1);
        assert_eq!(snapshot.modules.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_module_cascades_in_local_store() -> Result<()> {
        let (_dir, store) = setup_local_store()?;
        store.save(&crate::models::AppSnapshot::empty()).await?;
        let module = create_test_module(&store, "Doomed").await?;
        create_test_media(&store, &module.id, "a").await?;

        remove_module(&store, &module.id).await?;

        assert!(store.load().await?.media.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_keeps_orders_dense() -> Result<()> {
        let store = setup_empty_store().await?;
        let a = create_test_module(&store, "A").await?;
        let b = create_test_module(&store, "B").await?;
        let c = create_test_module(&store, "C").await?;
        // Leave a gap behind
        remove_module(&store, &b.id).await?;
        let d = create_test_module(&store, "D").await?;
        assert_eq!(orders(&list_modules(&store).await?), vec![1, 3, 4]);

        let moved = reorder_module(&store, &d.id, Reorder::Up).await?;
        assert_eq!(orders(&moved), vec![1, 2, 3]);
        let ids: Vec<&str> = moved.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), d.id.as_str(), c.id.as_str()]);

        reorder_module(&store, &a.id, Reorder::To(10)).await?;
        reorder_module(&store, &c.id, Reorder::Down).await?;
        reorder_module(&store, &c.id, Reorder::Up).await?;

        let stored = list_modules(&store).await?;
        assert_eq!(orders(&stored), vec![1, 2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_at_edge_does_not_move() -> Result<()> {
        let store = setup_empty_store().await?;
        let first = create_test_module(&store, "First").await?;
        create_test_module(&store, "Second").await?;

        let modules = reorder_module(&store, &first.id, Reorder::Up).await?;
        assert_eq!(modules[0].id, first.id);

        let missing = reorder_module(&store, "ghost", Reorder::Down).await;
        assert!(missing.unwrap_err().is_not_found());
        Ok(())
    }
}

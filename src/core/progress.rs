//! Progress tracking - which media a student has finished in each module.
//!
//! Completion sets are kept per (student, module) in a [`ProgressStore`],
//! outside the snapshot. They are never exported or imported.

use crate::{
    errors::Result,
    models::Media,
    storage::{ProgressKey, ProgressStore},
};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Media ids `user_phone` has completed in `module_id`.
pub async fn completed_media<P>(store: &P, user_phone: &str, module_id: &str) -> Result<BTreeSet<String>>
where
    P: ProgressStore + ?Sized,
{
    store.completed(&ProgressKey::new(user_phone, module_id)).await
}

/// Marks `media_id` complete if it was not, incomplete if it was. Returns
/// the updated set.
#[instrument(skip(store))]
pub async fn toggle_complete<P>(
    store: &P,
    user_phone: &str,
    module_id: &str,
    media_id: &str,
) -> Result<BTreeSet<String>>
where
    P: ProgressStore + ?Sized,
{
    let key = ProgressKey::new(user_phone, module_id);
    let mut completed = store.completed(&key).await?;
    if !completed.remove(media_id) {
        completed.insert(media_id.to_string());
    }
    store.set_completed(&key, &completed).await?;
    debug!("{} of module {} now complete", completed.len(), module_id);
    Ok(completed)
}

/// Fraction (0.0 to 1.0) of `media` found in `completed`. Ids in `completed`
/// that no longer belong to the module are ignored; no media means 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_percentage<'a>(
    completed: &BTreeSet<String>,
    media: impl IntoIterator<Item = &'a Media>,
) -> f64 {
    let (total, done) = media.into_iter().fold((0_usize, 0_usize), |(total, done), m| {
        (total + 1, done + usize::from(completed.contains(&m.id)))
    });
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::seed_snapshot, test_utils::*};

    #[test]
    fn test_completion_percentage() {
        let mut snapshot = seed_snapshot(jan_first());
        let mut second = snapshot.media[0].clone();
        second.id = "m2".to_string();
        snapshot.media.push(second);

        let none = BTreeSet::new();
        assert!(completion_percentage(&none, snapshot.media_for("1")).abs() < f64::EPSILON);

        let half: BTreeSet<String> = ["m1".to_string(), "gone".to_string()].into();
        assert!((completion_percentage(&half, snapshot.media_for("1")) - 0.5).abs() < f64::EPSILON);

        assert!(completion_percentage(&half, snapshot.media_for("empty")).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_toggle_complete_round_trip() -> Result<()> {
        let store = setup_relational_store().await?;

        let after_first = toggle_complete(&store, "111", "1", "m1").await?;
        assert!(after_first.contains("m1"));

        let after_second = toggle_complete(&store, "111", "1", "m1").await?;
        assert!(after_second.is_empty());
        assert!(completed_media(&store, "111", "1").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_progress_is_per_student() -> Result<()> {
        let (_dir, store) = setup_local_store()?;

        toggle_complete(&store, "111", "1", "m1").await?;

        assert!(completed_media(&store, "222", "1").await?.is_empty());
        assert_eq!(completed_media(&store, "111", "1").await?.len(), 1);
        Ok(())
    }
}

//! Settings business logic.

use crate::{
    errors::Result,
    models::Settings,
    storage::{Change, StorageAdapter},
};
use tracing::{info, instrument};

/// Current settings.
pub async fn get_settings<S>(store: &S) -> Result<Settings>
where
    S: StorageAdapter + ?Sized,
{
    Ok(store.load().await?.settings)
}

/// Replaces the settings record with `settings`. No field-level merge.
#[instrument(skip(store, settings))]
pub async fn update_settings<S>(store: &S, settings: Settings) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    store.apply(&[Change::PutSettings(settings)]).await?;
    info!("Settings updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::FontFamily, test_utils::*};

    #[tokio::test]
    async fn test_update_settings_replaces_record() -> Result<()> {
        let store = setup_empty_store().await?;
        let mut settings = get_settings(&store).await?;
        settings.app_name = "Little Readers".to_string();
        settings.font_family = FontFamily::Fredoka;
        settings.logo_url = None;

        update_settings(&store, settings.clone()).await?;

        assert_eq!(get_settings(&store).await?, settings);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_settings_in_local_store() -> Result<()> {
        let (_dir, store) = setup_local_store()?;
        let mut settings = get_settings(&store).await?;
        settings.maintenance_mode = true;

        update_settings(&store, settings).await?;

        assert!(get_settings(&store).await?.maintenance_mode);
        Ok(())
    }
}

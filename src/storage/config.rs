use safarivideos_core::fs_paths::AppPaths;

use crate::models::settings::AppSettings;

/// Missing or unreadable settings fall back to defaults.
pub async fn load_settings(paths: &dyn AppPaths) -> AppSettings {
    let path = paths.settings_file();
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(t) => t,
        Err(_) => return AppSettings::default(),
    };

    match serde_json::from_str::<AppSettings>(&text) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring invalid settings {}: {}", path.display(), e);
            AppSettings::default()
        }
    }
}

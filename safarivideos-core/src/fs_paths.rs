use std::path::PathBuf;

pub const CONFIG_DIR_ENV: &str = "SAFARIVIDEOS_CONFIG_DIR";
pub const CREDENTIALS_FILE_NAME: &str = ".safaribooks";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub trait AppPaths: Send + Sync {
    fn config_dir(&self) -> PathBuf;
    fn home_dir(&self) -> Option<PathBuf>;

    fn settings_file(&self) -> PathBuf {
        self.config_dir().join(SETTINGS_FILE_NAME)
    }

    fn credentials_file(&self) -> Option<PathBuf> {
        self.home_dir().map(|h| h.join(CREDENTIALS_FILE_NAME))
    }
}

pub struct DesktopPaths;

impl AppPaths for DesktopPaths {
    fn config_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|d| d.join("safarivideos"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

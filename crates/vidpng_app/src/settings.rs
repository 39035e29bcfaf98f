use std::fs;
use std::path::{Path, PathBuf};

use client_logging::{client_info, client_warn};
use serde::{Deserialize, Serialize};
use vidpng_engine::AtomicFileWriter;

const SETTINGS_FILENAME: &str = "vidpng_settings.ron";

/// Client configuration persisted between runs. Task state is deliberately
/// not part of this: every run starts with an empty file set and an idle
/// task model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub service_url: String,
    pub download_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        let download_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("downloads");
        Self {
            service_url: "http://127.0.0.1:8000".to_string(),
            download_dir,
        }
    }
}

impl ClientSettings {
    /// Loads settings from the working directory. A missing file yields the
    /// defaults and writes them out so there is something to edit; an
    /// unreadable or unparseable file falls back to defaults with a warning.
    pub fn load() -> Self {
        Self::load_from(Path::new("."))
    }

    fn load_from(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.save_to(dir);
                return settings;
            }
            Err(err) => {
                client_warn!("Failed to read settings from {:?}: {}", path, err);
                return Self::default();
            }
        };

        let settings: ClientSettings = match ron::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                client_warn!("Failed to parse settings from {:?}: {}", path, err);
                return Self::default();
            }
        };
        settings
    }

    fn save_to(&self, dir: &Path) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(self, pretty) {
            Ok(text) => text,
            Err(err) => {
                client_warn!("Failed to serialize settings: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(dir.to_path_buf());
        match writer.write(SETTINGS_FILENAME, content.as_bytes()) {
            Ok(path) => client_info!("Settings written to {:?}", path),
            Err(err) => client_warn!("Failed to write settings: {}", err),
        }
    }
}

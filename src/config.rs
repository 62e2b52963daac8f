//! Viewer configuration.
//!
//! An optional `showroom.json` next to the working directory overrides the
//! built-in defaults. A missing file is normal; a malformed one is reported
//! and the defaults win.

use std::path::Path;

pub const CONFIG_FILE: &str = "showroom.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub model_path: String,
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub exposure: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: "assets/showroom.glb".to_string(),
            window_title: "Showroom".to_string(),
            window_width: 1280,
            window_height: 720,
            exposure: 1.0,
        }
    }
}

pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    let config: ViewerConfig = serde_json::from_str(&json)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults. Parse errors
/// are logged, not fatal.
pub fn load_or_default(path: &Path) -> ViewerConfig {
    if !path.exists() {
        return ViewerConfig::default();
    }
    match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring unreadable {}: {}", path.display(), err);
            ViewerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, load_or_default, ViewerConfig};
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("showroom_{}_{}_{}.json", tag, std::process::id(), nonce));
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_or_default(&temp_path("missing"));
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn roundtrip_via_file() {
        let config = ViewerConfig {
            model_path: "models/floor3.glb".to_string(),
            window_title: "Floor 3".to_string(),
            window_width: 1920,
            window_height: 1080,
            exposure: 0.8,
        };
        let path = temp_path("roundtrip");
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{ "model_path": "a.glb" }"#).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.model_path, "a.glb");
        assert_eq!(loaded.window_width, ViewerConfig::default().window_width);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_falls_back() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config(&path).is_err());
        assert_eq!(load_or_default(&path), ViewerConfig::default());
        let _ = std::fs::remove_file(path);
    }
}

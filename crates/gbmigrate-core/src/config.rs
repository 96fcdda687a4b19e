use config::{Config, ConfigError, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 2] = [".cpp", ".h"];
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Which codec the converter decodes legacy files with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    /// Always decode strictly as GB2312, whatever label the classifier reported.
    #[default]
    Gb2312,
    /// Decode under the label the classifier reported (GBK, GB2312, ...).
    Detected,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub storage_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8888)),
            storage_dir: PathBuf::from("./download"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_paths: Vec<String>,
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub confidence_threshold: f32,
    pub source_encoding: SourceEncoding,
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_patterns: Vec::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            source_encoding: SourceEncoding::default(),
            server: ServerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Extensions with a guaranteed leading dot, empty entries dropped.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(|e| {
                if e.starts_with('.') {
                    e.to_string()
                } else {
                    format!(".{}", e)
                }
            })
            .collect()
    }
}

/// Load `Config.toml` from the working directory if present.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load an explicitly named configuration file, which must exist.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);

        if result.iter().any(|kept| dir_path.starts_with(Path::new(kept))) {
            continue;
        }

        result.retain(|kept| !Path::new(kept).starts_with(dir_path));
        result.push(dir);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = AppConfig::default();
        assert_eq!(config.extensions, vec![".cpp".to_string(), ".h".to_string()]);
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.source_encoding, SourceEncoding::Gb2312);
        assert_eq!(config.server.bind_addr.port(), 8888);
    }

    #[test]
    fn test_normalized_extensions_adds_dot() {
        let config = AppConfig {
            extensions: vec!["cpp".into(), ".h".into(), " ".into()],
            ..AppConfig::default()
        };
        assert_eq!(config.normalized_extensions(), vec![".cpp", ".h"]);
    }

    #[test]
    fn test_load_configuration_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gbmigrate.toml");
        fs::write(
            &path,
            r#"
root_paths = ["/src/project"]
extensions = [".c", ".hpp"]
confidence_threshold = 0.9
source_encoding = "detected"

[server]
storage_dir = "/srv/files"
"#,
        )
        .unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert_eq!(config.root_paths, vec!["/src/project".to_string()]);
        assert_eq!(config.extensions, vec![".c".to_string(), ".hpp".to_string()]);
        assert_eq!(config.confidence_threshold, 0.9);
        assert_eq!(config.source_encoding, SourceEncoding::Detected);
        assert_eq!(config.server.storage_dir, PathBuf::from("/srv/files"));
        // untouched keys fall back to defaults
        assert_eq!(config.server.bind_addr.port(), 8888);
        assert!(config.ignore_patterns.is_empty());
    }

    #[test]
    fn test_non_overlapping_no_overlap() {
        let dirs = vec![
            "/home/user/photos".to_string(),
            "/home/user/docs".to_string(),
            "/var/data".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_non_overlapping_with_subdirectory() {
        let dirs = vec![
            "/home/user/docs".to_string(),
            "/home/user".to_string(),
            "/var/data".to_string(),
            "/var/data/nested".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 2);
        assert!(result.contains(&"/home/user".to_string()));
        assert!(result.contains(&"/var/data".to_string()));
    }
}

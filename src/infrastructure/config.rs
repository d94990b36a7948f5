use crate::domain::config::QuadbotConfig;
use crate::domain::error::{QuadbotError, QuadbotResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_DIR: &str = ".quadbot";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> QuadbotResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Manager rooted at explicit paths
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration: defaults, then the global file, then the project
    /// file, whose link section takes precedence
    pub fn load_config(&self) -> QuadbotResult<QuadbotConfig> {
        let mut config = QuadbotConfig::default();

        if self.global_config_path.exists() {
            debug!("Loading global config {}", self.global_config_path.display());
            config = self.load_config_from_path(&self.global_config_path)?;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                debug!("Loading project config {}", project_path.display());
                let project_config = self.load_config_from_path(project_path)?;
                config.link = project_config.link;
            }
        }

        Ok(config)
    }

    /// Save configuration to the global file
    pub fn save_config(&self, config: &QuadbotConfig) -> QuadbotResult<()> {
        if let Some(parent) = self.global_config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                QuadbotError::config(format!("Failed to create config directory: {}", e))
            })?;
        }

        self.save_config_to_path(&self.global_config_path, config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> QuadbotResult<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| QuadbotError::config("Could not determine home directory"))?;

        Ok(home.join(".config").join("quadbot").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up from `start`
    pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> QuadbotResult<QuadbotConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            QuadbotError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            QuadbotError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &QuadbotConfig) -> QuadbotResult<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| QuadbotError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            QuadbotError::config(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Create default project configuration under `path`
    pub fn init_project_config(&self, path: &Path) -> QuadbotResult<PathBuf> {
        let config_dir = path.join(PROJECT_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(QuadbotError::config("Project configuration already exists"));
        }

        fs::create_dir_all(&config_dir).map_err(|e| {
            QuadbotError::config(format!("Failed to create {} directory: {}", PROJECT_DIR, e))
        })?;

        self.save_config_to_path(&config_file, &QuadbotConfig::default())?;

        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}

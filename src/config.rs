use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted for the API key
pub const API_KEY_ENV: &str = "PULSE_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PulseConfig {
    pub database: Option<String>,
    pub api_key: Option<String>,
    pub user_name: Option<String>,
    pub country: Option<String>,
    pub base_url: Option<String>,
}

impl PulseConfig {
    /// First non-empty key from the command line, the environment, then the file
    pub fn resolve_api_key(&self, cli: Option<&str>, env: Option<&str>) -> Option<String> {
        [cli, env, self.api_key.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|k| !k.is_empty())
            .map(str::to_string)
    }

    /// Configured display name, or the profile default
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(crate::profile::DEFAULT_NAME)
    }

    pub fn database_path(&self, base: &Path) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(base))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("pulse.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".pulse").join("pulse.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PulseConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PulseConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PulseConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Load (or start) the config at `path`, apply `change`, write it back
pub fn update_config<F>(path: &Path, change: F) -> anyhow::Result<PulseConfig>
where
    F: FnOnce(&mut PulseConfig),
{
    let mut config = load_config(Some(path))?.unwrap_or_default();
    change(&mut config);
    write_config(path, &config, true)?;
    Ok(config)
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

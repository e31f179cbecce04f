use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use veil_core::{KdfSettings, Preset};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VeilConfig {
    #[serde(default)]
    pub container: ContainerSection,
    #[serde(default)]
    pub kdf: KdfSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContainerSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KdfSection {
    pub preset: Option<Preset>,
    pub opslimit: Option<u32>,
    pub memlimit: Option<u32>,
}

impl VeilConfig {
    pub fn new(container_path: &Path, preset: Option<Preset>) -> Self {
        Self {
            container: ContainerSection {
                path: Some(container_path.to_string_lossy().to_string()),
            },
            kdf: KdfSection {
                preset,
                ..KdfSection::default()
            },
        }
    }
}

/// Resolve key derivation settings.
///
/// Precedence: explicit flags, then the config file, then the moderate preset.
/// `opslimit` and `memlimit` override individual fields of whichever preset
/// is chosen.
pub fn resolve_kdf_settings(
    preset: Option<Preset>,
    opslimit: Option<u32>,
    memlimit: Option<u32>,
    config: &KdfSection,
) -> KdfSettings {
    let base = preset.or(config.preset).unwrap_or_default().settings();
    KdfSettings::new(
        opslimit.or(config.opslimit).unwrap_or(base.opslimit),
        memlimit.or(config.memlimit).unwrap_or(base.memlimit),
    )
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_container_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(crate::constants::DEFAULT_CONTAINER_NAME))
}

/// Read the config at `path`, or the defaults if there is no file.
pub fn load_config(path: &Path) -> anyhow::Result<VeilConfig> {
    if !path.exists() {
        return Ok(VeilConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<VeilConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &VeilConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("veil"));
        }
    }
    Ok(home_dir()?.join(".config").join("veil"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("veil"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("veil"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

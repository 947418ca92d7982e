//! src/config.rs
//! ============================================================================
//! # Config: behavior-layer configuration loader and saver
//!
//! Only the upload size limit is a real behavior knob. The timing constants
//! (debounce delay, toast lifetime, minimum query length, ...) are fixed and
//! exported as `pub const` so every component reads the same values.
//!
//! The config file is TOML, found through `directories::ProjectDirs` unless
//! an explicit path is given.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load_from(Some(Path::new("crewdeck.toml"))).await?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use compact_str::CompactString;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

/// Quiet period before a search input submits its form.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// How long a toast stays in the queue unless dismissed.
pub const TOAST_DISPLAY: Duration = Duration::from_millis(5000);

/// Shortest non-empty query that triggers an automatic submission.
pub const MIN_QUERY_LEN: usize = 3;

/// Server-rendered dismissible alerts close after this long.
pub const ALERT_AUTO_HIDE: Duration = Duration::from_millis(5000);

/// A submit button in "processing" state is restored after this long.
pub const SUBMIT_REENABLE: Duration = Duration::from_millis(10_000);

/// A copy button shows its "copied" look for this long.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);

/// Default upload limit in MB.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Title shown in every toast header
    pub brand: CompactString,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            brand: CompactString::const_new("Maricheck"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest accepted file, in MB (1 MB = 1024 * 1024 bytes)
    pub max_size_mb: u64,

    /// Lower-case file extensions accepted by `validate_file_type`
    pub allowed_extensions: Vec<CompactString>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_UPLOAD_MB,
            allowed_extensions: ["pdf", "jpg", "jpeg", "png", "doc", "docx"]
                .into_iter()
                .map(CompactString::const_new)
                .collect(),
        }
    }
}

impl UploadConfig {
    /// Limit in bytes. Saturates for absurd `max_size_mb` values read from
    /// the config file.
    #[inline]
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Path prefix of the export endpoints, e.g. `/admin` → `/admin/crew/export`
    pub base_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_path: "/admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `crewdeck_core=debug`
    pub level: CompactString,

    /// Directory for the daily rolling log file; `None` disables file logging
    pub directory: Option<PathBuf>,

    pub file_prefix: CompactString,

    /// Mirror events to stderr
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompactString::const_new("info"),
            directory: Some(PathBuf::from("logs")),
            file_prefix: CompactString::const_new("crewdeck"),
            stderr: true,
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads config from the default location, creating it with defaults
    /// when missing.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::read(&path).await
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    /// Loads config from an explicit path (defaults when the file is absent),
    /// or from the default location when `path` is `None`.
    pub async fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) if path.exists() => Self::read(path).await,
            Some(path) => {
                info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Self::load().await,
        }
    }

    async fn read(path: &Path) -> anyhow::Result<Self> {
        info!("Loading config from {}", path.display());
        let text = TokioFs::read_to_string(path).await?;
        let cfg: Self = toml::from_str(&text)?;
        Ok(cfg)
    }

    /// Saves config as TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "crewdeck", "Crewdeck")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

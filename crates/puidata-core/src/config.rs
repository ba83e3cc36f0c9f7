use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default MTA Bus Time SIRI vehicle monitoring endpoint.
pub const DEFAULT_BUS_API_URL: &str = "http://bustime.mta.info/api/siri/vehicle-monitoring.json";

/// Where cached files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Environment variable holding the cache root.
    pub env_var: String,
    /// Cache root used when the environment variable is unset.
    pub default_dir: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            env_var: "PUIDATA".to_string(),
            default_dir: PathBuf::from("./"),
        }
    }
}

impl CacheSettings {
    /// Reads the environment now. Callers resolve once per descriptor, so a
    /// later change to the variable does not move an existing descriptor.
    pub fn resolve_root(&self) -> PathBuf {
        std::env::var_os(&self.env_var)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_dir.clone())
    }
}

/// HTTP request options for remote sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// User-Agent header; some open-data portals reject libcurl's default.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Maximum redirects followed per request.
    pub max_redirections: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: Some("Mozilla/5.0".to_string()),
            max_redirections: 10,
        }
    }
}

/// Bus tracking endpoint and credential lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusSettings {
    pub api_url: String,
    /// Environment variable consulted when no API key is passed on the command line.
    pub api_key_env_var: String,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BUS_API_URL.to_string(),
            api_key_env_var: "MTAKEY".to_string(),
        }
    }
}

/// Log destination and verbosity. `RUST_LOG` still wins over `filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directives, e.g. `warn,puidata_core=info`.
    #[serde(default)]
    pub filter: Option<String>,
    /// Log file; defaults to `puidata.log` under the XDG state dir.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Global configuration loaded from `~/.config/puidata/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuidataConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub bus: BusSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("puidata")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PuidataConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PuidataConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PuidataConfig = toml::from_str(&data)?;
    Ok(cfg)
}

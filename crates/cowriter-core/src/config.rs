use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CowriterConfig {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Quiet window after the last keystroke before a suggestion is requested.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long a fetch must be in flight before the loading indicator shows.
    #[serde(default = "default_loading_delay_ms")]
    pub loading_indicator_delay_ms: u64,
}

/// Which completion source backs the suggestion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderBackend {
    Mock,
    Openai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_backend")]
    pub backend: ProviderBackend,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Completion stop sequence; the upstream cuts generation here.
    #[serde(default = "default_stop")]
    pub stop: String,

    #[serde(default = "default_best_of")]
    pub best_of: u32,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed by CORS. "*" mirrors whatever origin the request
    /// carries, since credentialed responses may not use a literal wildcard.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_debounce_ms() -> u64 {
    750
}
fn default_loading_delay_ms() -> u64 {
    500
}
fn default_backend() -> ProviderBackend {
    ProviderBackend::Mock
}
fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "davinci".to_string()
}
fn default_max_tokens() -> u32 {
    256
}
fn default_temperature() -> f64 {
    0.7
}
fn default_stop() -> String {
    ".".to_string()
}
fn default_best_of() -> u32 {
    3
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8787
}
fn default_allowed_origin() -> String {
    "*".to_string()
}

impl Default for CowriterConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            loading_indicator_delay_ms: default_loading_delay_ms(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            stop: default_stop(),
            best_of: default_best_of(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl CowriterConfig {
    /// Load config from ~/.config/cowriter/config.toml, creating defaults if
    /// missing, then apply environment overrides.
    pub fn load() -> crate::error::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                crate::error::CowriterError::Config(format!("Failed to read config: {e}"))
            })?;
            toml::from_str::<CowriterConfig>(&contents).map_err(|e| {
                crate::error::CowriterError::Config(format!("Failed to parse config: {e}"))
            })?
        } else {
            let config = CowriterConfig::default();
            config.save()?;
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::CowriterError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the config file path. `COWRITER_CONFIG` overrides the default
    /// location when set to a non-empty path.
    pub fn config_path() -> crate::error::Result<PathBuf> {
        if let Ok(path) = std::env::var("COWRITER_CONFIG") {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::CowriterError::Config("Could not determine config directory".into())
        })?;
        Ok(config_dir.join("cowriter").join("config.toml"))
    }

    /// `COWRITER_BACKEND` (mock|openai) and `COWRITER_ALLOWED_ORIGIN` take
    /// precedence over the config file. Unrecognized backend names are
    /// ignored and the file value stands.
    fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("COWRITER_BACKEND") {
            match backend.trim().to_lowercase().as_str() {
                "mock" => self.provider.backend = ProviderBackend::Mock,
                "openai" => self.provider.backend = ProviderBackend::Openai,
                _ => {}
            }
        }
        if let Ok(origin) = std::env::var("COWRITER_ALLOWED_ORIGIN") {
            if !origin.trim().is_empty() {
                self.server.allowed_origin = origin;
            }
        }
    }
}

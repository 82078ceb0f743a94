//! Configuration management
//!
//! Configuration is resolved in the following priority order:
//! 1. Environment variables
//! 2. `aegis.toml` configuration file
//! 3. Default values
//!
//! Inside the configuration file, `${VAR_NAME}` expands to the value of
//! the named environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Upstream live-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// API key for the live streaming service
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Voice preset for synthesized speech
    #[serde(default = "default_voice")]
    pub voice: String,

    /// WebSocket endpoint override (for testing or custom deployments)
    pub endpoint: Option<String>,

    /// Client microphone sample rate in Hz
    #[serde(default = "default_input_sample_rate")]
    pub input_sample_rate_hz: u32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            voice: default_voice(),
            endpoint: None,
            input_sample_rate_hz: default_input_sample_rate(),
        }
    }
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins (e.g., ["https://example.com"])
    /// If unset, any origin is allowed. Tighten in production.
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: None,
        }
    }
}

/// Main configuration for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream live-session configuration
    #[serde(default)]
    pub live: LiveConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_model() -> String {
    "gemini-2.5-flash-native-audio-preview-12-2025".to_string()
}

fn default_voice() -> String {
    "Aoede".to_string()
}

fn default_input_sample_rate() -> u32 {
    16_000
}

fn default_port() -> u16 {
    8080
}

/// Shadow structs for the TOML file, where every field is optional.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    live: Option<TomlLive>,
    server: Option<TomlServer>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlLive {
    api_key: Option<String>,
    model: Option<String>,
    voice: Option<String>,
    endpoint: Option<String>,
    input_sample_rate_hz: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlServer {
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Expand `${VAR_NAME}` references to environment variable values.
    ///
    /// Unset variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` references in the file are expanded before parsing,
    /// and environment variables override the parsed values afterwards.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Parse configuration from a TOML string (no env overrides).
    fn from_toml_str(toml_content: &str) -> crate::Result<Self> {
        let expanded_content = Self::expand_env_vars(toml_content);

        let config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(config))
    }

    /// Load configuration from the default locations.
    ///
    /// Looks for `./aegis.toml`; if the file does not exist, falls back to
    /// environment variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("aegis.toml").exists() {
            return Self::from_toml_file("aegis.toml");
        }

        Self::from_env()
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let live = toml.live.unwrap_or_default();
        let live_config = LiveConfig {
            api_key: live.api_key.unwrap_or_default(),
            model: live.model.unwrap_or_else(default_model),
            voice: live.voice.unwrap_or_else(default_voice),
            endpoint: live.endpoint,
            input_sample_rate_hz: live
                .input_sample_rate_hz
                .unwrap_or_else(default_input_sample_rate),
        };

        let server = toml.server.unwrap_or_default();
        let server_config = ServerConfig {
            port: server.port.unwrap_or_else(default_port),
            allowed_origins: server.allowed_origins,
        };

        Config {
            live: live_config,
            server: server_config,
        }
    }

    /// Override configuration with environment variables.
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            if !api_key.is_empty() {
                self.live.api_key = api_key;
            }
        }

        if let Ok(model) = std::env::var("MODEL") {
            if !model.is_empty() {
                self.live.model = model;
            }
        }

        if let Ok(voice) = std::env::var("VOICE_NAME") {
            if !voice.is_empty() {
                self.live.voice = voice;
            }
        }

        if let Ok(endpoint) = std::env::var("LIVE_ENDPOINT") {
            if !endpoint.is_empty() {
                self.live.endpoint = Some(endpoint);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            if !origins.is_empty() {
                self.server.allowed_origins = Some(
                    origins.split(',').map(|s| s.trim().to_string()).collect(),
                );
            }
        }
    }
}

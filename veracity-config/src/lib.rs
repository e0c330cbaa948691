//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Precedence: `VERACITY_`-prefixed environment variables override values
//! from the config file; `${VAR}` placeholders inside string values are
//! expanded recursively (depth-capped) so API keys can live in the
//! environment while the file stays committable.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct VeracityConfig {
    pub version: Option<String>,
    pub verify: VerifyApiConfig,
    #[serde(default)]
    pub platforms: PlatformsConfig,
}

/// Connection settings for the external fact-checking AI service.
#[derive(Debug, Deserialize)]
pub struct VerifyApiConfig {
    pub api_key: String,
    #[serde(default = "default_verify_endpoint")]
    pub endpoint: String,
    /// Upper bound for one verification round trip. The upstream may be
    /// orchestrating several forensic tools, so this is generous.
    #[serde(default = "default_verify_timeout_secs")]
    pub timeout_secs: u64,
}

/// Optional per-platform extractor credentials. A platform with no entry is
/// simply not extractable; the pipeline falls back to the plain-chat path.
#[derive(Debug, Default, Deserialize)]
pub struct PlatformsConfig {
    #[serde(default)]
    pub tiktok: Option<RapidApiConfig>,
    #[serde(default)]
    pub youtube: Option<YouTubeConfig>,
    #[serde(default)]
    pub instagram: Option<RapidApiConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RapidApiConfig {
    pub api_key: String,
    #[serde(default)]
    pub api_host: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeConfig {
    pub api_key: String,
}

fn default_verify_endpoint() -> String {
    "https://api.verify.example.com/api/v1/".into()
}

fn default_verify_timeout_secs() -> u64 {
    120
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML file + env overrides).
pub struct VeracityConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for VeracityConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VeracityConfigLoader {
    /// Start with sensible defaults: `VERACITY_` env overrides, nothing else.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("VERACITY").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use veracity_config::VeracityConfigLoader;
    ///
    /// let cfg = VeracityConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "1"
    /// verify:
    ///   api_key: "demo"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("1"));
    /// assert_eq!(cfg.verify.timeout_secs, 120);
    /// assert!(cfg.platforms.tiktok.is_none());
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use veracity_config::VeracityConfigLoader;
    ///
    /// unsafe { std::env::set_var("DEMO_VERIFY_KEY", "injected-from-env"); }
    ///
    /// let cfg = VeracityConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// verify:
    ///   api_key: "${DEMO_VERIFY_KEY}"
    /// platforms:
    ///   youtube:
    ///     api_key: "yt-key"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(cfg.verify.api_key, "injected-from-env");
    /// assert_eq!(cfg.platforms.youtube.unwrap().api_key, "yt-key");
    ///
    /// unsafe { std::env::remove_var("DEMO_VERIFY_KEY"); }
    /// ```
    pub fn load(self) -> Result<VeracityConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Merge through serde_json::Value so `${VAR}` placeholders can be
        // expanded before the strongly typed structs are materialised.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: VeracityConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::core::errors::{MetadataError, Result};

/// Environment variable prefix, e.g. `BIBMETA__CAIYUN__TOKEN`
pub const ENV_PREFIX: &str = "BIBMETA";

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Translation backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Identity translator, returns the input unchanged
    None,
    /// translate.googleapis.com with the public consumer key
    Google,
    /// fanyi-api.baidu.com, MD5-signed query strings
    Baidu,
    /// api.interpreter.caiyunai.com, token header
    #[default]
    Caiyun,
    /// tmt.tencentcloudapi.com, TC3-HMAC-SHA256 credentials
    Tencent,
}

impl Provider {
    /// All providers in display order
    pub const ALL: [Provider; 5] = [
        Provider::None,
        Provider::Google,
        Provider::Baidu,
        Provider::Caiyun,
        Provider::Tencent,
    ];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::None => write!(f, "none"),
            Provider::Google => write!(f, "google"),
            Provider::Baidu => write!(f, "baidu"),
            Provider::Caiyun => write!(f, "caiyun"),
            Provider::Tencent => write!(f, "tencent"),
        }
    }
}

impl FromStr for Provider {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "identity" | "empty" => Ok(Provider::None),
            "google" => Ok(Provider::Google),
            "baidu" => Ok(Provider::Baidu),
            "caiyun" => Ok(Provider::Caiyun),
            "tencent" => Ok(Provider::Tencent),
            other => Err(MetadataError::ConfigError {
                message: format!("unknown provider '{}'", other),
            }),
        }
    }
}

/// What the pipeline does when an abstract cannot be translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the entry but omit every translation-derived field
    #[default]
    Skip,
    /// Use the untranslated abstract as the "translation"
    Original,
}

/// Translator selection and call behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSettings {
    /// Backend used for abstracts
    pub provider: Provider,
    /// Delay before each provider request, 0 disables it
    pub rate_delay_ms: u64,
    /// HTTP timeout per request
    pub timeout_ms: u64,
    /// Inputs this long or longer are translated in chunks
    pub max_chunk_chars: usize,
    /// Fallback when a translation fails
    pub on_failure: FailurePolicy,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            rate_delay_ms: 0,
            timeout_ms: 30000,
            max_chunk_chars: 5000,
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Google consumer-key backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Endpoint URL
    pub base_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com/translate_a/single".to_string(),
        }
    }
}

/// Baidu signed-request backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaiduSettings {
    /// Baidu app id
    pub appid: String,
    /// Baidu app secret
    pub appkey: String,
    /// Endpoint URL
    pub base_url: String,
}

impl Default for BaiduSettings {
    fn default() -> Self {
        Self {
            appid: String::new(),
            appkey: String::new(),
            base_url: "http://api.fanyi.baidu.com/api/trans/vip/translate".to_string(),
        }
    }
}

/// Caiyun token-header backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaiyunSettings {
    /// Caiyun API token
    pub token: String,
    /// Endpoint URL
    pub base_url: String,
}

impl Default for CaiyunSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: "http://api.interpreter.caiyunai.com/v1/translator".to_string(),
        }
    }
}

/// Tencent Cloud machine translation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TencentSettings {
    /// Tencent Cloud SecretId
    pub secret_id: String,
    /// Tencent Cloud SecretKey
    pub secret_key: String,
    /// API region, e.g. `ap-shanghai`
    pub region: String,
    /// API host
    pub endpoint: String,
    /// `https`, or `http` for local testing
    pub scheme: String,
}

impl Default for TencentSettings {
    fn default() -> Self {
        Self {
            secret_id: String::new(),
            secret_key: String::new(),
            region: "ap-shanghai".to_string(),
            endpoint: "tmt.tencentcloudapi.com".to_string(),
            scheme: "https".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Translator selection and call behavior
    pub translator: TranslatorSettings,
    /// Google settings
    pub google: GoogleSettings,
    /// Baidu settings
    pub baidu: BaiduSettings,
    /// Caiyun settings
    pub caiyun: CaiyunSettings,
    /// Tencent settings
    pub tencent: TencentSettings,
}

impl AppConfig {
    /// Load configuration: defaults, then `config.toml` if present, then
    /// `BIBMETA__*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE), false)
    }

    /// Load configuration from an explicit file.
    ///
    /// With `required == false` a missing file is not an error.
    pub fn load_from<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        info!(
            "Loaded configuration (provider: {}, file: {})",
            config.translator.provider,
            path.display()
        );
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.translator.timeout_ms == 0 {
            return Err(MetadataError::ConfigError {
                message: "translator.timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.translator.max_chunk_chars == 0 {
            return Err(MetadataError::ConfigError {
                message: "translator.max_chunk_chars must be greater than 0".to_string(),
            });
        }

        let missing = self.missing_credentials(self.translator.provider);
        if !missing.is_empty() {
            warn!(
                "Provider {} is missing credentials: {}",
                self.translator.provider,
                missing.join(", ")
            );
        }

        Ok(())
    }

    /// Credential fields a provider needs, paired with whether they are set
    pub fn credentials_for(&self, provider: Provider) -> Vec<(&'static str, bool)> {
        match provider {
            Provider::None | Provider::Google => vec![],
            Provider::Baidu => vec![
                ("baidu.appid", !self.baidu.appid.is_empty()),
                ("baidu.appkey", !self.baidu.appkey.is_empty()),
            ],
            Provider::Caiyun => vec![("caiyun.token", !self.caiyun.token.is_empty())],
            Provider::Tencent => vec![
                ("tencent.secret_id", !self.tencent.secret_id.is_empty()),
                ("tencent.secret_key", !self.tencent.secret_key.is_empty()),
            ],
        }
    }

    /// Names of required credential fields that are empty
    pub fn missing_credentials(&self, provider: Provider) -> Vec<&'static str> {
        self.credentials_for(provider)
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.translator.max_chunk_chars, 5000);
        assert_eq!(config.translator.on_failure, FailurePolicy::Skip);
        assert_eq!(config.tencent.region, "ap-shanghai");
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = AppConfig::default();
        config.translator.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = AppConfig::default();
        config.baidu.appid = "id".to_string();

        assert_eq!(config.missing_credentials(Provider::Baidu), vec!["baidu.appkey"]);
        assert!(config.missing_credentials(Provider::None).is_empty());
        assert_eq!(
            config.missing_credentials(Provider::Tencent),
            vec!["tencent.secret_id", "tencent.secret_key"]
        );
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Baidu".parse::<Provider>().unwrap(), Provider::Baidu);
        assert_eq!("empty".parse::<Provider>().unwrap(), Provider::None);
        assert!("deepl".parse::<Provider>().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[translator]
provider = "baidu"
rate_delay_ms = 1500
on_failure = "original"

[baidu]
appid = "2015063000000001"
appkey = "12345678"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path(), true).unwrap();
        assert_eq!(config.translator.provider, Provider::Baidu);
        assert_eq!(config.translator.rate_delay_ms, 1500);
        assert_eq!(config.translator.on_failure, FailurePolicy::Original);
        assert_eq!(config.baidu.appid, "2015063000000001");
        // untouched sections keep their defaults
        assert_eq!(config.translator.timeout_ms, 30000);
        assert!(config.baidu.base_url.starts_with("http://api.fanyi.baidu.com"));
    }

    #[test]
    fn test_load_missing_optional_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().join("absent.toml"), false);
        assert!(config.is_ok());
    }

    #[test]
    fn test_load_missing_required_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().join("absent.toml"), true);
        assert!(matches!(config, Err(MetadataError::ConfigError { .. })));
    }
}

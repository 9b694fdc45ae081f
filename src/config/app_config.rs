use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TourError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://apis.data.go.kr/B551011/KorService1";
pub const ENV_SERVICE_KEY: &str = "TOUR_API_KEY";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// data.go.kr 的 Decoding 金鑰；請求時才會檢查是否存在
    pub service_key: Option<String>,
    pub mobile_app: String,
    pub mobile_os: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            service_key: None,
            mobile_app: "TourInfo".to_string(),
            mobile_os: "ETC".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub concurrent_requests: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: 4,
        }
    }
}

fn env_parse<T: FromStr>(key: &str, target: &mut T) -> Result<()>
where
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = std::env::var(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| TourError::InvalidConfigValueError {
                field: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

impl AppConfig {
    /// 有指定設定檔就讀檔，否則只用環境變數
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TourError::IoError)?;
        tracing::debug!("Loaded config file {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: AppConfig =
            toml::from_str(&processed_content).map_err(|e| TourError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        // 未替換成功的 ${VAR} 視為沒有設定
        config.api.service_key = config
            .api
            .service_key
            .filter(|key| !key.trim().is_empty() && !ENV_PLACEHOLDER.is_match(key));
        if config.api.service_key.is_none() {
            config.api.service_key = std::env::var(ENV_SERVICE_KEY).ok().filter(|k| !k.is_empty());
        }

        Ok(config)
    }

    /// 替換環境變數 (例如 ${TOUR_API_KEY})
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn from_env() -> Result<Self> {
        let mut config = AppConfig::default();

        config.api.service_key = std::env::var(ENV_SERVICE_KEY).ok().filter(|k| !k.is_empty());
        env_parse("TOUR_API_BASE_URL", &mut config.api.base_url)?;
        env_parse("TOUR_MOBILE_APP", &mut config.api.mobile_app)?;
        env_parse("TOUR_TIMEOUT_SECONDS", &mut config.api.timeout_seconds)?;
        env_parse("TOUR_RETRY_ATTEMPTS", &mut config.retry.attempts)?;
        env_parse("TOUR_RETRY_BASE_MS", &mut config.retry.base_delay_ms)?;
        env_parse("TOUR_DATA_DIR", &mut config.storage.data_dir)?;

        Ok(config)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_non_empty_string("api.mobile_app", &self.api.mobile_app)?;
        validate_positive_number("api.timeout_seconds", self.api.timeout_seconds as usize, 1)?;
        validate_positive_number("retry.attempts", self.retry.attempts as usize, 1)?;
        validate_path("storage.data_dir", &self.storage.data_dir)?;
        validate_positive_number("stats.concurrent_requests", self.stats.concurrent_requests, 1)?;

        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(TourError::InvalidConfigValueError {
                field: "retry.max_delay_ms".to_string(),
                value: self.retry.max_delay_ms.to_string(),
                reason: "must not be smaller than retry.base_delay_ms".to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn service_key(&self) -> Option<&str> {
        self.api.service_key.as_deref()
    }

    fn mobile_app(&self) -> &str {
        &self.api.mobile_app
    }

    fn mobile_os(&self) -> &str {
        &self.api.mobile_os
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry.attempts
    }

    fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry.base_delay_ms)
    }

    fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry.max_delay_ms)
    }

    fn data_dir(&self) -> &str {
        &self.storage.data_dir
    }

    fn concurrent_requests(&self) -> usize {
        self.stats.concurrent_requests
    }
}

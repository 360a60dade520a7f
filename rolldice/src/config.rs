//! 分层配置
//!
//! 依次叠加 `<root>/default`、`<root>/<ROLLDICE_ENV>` 与 `ROLLDICE__` 前缀的环境变量。

use crate::{domain, errors::ConfigError};
use config::{Config, Environment, File};
use serde::{Deserialize, de::DeserializeOwned};
use std::{collections::HashMap, path::PathBuf, time::Duration};
use validator::Validate;

/// 命名配置
#[derive(Debug, Clone)]
pub struct NamedConfig<T> {
    configs: HashMap<String, T>,
}

impl<T> NamedConfig<T> {
    /// 按名称查找
    pub fn find(&self, name: &str) -> Option<&T> {
        self.configs.get(name)
    }
}

/// 构建配置源
pub fn build_config(crate_dir: PathBuf) -> Result<Config, ConfigError> {
    let config_root = std::env::var("ROLLDICE_CONFIG_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate_dir.join("config"));
    let env = std::env::var("ROLLDICE_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = Config::builder()
        .add_source(File::from(config_root.join("default")).required(false))
        .add_source(File::from(config_root.join(env)).required(false))
        .add_source(
            Environment::with_prefix("ROLLDICE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("kafka.brokers")
                .with_list_parse_key("subscriber.topics")
                .try_parsing(true),
        )
        .build()?;
    Ok(config)
}

/// 加载并校验配置节，缺省时取默认值
pub fn load_section<T>(config: &Config, section: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Validate + Default,
{
    let cfg = match config.get::<T>(section) {
        Ok(c) => c,
        Err(config::ConfigError::NotFound(_)) => T::default(),
        Err(e) => return Err(e.into()),
    };
    cfg.validate().map_err(|e| ConfigError::ValidationError {
        section: section.to_string(),
        key: String::new(),
        message: e.to_string(),
    })?;
    Ok(cfg)
}

/// 加载命名配置节
pub fn load_named_config<T>(config: &Config, section: &str) -> Result<NamedConfig<T>, ConfigError>
where
    T: DeserializeOwned + Validate + Clone + Default,
{
    let configs = match config.get::<HashMap<String, T>>(section) {
        Ok(c) => c,
        Err(config::ConfigError::NotFound(_)) => HashMap::new(),
        Err(e) => return Err(e.into()),
    };

    for (key, cfg) in &configs {
        cfg.validate().map_err(|e| ConfigError::ValidationError {
            section: section.to_string(),
            key: key.to_string(),
            message: e.to_string(),
        })?;
    }

    Ok(NamedConfig { configs })
}

/// 通知配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default)]
pub struct NotifyConfig {
    /// 推送接口地址
    #[validate(url)]
    pub endpoint: String,
    /// 接收者 Id
    pub receiver_id: String,
    /// Bearer 令牌
    pub auth_token: String,
    /// 请求超时秒数
    #[validate(range(min = 1))]
    pub timeout: u64,
}

impl NotifyConfig {
    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.line.me/v2/bot/message/push".to_string(),
            receiver_id: String::new(),
            auth_token: String::new(),
            timeout: 10,
        }
    }
}

impl domain::Config for NotifyConfig {
    fn load(config: &Config) -> Result<Self, ConfigError> {
        load_section(config, "notify")
    }
}

/// 追踪导出配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    /// 服务名
    #[validate(length(min = 1))]
    pub service_name: String,
    /// OTLP 收集器地址，按信号追加 `/v1/traces`、`/v1/metrics`、`/v1/logs`，为空时不导出
    pub otlp_endpoint: String,
    /// 导出认证令牌
    pub auth_token: String,
}

impl TelemetryConfig {
    /// 加载服务的追踪导出配置
    ///
    /// `telemetry.<name>` 缺省时以服务名为默认值。
    pub fn for_service(config: &Config, name: &str) -> Result<Self, ConfigError> {
        let named: NamedConfig<Self> = load_named_config(config, "telemetry")?;
        Ok(named.find(name).cloned().unwrap_or_else(|| Self {
            service_name: name.to_string(),
            ..Default::default()
        }))
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rolldice".to_string(),
            otlp_endpoint: String::new(),
            auth_token: String::new(),
        }
    }
}

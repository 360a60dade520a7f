use rolldice::{
    config::{build_config, load_section},
    domain,
    errors::ConfigError,
};
use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

/// 加载服务配置源
pub fn load() -> Result<config::Config, ConfigError> {
    build_config(PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

/// HTTP 配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default)]
pub struct HttpConfig {
    /// 监听地址
    #[validate(length(min = 1))]
    pub addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8083".to_string(),
        }
    }
}

impl domain::Config for HttpConfig {
    fn load(config: &config::Config) -> Result<Self, ConfigError> {
        load_section(config, "http")
    }
}

//! Kafka 客户端配置
//!
//! `kafka` 节描述集群连接，`publisher` 与 `subscriber` 节分别描述生产与消费。

use rdkafka::ClientConfig;
use rolldice::{config::load_section, domain, errors::ConfigError};
use serde::Deserialize;
use tokio::time::Duration;
use validator::Validate;

/// 集群连接配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default)]
pub struct KafkaConfig {
    /// 代理地址列表
    #[validate(length(min = 1))]
    pub brokers: Vec<String>,
    /// SASL 用户名，为空时不启用 SASL
    pub username: String,
    /// SASL 密码
    pub password: String,
    /// 是否启用 TLS
    pub tls: bool,
    /// 超时秒数
    #[validate(range(min = 1))]
    pub timeout: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            username: String::new(),
            password: String::new(),
            tls: false,
            timeout: 45,
        }
    }
}

impl KafkaConfig {
    /// 安全协议
    pub fn security_protocol(&self) -> &'static str {
        match (self.username.is_empty(), self.tls) {
            (true, false) => "plaintext",
            (true, true) => "ssl",
            (false, false) => "sasl_plaintext",
            (false, true) => "sasl_ssl",
        }
    }

    /// 超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// 基础客户端配置
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.brokers.join(","))
            .set("security.protocol", self.security_protocol());
        if !self.username.is_empty() {
            config
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", &self.username)
                .set("sasl.password", &self.password);
        }
        config
    }
}

/// 生产配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default)]
pub struct PublishSettings {
    /// 目标主题
    #[validate(length(min = 1))]
    pub topic: String,
    /// 最大重试次数，不超过 5
    #[validate(range(min = 1, max = 5))]
    pub retries: u32,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            topic: "poc.rolldice".to_string(),
            retries: 5,
        }
    }
}

/// 消费配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default)]
pub struct ConsumeSettings {
    /// 订阅主题
    #[validate(length(min = 1))]
    pub topics: Vec<String>,
    /// 客户端 Id
    #[validate(length(min = 1))]
    pub client_id: String,
    /// 消费组 Id
    #[validate(length(min = 1))]
    pub group_id: String,
}

impl Default for ConsumeSettings {
    fn default() -> Self {
        Self {
            topics: vec!["poc.rolldice".to_string()],
            client_id: "poc-project".to_string(),
            group_id: "poc-group".to_string(),
        }
    }
}

/// 发布者配置
#[derive(Debug, Clone, Default)]
pub struct PublisherConfig {
    /// 集群连接
    pub kafka: KafkaConfig,
    /// 生产配置
    pub publisher: PublishSettings,
}

impl PublisherConfig {
    /// 生产者客户端配置
    ///
    /// 等待全部同步副本确认。
    pub fn producer_config(&self) -> ClientConfig {
        let mut config = self.kafka.client_config();
        config
            .set("acks", "all")
            .set("message.send.max.retries", self.publisher.retries.to_string())
            .set("message.timeout.ms", (self.kafka.timeout * 1000).to_string());
        config
    }
}

impl domain::Config for PublisherConfig {
    fn load(config: &config::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            kafka: load_section(config, "kafka")?,
            publisher: load_section(config, "publisher")?,
        })
    }
}

/// 订阅者配置
#[derive(Debug, Clone, Default)]
pub struct SubscriberConfig {
    /// 集群连接
    pub kafka: KafkaConfig,
    /// 消费配置
    pub subscriber: ConsumeSettings,
}

impl SubscriberConfig {
    /// 消费者客户端配置
    ///
    /// 从最新位置开始消费，按范围分配分区；偏移量在记录处理完成后才存储，由自动提交写回。
    pub fn consumer_config(&self) -> ClientConfig {
        let mut config = self.kafka.client_config();
        config
            .set("group.id", &self.subscriber.group_id)
            .set("client.id", &self.subscriber.client_id)
            .set("auto.offset.reset", "latest")
            .set("partition.assignment.strategy", "range")
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set("session.timeout.ms", (self.kafka.timeout * 1000).to_string());
        config
    }
}

impl domain::Config for SubscriberConfig {
    fn load(config: &config::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            kafka: load_section(config, "kafka")?,
            subscriber: load_section(config, "subscriber")?,
        })
    }
}

#![allow(dead_code)]

use rdkafka::{
    admin::{AdminClient, AdminOptions, NewTopic, TopicReplication},
    client::DefaultClientContext,
};
use rolldice::{config::build_config, domain::Config};
use rolldice_kafka::config::{PublisherConfig, SubscriberConfig};
use std::{path::PathBuf, sync::LazyLock};
use tokio::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::fmt;

pub(crate) static CFG: LazyLock<config::Config> = LazyLock::new(|| {
    let config = build_config(PathBuf::from(env!("CARGO_MANIFEST_DIR"))).unwrap();
    fmt().with_test_writer().with_max_level(Level::DEBUG).init();
    info!("启用 {} 测试日志输出", Level::DEBUG);
    config
});

pub(crate) static OPTS: LazyLock<AdminOptions> = LazyLock::new(|| {
    AdminOptions::new()
        .operation_timeout(Some(Duration::from_secs(3)))
        .request_timeout(Some(Duration::from_secs(5)))
});

pub(crate) static ADMIN: LazyLock<AdminClient<DefaultClientContext>> = LazyLock::new(|| {
    publisher_config()
        .kafka
        .client_config()
        .create()
        .expect("管理客户端创建失败")
});

pub(crate) fn publisher_config() -> PublisherConfig {
    PublisherConfig::load(&CFG).unwrap()
}

pub(crate) fn subscriber_config() -> SubscriberConfig {
    SubscriberConfig::load(&CFG).unwrap()
}

pub(crate) async fn create_topic(topic: &str) {
    let new_topic = NewTopic::new(topic, 1, TopicReplication::Fixed(1));
    let results = ADMIN.create_topics(&[new_topic], &OPTS).await.unwrap();
    for result in results {
        result.unwrap();
    }
}

use opentelemetry::propagation::{Extractor, Injector};

/// 记录头
///
/// 保持插入顺序，同时作为追踪上下文的注入与提取载体。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordHeaders(Vec<(String, Vec<u8>)>);

impl RecordHeaders {
    /// 构造空记录头
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入记录头，同名则覆盖
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key, value)),
        }
    }

    /// 读取记录头
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// 遍历记录头
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// 记录头数量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Injector for RecordHeaders {
    fn set(&mut self, key: &str, value: String) {
        self.insert(key, value.into_bytes());
    }
}

impl Extractor for RecordHeaders {
    fn get(&self, key: &str) -> Option<&str> {
        RecordHeaders::get(self, key).and_then(|v| std::str::from_utf8(v).ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// 待写入记录
#[derive(Debug, Clone)]
pub struct OutgoingRecord {
    /// 目标主题
    pub topic: String,
    /// 消息键
    pub key: Vec<u8>,
    /// 消息体
    pub value: Vec<u8>,
    /// 记录头
    pub headers: RecordHeaders,
}

/// 写入确认
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// 分区
    pub partition: i32,
    /// 偏移
    pub offset: i64,
}

/// 已认领记录
#[derive(Debug, Clone)]
pub struct ConsumedRecord {
    /// 来源主题
    pub topic: String,
    /// 分区
    pub partition: i32,
    /// 偏移
    pub offset: i64,
    /// 毫秒时间戳
    pub timestamp: Option<i64>,
    /// 消息键
    pub key: Option<Vec<u8>>,
    /// 消息体
    pub payload: Vec<u8>,
    /// 记录头
    pub headers: RecordHeaders,
}

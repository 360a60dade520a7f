//! ## 推送通知

use crate::{Telemetry, config::NotifyConfig, domain::NotificationSender, errors::NotifyError};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, future::Future};
use tracing::{Span, field, instrument};

/// 消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// 消息类型
    #[serde(rename = "type")]
    pub kind: String,
    /// 消息文本
    pub text: String,
}

/// 推送消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// 接收者
    pub to: String,
    /// 消息列表
    pub messages: Vec<Message>,
}

impl PushMessage {
    /// 单条文本消息
    pub fn text(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            messages: vec![Message {
                kind: "text".to_string(),
                text: text.into(),
            }],
        }
    }
}

/// LINE 推送发送者
pub struct LineNotifier {
    client: Client,
    endpoint: String,
    auth_token: String,
    telemetry: Telemetry,
}

impl LineNotifier {
    /// 构造发送者
    ///
    /// 每个请求在配置的超时内未完成即失败。
    pub fn new(cfg: &NotifyConfig, telemetry: Telemetry) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            auth_token: cfg.auth_token.clone(),
            telemetry,
        })
    }

    fn trace_headers(&self) -> HeaderMap {
        let mut carrier: HashMap<String, String> = HashMap::new();
        self.telemetry.inject(&Span::current(), &mut carrier);
        let mut headers = HeaderMap::new();
        for (key, value) in carrier {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.insert(name, value);
            }
        }
        headers
    }

    #[instrument(
        name = "http_post",
        skip_all,
        fields(http.method = "POST", http.url = %self.endpoint, http.status_code = field::Empty)
    )]
    async fn post(&self, payload: &PushMessage) -> Result<(), NotifyError> {
        let res = self
            .client
            .post(&self.endpoint)
            .headers(self.trace_headers())
            .bearer_auth(&self.auth_token)
            .json(payload)
            .send()
            .await?;

        let status = res.status();
        Span::current().record("http.status_code", status.as_u16());
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl NotificationSender for LineNotifier {
    fn send_push_message(
        &self,
        payload: &PushMessage,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        self.post(payload)
    }
}

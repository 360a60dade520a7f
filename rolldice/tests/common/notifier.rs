use rolldice::{
    domain::NotificationSender,
    errors::NotifyError,
    notify::PushMessage,
};
use std::{
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

/// 记录推送内容的发送者
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<PushMessage>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .flat_map(|m| m.messages.into_iter().map(|m| m.text))
            .collect()
    }
}

impl NotificationSender for RecordingNotifier {
    fn send_push_message(
        &self,
        payload: &PushMessage,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        let payload = payload.clone();
        async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(NotifyError::Status(500));
            }
            self.sent.lock().unwrap().push(payload);
            Ok(())
        }
    }
}

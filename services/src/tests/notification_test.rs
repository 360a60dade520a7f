use super::*;
use notification::claim_handler;
use rolldice::{
    ConsumedRecord, RecordHeaders, RollEvent,
    domain::{NotificationSender, RecordHandler},
    errors::{HandlerError, NotifyError},
    handler::RollEventHandler,
    notify::PushMessage,
};

#[derive(Clone, Default)]
struct Inbox {
    messages: Arc<Mutex<Vec<PushMessage>>>,
}

impl NotificationSender for Inbox {
    fn send_push_message(
        &self,
        payload: &PushMessage,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        let payload = payload.clone();
        async move {
            self.messages.lock().unwrap().push(payload);
            Ok(())
        }
    }
}

fn record(payload: Vec<u8>) -> ConsumedRecord {
    ConsumedRecord {
        topic: "poc.rolldice".to_string(),
        partition: 0,
        offset: 7,
        timestamp: Some(1_704_067_200_000),
        key: Some(b"1".to_vec()),
        payload,
        headers: RecordHeaders::new(),
    }
}

#[tokio::test]
async fn claimed_roll_is_notified() {
    let inbox = Inbox::default();
    let handler = claim_handler(RollEventHandler::new(inbox.clone(), "U0001"));

    let event = RollEvent::new("1", 6);
    handler
        .handle(record(event.to_json().unwrap().into_bytes()))
        .await
        .unwrap();

    let messages = inbox.messages.lock().unwrap().clone();
    assert_eq!(messages, vec![PushMessage::text("U0001", "Rolled result: 6")]);
}

#[tokio::test]
async fn malformed_record_is_returned_as_error() {
    let inbox = Inbox::default();
    let handler = claim_handler(RollEventHandler::new(inbox.clone(), "U0001"));

    let result = handler.handle(record(b"{".to_vec())).await;
    assert!(matches!(result, Err(HandlerError::Decode(_))));
    assert!(inbox.messages.lock().unwrap().is_empty());
}

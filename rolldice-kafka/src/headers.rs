//! 记录头与 Kafka 消息头互转

use rdkafka::message::{BorrowedMessage, Header, Headers, Message, OwnedHeaders};
use rolldice::{ConsumedRecord, RecordHeaders};

pub(crate) fn to_owned_headers(headers: &RecordHeaders) -> OwnedHeaders {
    headers
        .iter()
        .fold(OwnedHeaders::new_with_capacity(headers.len()), |acc, (key, value)| {
            acc.insert(Header {
                key,
                value: Some(value),
            })
        })
}

/// 空值消息头被丢弃
pub(crate) fn headers_from<H: Headers>(headers: &H) -> RecordHeaders {
    let mut result = RecordHeaders::new();
    for header in headers.iter() {
        if let Some(value) = header.value {
            result.insert(header.key, value);
        }
    }
    result
}

pub(crate) fn record_from_message(msg: &BorrowedMessage<'_>) -> ConsumedRecord {
    ConsumedRecord {
        topic: msg.topic().to_string(),
        partition: msg.partition(),
        offset: msg.offset(),
        timestamp: msg.timestamp().to_millis(),
        key: msg.key().map(<[u8]>::to_vec),
        payload: msg.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        headers: msg.headers().map(headers_from).unwrap_or_default(),
    }
}

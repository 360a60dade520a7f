use super::*;
use crate::headers::{headers_from, to_owned_headers};
use rdkafka::message::{Header, Headers, OwnedHeaders};
use rolldice::RecordHeaders;

#[test]
fn record_headers_survive_kafka_headers() {
    let mut headers = RecordHeaders::new();
    headers.insert(
        "traceparent",
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
    );
    headers.insert("tracestate", "vendor=1");

    let owned = to_owned_headers(&headers);
    assert_eq!(owned.count(), 2);
    assert_eq!(headers_from(&owned), headers);
}

#[test]
fn null_header_values_are_dropped() {
    let owned = OwnedHeaders::new()
        .insert(Header {
            key: "empty",
            value: None::<&str>,
        })
        .insert(Header {
            key: "traceparent",
            value: Some("00-abc"),
        });

    let headers = headers_from(&owned);
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get("traceparent"), Some(b"00-abc".as_slice()));
}

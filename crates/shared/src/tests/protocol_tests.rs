use super::*;
use serde_json::json;

#[test]
fn parses_status_event() {
    let envelope =
        EventEnvelope::parse(r#"{"event":"status","data":{"message":"Fetching news"}}"#)
            .expect("parse");
    assert_eq!(
        envelope,
        EventEnvelope::Status(StatusPayload {
            message: "Fetching news".into()
        })
    );
}

#[test]
fn news_payload_keeps_unrecognized_fields() {
    let raw = json!({
        "event": "news",
        "data": {
            "title": "A",
            "snippet": "body",
            "url": "https://example.com/a",
            "published": "2024-05-01"
        }
    })
    .to_string();

    let EventEnvelope::News(item) = EventEnvelope::parse(&raw).expect("parse") else {
        panic!("expected news");
    };
    assert_eq!(item.title, "A");
    assert_eq!(item.url.as_deref(), Some("https://example.com/a"));
    assert_eq!(item.extra.get("published"), Some(&json!("2024-05-01")));

    let reencoded = EventEnvelope::News(item).to_raw().expect("encode");
    assert_eq!(reencoded.data["published"], json!("2024-05-01"));
}

#[test]
fn news_payload_tolerates_null_and_missing_text() {
    let envelope = EventEnvelope::parse(r#"{"event":"news","data":{"title":null}}"#)
        .expect("parse");
    assert_eq!(envelope, EventEnvelope::News(NewsItem::default()));
}

#[test]
fn data_summary_is_passed_through_untouched() {
    let envelope =
        EventEnvelope::parse(r#"{"event":"data_summary","data":{"price":900,"beta":1.7}}"#)
            .expect("parse");
    assert_eq!(
        envelope,
        EventEnvelope::DataSummary(MarketSummary(json!({"price": 900, "beta": 1.7})))
    );
}

#[test]
fn done_accepts_server_ack_and_missing_data() {
    let with_ack = EventEnvelope::parse(r#"{"event":"done","data":{"ok":true}}"#).expect("ack");
    assert_eq!(with_ack, EventEnvelope::Done(DonePayload { ok: Some(true) }));

    let bare = EventEnvelope::parse(r#"{"event":"done"}"#).expect("bare");
    assert_eq!(bare, EventEnvelope::Done(DonePayload::default()));
}

#[test]
fn unknown_kind_is_not_an_error() {
    let envelope = EventEnvelope::parse(r#"{"event":"progress","data":{"pct":40}}"#)
        .expect("parse");
    assert_eq!(
        envelope,
        EventEnvelope::Unknown {
            kind: "progress".into()
        }
    );
    assert_eq!(envelope.kind(), "progress");
}

#[test]
fn rejects_non_json_body() {
    let err = EventEnvelope::parse("not json").expect_err("must fail");
    assert!(matches!(err, ProtocolError::MalformedEnvelope(_)));
}

#[test]
fn rejects_known_kind_with_wrong_payload_shape() {
    let err = EventEnvelope::parse(r#"{"event":"report","data":{"markdown":42}}"#)
        .expect_err("must fail");
    assert!(matches!(
        err,
        ProtocolError::MalformedPayload { kind: "report", .. }
    ));
}

#[test]
fn raw_envelope_round_trips_wire_shape() {
    let raw = EventEnvelope::Report(ReportPayload {
        markdown: "# Memo".into(),
    })
    .to_raw()
    .expect("encode");
    assert_eq!(
        serde_json::to_value(&raw).expect("encode"),
        json!({"event": "report", "data": {"markdown": "# Memo"}})
    );
}

#[test]
fn status_tolerates_null_and_missing_message() {
    let null_message = EventEnvelope::parse(r#"{"event":"status","data":{"message":null}}"#)
        .expect("null message");
    assert_eq!(
        null_message,
        EventEnvelope::Status(StatusPayload {
            message: String::new()
        })
    );

    let missing = EventEnvelope::parse(r#"{"event":"status","data":{}}"#).expect("missing");
    assert_eq!(missing, null_message);
}

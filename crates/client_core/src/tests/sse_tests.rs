use super::*;
use std::convert::Infallible;

fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes, Infallible>> {
    let owned: Vec<Result<Bytes, Infallible>> = parts
        .iter()
        .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
        .collect();
    futures::stream::iter(owned)
}

async fn collect(parts: &[&str]) -> Vec<String> {
    sse_data_events(chunks(parts))
        .map(|item| match item {
            Ok(data) => data,
            Err(never) => match never {},
        })
        .collect()
        .await
}

#[test]
fn extract_data_line() {
    assert_eq!(extract_sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
    assert_eq!(extract_sse_data("data:{\"a\":1}"), Some("{\"a\":1}"));
}

#[test]
fn extract_skips_comment_and_other_fields() {
    assert_eq!(extract_sse_data(": keep-alive"), None);
    assert_eq!(extract_sse_data("event: message"), None);
    assert_eq!(extract_sse_data("id: 7"), None);
    assert_eq!(extract_sse_data("database: nope"), None);
}

#[test]
fn extract_keeps_inner_whitespace() {
    assert_eq!(extract_sse_data("data:  padded "), Some(" padded "));
}

#[tokio::test]
async fn yields_one_payload_per_event() {
    let events = collect(&["data: one\n\ndata: two\n\n"]).await;
    assert_eq!(events, vec!["one", "two"]);
}

#[tokio::test]
async fn reassembles_events_split_across_chunks() {
    let events = collect(&["da", "ta: {\"event\":\"st", "atus\"}\r\n", "\r\n"]).await;
    assert_eq!(events, vec!["{\"event\":\"status\"}"]);
}

#[tokio::test]
async fn joins_multi_line_data_fields() {
    let events = collect(&["data: first\ndata: second\n\n"]).await;
    assert_eq!(events, vec!["first\nsecond"]);
}

#[tokio::test]
async fn flushes_pending_event_at_end_of_body() {
    let events = collect(&["data: complete\n\n", "data: tail"]).await;
    assert_eq!(events, vec!["complete", "tail"]);
}

#[tokio::test]
async fn ignores_comments_and_blank_keepalives() {
    let events = collect(&[": ping\n\n\n", "retry: 1000\n", "data: x\n\n"]).await;
    assert_eq!(events, vec!["x"]);
}

#[tokio::test]
async fn read_error_is_surfaced_once_and_ends_stream() {
    let source = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"data: a\n\n")),
        Err("boom"),
        Ok(Bytes::from_static(b"data: b\n\n")),
    ]);
    let items: Vec<Result<String, &str>> = sse_data_events(source).collect().await;
    assert_eq!(items, vec![Ok("a".to_string()), Err("boom")]);
}

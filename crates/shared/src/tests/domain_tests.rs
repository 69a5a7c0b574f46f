use super::*;

#[test]
fn subject_trims_surrounding_whitespace() {
    let subject = Subject::new("  NVDA \n").expect("subject");
    assert_eq!(subject.as_str(), "NVDA");
}

#[test]
fn subject_rejects_blank_identifier() {
    assert_eq!(Subject::new(""), Err(SubjectError::Empty));
    assert_eq!(Subject::new("   "), Err(SubjectError::Empty));
}

#[test]
fn subject_deserialization_goes_through_validation() {
    let parsed: Result<Subject, _> = serde_json::from_str("\"\"");
    assert!(parsed.is_err());

    let parsed: Subject = serde_json::from_str("\"MSFT\"").expect("subject");
    assert_eq!(parsed.to_string(), "MSFT");
}

#[test]
fn catalog_contains_default_subject_first() {
    assert_eq!(INSTRUMENT_CATALOG[0].symbol, DEFAULT_SUBJECT);
    assert_eq!(INSTRUMENT_CATALOG.len(), 12);
}

#[test]
fn catalog_lookup_returns_label_for_known_symbols_only() {
    let known = Subject::new("AMD").expect("subject");
    assert_eq!(
        known.instrument().map(|i| i.label),
        Some("Advanced Micro Devices (AMD)")
    );

    let unknown = Subject::new("BRK.B").expect("subject");
    assert!(unknown.instrument().is_none());
}

#[test]
fn channel_tokens_advance_monotonically() {
    let first = ChannelToken(0).next();
    let second = first.next();
    assert!(second > first);
    assert_eq!(second, ChannelToken(2));
}

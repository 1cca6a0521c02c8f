use utf8_coerce::{
    coerce_utf8, ensure_utf8, ensure_utf8_object, ensure_utf8_owned, ensure_utf8_with,
    transcode, CoercionConfig, ConfigError, EncodingId, Utf8CoercionError, Value,
};

#[test]
fn coercion_error_carries_input_and_candidates() {
    let input = b"rubbish \x90 rubbish";
    let err = ensure_utf8(input, None).unwrap_err();
    assert_eq!(err.bytes(), input);
    assert_eq!(err.tried(), &[EncodingId::UTF_8, EncodingId::WINDOWS_1252]);
    assert!(err.to_string().contains("tried UTF-8, windows-1252"));
}

#[test]
fn coercion_error_is_a_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    let err = ensure_utf8(b"\x90", None).unwrap_err();
    assert_error(&err);
    let boxed: Box<dyn std::error::Error> = Box::new(err.clone());
    assert_eq!(boxed.to_string(), err.to_string());
}

#[test]
fn owned_error_gives_the_buffer_back_for_lossy_retry() {
    let err = ensure_utf8_owned(b"a\x90b".to_vec(), None).unwrap_err();
    let text = coerce_utf8(&err.into_bytes(), None);
    assert_eq!(text, "a0x90b");
}

#[test]
fn malformed_utf16_after_bom_fails_without_fallback() {
    let err = transcode(b"\xfe\xff\x03", None, &CoercionConfig::default()).unwrap_err();
    assert_eq!(err.tried(), &[EncodingId::UTF_16BE]);
}

#[test]
fn custom_chain_changes_what_fails() {
    let utf8_only = CoercionConfig {
        default_chain: vec![EncodingId::UTF_8],
        ..Default::default()
    };
    let err = ensure_utf8_with(b"caf\xe9", None, &utf8_only).unwrap_err();
    assert_eq!(err.tried(), &[EncodingId::UTF_8]);

    let latin2 = EncodingId::for_label("iso-8859-2").expect("registered");
    let permissive = CoercionConfig {
        default_chain: vec![EncodingId::UTF_8, latin2],
        ..Default::default()
    };
    // ISO-8859-2 defines 0x90 as a C1 control, so it accepts the byte.
    assert!(ensure_utf8_with(b"\x90", None, &permissive).is_ok());
}

#[test]
fn one_bad_leaf_fails_the_whole_structure() {
    let value = Value::Sequence(vec![
        Value::raw(b"ok".to_vec()),
        Value::Sequence(vec![Value::raw(b"\x81".to_vec())]),
        Value::raw(b"never reached".to_vec()),
    ]);
    let err: Utf8CoercionError = ensure_utf8_object(value).unwrap_err();
    assert_eq!(err.bytes(), b"\x81");
}

#[test]
fn unknown_label_is_a_config_error() {
    let err = "x-unknown".parse::<EncodingId>().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownEncoding(_)));
    assert!(err.to_string().contains("x-unknown"));
}

#[test]
fn invalid_yaml_is_reported() {
    let err = CoercionConfig::from_yaml("default_chain: {").unwrap_err();
    assert!(matches!(err, ConfigError::YamlParse(_)));

    let err = CoercionConfig::from_yaml("default_chain: []").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyCandidateChain));
}

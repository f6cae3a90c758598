use harvest_types::HarvestError;

#[test]
fn transient_classification() {
    assert!(HarvestError::connector("binance", "502 bad gateway").is_transient());
    assert!(
        HarvestError::RateLimitExceeded {
            retry_after_ms: Some(1_000)
        }
        .is_transient()
    );
    assert!(HarvestError::provider_timeout("binance", "ohlcv").is_transient());

    assert!(!HarvestError::Data("bad row".into()).is_transient());
    assert!(!HarvestError::not_found("market FOO/USDT").is_transient());
    assert!(!HarvestError::io("btc_usdt.csv", "disk full").is_transient());
    assert!(!HarvestError::unsupported("ohlcv").is_transient());
}

#[test]
fn retry_after_only_on_rate_limit() {
    let rl = HarvestError::RateLimitExceeded {
        retry_after_ms: Some(2_500),
    };
    assert_eq!(rl.retry_after_ms(), Some(2_500));
    assert_eq!(HarvestError::Other("x".into()).retry_after_ms(), None);
}

#[test]
fn retries_exhausted_roundtrip_and_display() {
    let err = HarvestError::RetriesExhausted {
        attempts: 3,
        last: Box::new(HarvestError::connector("binance", "connection reset")),
    };
    let text = err.to_string();
    assert!(text.contains("3 attempts"));
    assert!(text.contains("connection reset"));

    let json = serde_json::to_string(&err).expect("serialize");
    let de: HarvestError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(de, err);
}

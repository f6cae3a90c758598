use std::time::Duration;

use harvest_types::{BackoffConfig, HarvestConfig, RateLimitConfig, RetryPolicy, Timeframe};

#[test]
fn defaults_match_historical_constants() {
    let cfg = HarvestConfig::default();
    assert_eq!(cfg.timeframe, Timeframe::M15);
    assert_eq!(cfg.limit, 1000);
    assert_eq!(cfg.lookback, Duration::from_secs(3650 * 86_400));
    assert_eq!(cfg.quote, "USDT");
    assert_eq!(cfg.retry.max_attempts, None);
    assert_eq!(cfg.retry.backoff.min_backoff_ms, 60_000);
    assert_eq!(cfg.retry.backoff.max_backoff_ms, 60_000);
    assert_eq!(cfg.retry.backoff.factor, 1);
    assert_eq!(cfg.retry.backoff.jitter_percent, 0);
    assert!(cfg.provider_timeout.is_none());
}

#[test]
fn harvest_config_roundtrip() {
    let cfg = HarvestConfig {
        timeframe: Timeframe::H1,
        limit: 500,
        retry: RetryPolicy::bounded(3, BackoffConfig::default()),
        provider_timeout: Some(Duration::from_secs(10)),
        ..HarvestConfig::default()
    };

    let json = serde_json::to_string(&cfg).expect("serialize harvest config");
    assert!(json.contains("\"1h\""));
    let de: HarvestConfig = serde_json::from_str(&json).expect("deserialize harvest config");
    assert_eq!(de, cfg);
}

#[test]
fn rate_limit_config_roundtrip() {
    let cfg = RateLimitConfig {
        interval: Duration::from_millis(50),
        burst: 4,
    };
    let json = serde_json::to_string(&cfg).expect("serialize rate limit");
    let de: RateLimitConfig = serde_json::from_str(&json).expect("deserialize rate limit");
    assert_eq!(de.interval.as_millis(), 50);
    assert_eq!(de.burst, 4);
}

#[test]
fn retry_policy_attempt_accounting() {
    let unbounded = RetryPolicy::default();
    assert!(unbounded.allows_another(0));
    assert!(unbounded.allows_another(u32::MAX - 1));

    let bounded = RetryPolicy::bounded(3, BackoffConfig::fixed(Duration::from_secs(1)));
    assert!(bounded.allows_another(1));
    assert!(bounded.allows_another(2));
    assert!(!bounded.allows_another(3));
}

#[test]
fn timeframe_parses_and_displays() {
    for tf in Timeframe::ALL {
        let parsed: Timeframe = tf.as_str().parse().expect("known timeframe");
        assert_eq!(parsed, *tf);
        assert_eq!(tf.to_string(), tf.as_str());
    }
    assert_eq!(Timeframe::M15.as_millis(), 900_000);
    assert_eq!(Timeframe::W1.as_millis(), 604_800_000);
    assert!("1M".parse::<Timeframe>().is_err());
}

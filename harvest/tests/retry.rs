mod common;

use std::time::Duration;

use common::{harvester, harvester_with_retry, scratch_dir, sym};
use harvest::{BackoffConfig, Cursor, HarvestError, RetryPolicy, Timeframe};
use harvest_mock::{DynamicMockConnector, MockBehavior, candle_run};
use tokio::time::Instant;

const STEP: i64 = 900_000;

fn transient() -> HarvestError {
    HarvestError::connector("dyn", "connection reset")
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_masked_by_default_policy() {
    let tmp = scratch_dir();
    let btc = sym("BTC/USDT");
    let pages = vec![
        candle_run(0, 5, Timeframe::M15),
        candle_run(5 * STEP, 5, Timeframe::M15),
    ];

    let (clean, clean_ctrl) = DynamicMockConnector::new_with_controller("clean");
    clean_ctrl.push_pages(btc.clone(), pages.clone()).await;
    let expected = harvester(clean, tmp.path())
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap();

    let (flaky, ctrl) = DynamicMockConnector::new_with_controller("flaky");
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Fail(transient())).await;
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Fail(transient())).await;
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Return(pages[0].clone()))
        .await;
    ctrl.push_ohlcv(
        btc.clone(),
        MockBehavior::Fail(HarvestError::RateLimitExceeded {
            retry_after_ms: None,
        }),
    )
    .await;
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Return(pages[1].clone()))
        .await;

    let started = Instant::now();
    let got = harvester(flaky, tmp.path())
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap();
    assert_eq!(got, expected);
    // Three failures, each followed by the fixed 60 s pause.
    assert_eq!(started.elapsed(), Duration::from_secs(180));

    let sinces: Vec<i64> = ctrl
        .ohlcv_requests()
        .await
        .iter()
        .map(|(_, r)| r.since)
        .collect();
    assert_eq!(sinces, vec![0, 0, 0, 5 * STEP, 5 * STEP, 10 * STEP]);
}

#[tokio::test(start_paused = true)]
async fn bounded_policy_gives_up_with_last_error() {
    let tmp = scratch_dir();
    let btc = sym("BTC/USDT");
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    for _ in 0..5 {
        ctrl.push_ohlcv(btc.clone(), MockBehavior::Fail(transient())).await;
    }
    let policy = RetryPolicy::bounded(
        3,
        BackoffConfig {
            min_backoff_ms: 100,
            max_backoff_ms: 1_000,
            factor: 2,
            jitter_percent: 0,
        },
    );
    let started = Instant::now();
    let err = harvester_with_retry(conn, tmp.path(), policy)
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        HarvestError::RetriesExhausted {
            attempts: 3,
            last: Box::new(transient()),
        }
    );
    assert_eq!(ctrl.ohlcv_requests().await.len(), 3);
    // 100 ms then 200 ms between the three attempts.
    assert_eq!(started.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn non_transient_errors_propagate_immediately() {
    let tmp = scratch_dir();
    let btc = sym("BTC/USDT");
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    ctrl.push_ohlcv(
        btc.clone(),
        MockBehavior::Fail(HarvestError::not_found("market BTC/USDT")),
    )
    .await;
    let err = harvester(conn, tmp.path())
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NotFound { .. }));
    assert_eq!(ctrl.ohlcv_requests().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn server_retry_hint_lengthens_delay() {
    let tmp = scratch_dir();
    let btc = sym("BTC/USDT");
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    ctrl.push_ohlcv(
        btc.clone(),
        MockBehavior::Fail(HarvestError::RateLimitExceeded {
            retry_after_ms: Some(5_000),
        }),
    )
    .await;
    let policy = RetryPolicy::unbounded_fixed(Duration::from_secs(1));
    let started = Instant::now();
    harvester_with_retry(conn, tmp.path(), policy)
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn hung_calls_time_out_and_are_retried() {
    let btc = sym("BTC/USDT");
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Hang).await;
    ctrl.push_pages(btc.clone(), vec![candle_run(0, 2, Timeframe::M15)])
        .await;

    let h = harvest::Harvester::builder()
        .with_connector(conn)
        .provider_timeout(Duration::from_secs(10))
        .retry_policy(RetryPolicy::unbounded_fixed(Duration::from_secs(1)))
        .build()
        .unwrap();
    let started = Instant::now();
    let series = h
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn exhausted_timeouts_report_provider_timeout() {
    let btc = sym("BTC/USDT");
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Hang).await;
    ctrl.push_ohlcv(btc.clone(), MockBehavior::Hang).await;

    let h = harvest::Harvester::builder()
        .with_connector(conn)
        .provider_timeout(Duration::from_secs(1))
        .retry_policy(RetryPolicy::bounded(2, BackoffConfig::fixed(Duration::ZERO)))
        .build()
        .unwrap();
    let err = h
        .fetch_series_between(&btc, Cursor::new(0, 100 * STEP))
        .await
        .unwrap_err();
    match err {
        HarvestError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, HarvestError::ProviderTimeout { .. }));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

use std::sync::Arc;
use std::time::Duration;

use harvest_core::connector::ExchangeConnector;
use harvest_core::{OhlcvRequest, Symbol, Timeframe};
use harvest_middleware::{RateLimitedConnector, RateLimiter};
use harvest_mock::{DynamicMockConnector, MockExchange};
use harvest_types::RateLimitConfig;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn spaces_requests_after_burst_is_spent() {
    let limiter = RateLimiter::new(RateLimitConfig::every(Duration::from_millis(50)));
    let start = Instant::now();
    limiter.acquire().await;
    assert_eq!(start.elapsed(), Duration::ZERO);

    let mut last = Instant::now();
    for _ in 0..5 {
        limiter.acquire().await;
        let now = Instant::now();
        assert!(now.duration_since(last) >= Duration::from_millis(50));
        last = now;
    }
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn burst_allows_back_to_back_requests() {
    let limiter = RateLimiter::new(RateLimitConfig {
        interval: Duration::from_secs(1),
        burst: 3,
    });
    let start = Instant::now();
    for _ in 0..3 {
        limiter.acquire().await;
    }
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(!limiter.try_acquire().await);

    limiter.acquire().await;
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn idle_time_refills_up_to_burst_only() {
    let limiter = RateLimiter::new(RateLimitConfig {
        interval: Duration::from_millis(100),
        burst: 2,
    });
    assert!(limiter.try_acquire().await);
    assert!(limiter.try_acquire().await);
    assert!(!limiter.try_acquire().await);

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(limiter.try_acquire().await);
    assert!(limiter.try_acquire().await);
    assert!(!limiter.try_acquire().await);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_never_waits() {
    let limiter = RateLimiter::new(RateLimitConfig::every(Duration::ZERO));
    let start = Instant::now();
    for _ in 0..100 {
        limiter.acquire().await;
    }
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn wrapped_fetches_are_spaced() {
    let (inner, _ctrl) = DynamicMockConnector::new_with_controller("dyn");
    let wrapped = RateLimitedConnector::for_connector(inner);
    assert_eq!(wrapped.limiter().config().interval, Duration::from_millis(50));

    let p = wrapped.as_ohlcv_provider().unwrap();
    let sym = Symbol::new("BTC/USDT").unwrap();
    let req = OhlcvRequest {
        timeframe: Timeframe::M15,
        since: 0,
        limit: 1000,
    };
    let start = Instant::now();
    for _ in 0..4 {
        p.fetch_ohlcv(&sym, req).await.unwrap();
    }
    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn shared_limiter_spans_connectors() {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig::every(Duration::from_millis(
        200,
    ))));
    let a = RateLimitedConnector::with_limiter(Arc::new(MockExchange::new()), Arc::clone(&limiter));
    let b = RateLimitedConnector::with_limiter(Arc::new(MockExchange::new()), limiter);

    let start = Instant::now();
    a.as_markets_provider().unwrap().load_markets().await.unwrap();
    b.as_markets_provider().unwrap().load_markets().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));
}

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use harvest_core::connector::{ExchangeConnector, MarketsProvider, OhlcvProvider};
use harvest_core::{Candle, HarvestError, Market, OhlcvRequest, Symbol};

use crate::MOCK_NOW_MS;

/// Instruction for how a call should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(HarvestError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    markets: Option<MockBehavior<Vec<Market>>>,
    ohlcv_steps: HashMap<Symbol, VecDeque<MockBehavior<Vec<Candle>>>>,
    ohlcv_requests: Vec<(Symbol, OhlcvRequest)>,
    markets_calls: usize,
}

struct Clock {
    now_ms: AtomicI64,
    min_interval_ms: AtomicU64,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    clock: Arc<Clock>,
}

impl DynamicMockController {
    /// Set the behavior for `load_markets`.
    pub async fn set_markets_behavior(&self, behavior: MockBehavior<Vec<Market>>) {
        let mut guard = self.state.lock().await;
        guard.markets = Some(behavior);
    }

    /// Queue one step for the next `fetch_ohlcv` call on `symbol`.
    ///
    /// Steps are consumed in order; once a symbol's queue is empty every
    /// further call returns an empty page.
    pub async fn push_ohlcv(&self, symbol: Symbol, behavior: MockBehavior<Vec<Candle>>) {
        let mut guard = self.state.lock().await;
        guard.ohlcv_steps.entry(symbol).or_default().push_back(behavior);
    }

    /// Queue several successful pages for `symbol`.
    pub async fn push_pages(&self, symbol: Symbol, pages: Vec<Vec<Candle>>) {
        let mut guard = self.state.lock().await;
        guard
            .ohlcv_steps
            .entry(symbol)
            .or_default()
            .extend(pages.into_iter().map(MockBehavior::Return));
    }

    /// Every `fetch_ohlcv` call received so far, in order.
    pub async fn ohlcv_requests(&self) -> Vec<(Symbol, OhlcvRequest)> {
        let guard = self.state.lock().await;
        guard.ohlcv_requests.clone()
    }

    /// Number of `load_markets` calls received so far.
    pub async fn markets_calls(&self) -> usize {
        self.state.lock().await.markets_calls
    }

    /// Set the exchange clock reported by `milliseconds()`.
    pub fn set_now(&self, now_ms: i64) {
        self.clock.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Set the interval reported by `min_request_interval()`.
    pub fn set_min_request_interval(&self, interval: Duration) {
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self.clock.min_interval_ms.store(ms, Ordering::SeqCst);
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
    clock: Arc<Clock>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    ///
    /// The clock starts at [`MOCK_NOW_MS`] with a 50 ms minimum request interval.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn ExchangeConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let clock = Arc::new(Clock {
            now_ms: AtomicI64::new(MOCK_NOW_MS),
            min_interval_ms: AtomicU64::new(50),
        });
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            clock: Arc::clone(&clock),
        };
        let me = Arc::new(Self { name, state, clock });
        (me as Arc<dyn ExchangeConnector>, controller)
    }
}

#[async_trait]
impl ExchangeConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.clock.min_interval_ms.load(Ordering::SeqCst))
    }

    fn milliseconds(&self) -> i64 {
        self.clock.now_ms.load(Ordering::SeqCst)
    }

    fn as_markets_provider(&self) -> Option<&dyn MarketsProvider> {
        Some(self as &dyn MarketsProvider)
    }

    fn as_ohlcv_provider(&self) -> Option<&dyn OhlcvProvider> {
        Some(self as &dyn OhlcvProvider)
    }
}

#[async_trait]
impl MarketsProvider for DynamicMockConnector {
    async fn load_markets(&self) -> Result<Vec<Market>, HarvestError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.markets_calls += 1;
            guard.markets.clone()
        };
        match behavior {
            Some(MockBehavior::Return(markets)) => Ok(markets),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl OhlcvProvider for DynamicMockConnector {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        req: OhlcvRequest,
    ) -> Result<Vec<Candle>, HarvestError> {
        // Take the next step without holding the lock across await points.
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.ohlcv_requests.push((symbol.clone(), req));
            guard
                .ohlcv_steps
                .get_mut(symbol)
                .and_then(VecDeque::pop_front)
        };
        match behavior {
            Some(MockBehavior::Return(page)) => Ok(page),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        }
    }
}

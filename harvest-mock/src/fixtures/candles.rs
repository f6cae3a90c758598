use harvest_core::{Candle, Decimal, OhlcvRequest, Timeframe};

/// `count` synthetic candles spaced one `timeframe` apart from `start_ms`.
///
/// Prices climb by one per candle so every row is distinguishable.
pub fn run(start_ms: i64, count: usize, timeframe: Timeframe) -> Vec<Candle> {
    let step = timeframe.as_millis();
    (0..count)
        .map(|i| {
            let i = i64::try_from(i).unwrap_or(i64::MAX);
            candle(start_ms.saturating_add(i.saturating_mul(step)), i)
        })
        .collect()
}

/// Page of closed candles for a market listed at `listed_at`, ending before `now`.
pub fn page(listed_at: i64, now: i64, req: OhlcvRequest) -> Vec<Candle> {
    let step = req.timeframe.as_millis();
    let from = req.since.max(listed_at);
    let first = from.div_euclid(step) + i64::from(from.rem_euclid(step) != 0);
    let listed_index = listed_at.div_euclid(step);
    let mut out = Vec::new();
    let mut index = first;
    while out.len() < usize::from(req.limit) {
        let open_time = index * step;
        if open_time + step > now {
            break;
        }
        out.push(candle(open_time, index - listed_index));
        index += 1;
    }
    out
}

fn candle(open_time: i64, n: i64) -> Candle {
    let open = Decimal::from(100 + n);
    Candle::new(
        open_time,
        open,
        open + Decimal::from(2),
        open - Decimal::ONE,
        open + Decimal::ONE,
        Decimal::new(105, 1),
    )
}

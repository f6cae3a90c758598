mod common;

use common::{scratch_dir, sym};
use harvest::{Candle, Series, Timeframe, file_name_for, write_series};
use harvest_mock::candle_run;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn file_names_are_lowercase_with_underscore() {
    assert_eq!(file_name_for(&sym("BTC/USDT")), "btc_usdt.csv");
    assert_eq!(file_name_for(&sym("1000SATS/USDT")), "1000sats_usdt.csv");
}

#[test]
fn thousand_candles_make_thousand_rows() {
    let tmp = scratch_dir();
    let dir = tmp.path();
    let t = 1_502_942_400_000; // 2017-08-17 04:00:00 UTC
    let mut series = Series::new(sym("BTC/USDT"), Timeframe::M15);
    series.extend_page(candle_run(t, 1000, Timeframe::M15));

    let written = write_series(series, dir).unwrap().expect("file written");
    assert_eq!(written.rows, 1000);
    assert_eq!(written.path, dir.join("btc_usdt.csv"));

    let text = std::fs::read_to_string(&written.path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1001);
    assert_eq!(lines[0], "timestamp,open,high,low,close,volume");
    assert!(lines[1].starts_with("2017-08-17 04:00:00,"), "{}", lines[1]);
    assert!(lines[2].starts_with("2017-08-17 04:15:00,"), "{}", lines[2]);
}

#[test]
fn rows_are_sorted_and_decimals_normalized() {
    let tmp = scratch_dir();
    let dir = tmp.path();
    let mut series = Series::new(sym("ETH/USDT"), Timeframe::M15);
    series.extend_page(vec![
        Candle::new(900_000, dec("2.50"), dec("3.000"), dec("2"), dec("2.5"), dec("0.00100000")),
        Candle::new(0, dec("1.10000000"), dec("1.2"), dec("1.0"), dec("1.15"), dec("12.00000000")),
    ]);
    let written = write_series(series, dir).unwrap().unwrap();
    let text = std::fs::read_to_string(written.path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "timestamp,open,high,low,close,volume",
            "1970-01-01 00:00:00,1.1,1.2,1,1.15,12",
            "1970-01-01 00:15:00,2.5,3,2,2.5,0.001",
        ]
    );
}

#[test]
fn duplicate_timestamps_keep_arrival_order() {
    let tmp = scratch_dir();
    let dir = tmp.path();
    let mut series = Series::new(sym("BTC/USDT"), Timeframe::M15);
    series.extend_page(vec![
        Candle::new(0, dec("1"), dec("1"), dec("1"), dec("1"), dec("1")),
        Candle::new(0, dec("2"), dec("2"), dec("2"), dec("2"), dec("2")),
    ]);
    let written = write_series(series, dir).unwrap().unwrap();
    assert_eq!(written.rows, 2);
    let text = std::fs::read_to_string(written.path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "1970-01-01 00:00:00,1,1,1,1,1");
    assert_eq!(lines[2], "1970-01-01 00:00:00,2,2,2,2,2");
}

#[test]
fn rewrite_is_byte_identical_and_overwrites() {
    let tmp = scratch_dir();
    let dir = tmp.path();
    let make = || {
        let mut s = Series::new(sym("BTC/USDT"), Timeframe::M15);
        s.extend_page(candle_run(1_600_000_000_000, 50, Timeframe::M15));
        s
    };
    let path = dir.join("btc_usdt.csv");
    std::fs::write(&path, "stale contents that are much longer than nothing\n".repeat(1000)).unwrap();

    write_series(make(), dir).unwrap();
    let first = std::fs::read(&path).unwrap();
    write_series(make(), dir).unwrap();
    let second = std::fs::read(&path).unwrap();
    assert_eq!(first, second);
    assert!(!String::from_utf8(first).unwrap().contains("stale"));
}

#[test]
fn empty_series_writes_nothing() {
    let tmp = scratch_dir();
    let dir = tmp.path();
    let series = Series::new(sym("NEW/USDT"), Timeframe::M15);
    assert!(write_series(series, dir).unwrap().is_none());
    assert!(!dir.join("new_usdt.csv").exists());
}

#[test]
fn missing_output_dir_is_created() {
    let tmp = scratch_dir();
    let dir = tmp.path().join("nested").join("deeper");
    let mut series = Series::new(sym("BTC/USDT"), Timeframe::M15);
    series.extend_page(candle_run(0, 1, Timeframe::M15));
    let written = write_series(series, &dir).unwrap().unwrap();
    assert!(written.path.exists());
}

#[test]
fn unwritable_destination_is_an_io_error() {
    let tmp = scratch_dir();
    let dir = tmp.path();
    // A regular file where the directory should be.
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let mut series = Series::new(sym("BTC/USDT"), Timeframe::M15);
    series.extend_page(candle_run(0, 1, Timeframe::M15));
    let err = write_series(series, &blocker).unwrap_err();
    assert!(matches!(err, harvest::HarvestError::Io { .. }), "{err:?}");
}

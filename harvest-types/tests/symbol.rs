use harvest_types::{HarvestError, Symbol};

#[test]
fn splits_base_and_quote() {
    let s = Symbol::new("BTC/USDT").expect("valid symbol");
    assert_eq!(s.base(), "BTC");
    assert_eq!(s.quote(), "USDT");
    assert!(s.is_quoted_in("USDT"));
    assert_eq!(s.file_stem(), "btc_usdt");
}

#[test]
fn settlement_suffix_is_not_a_usdt_pair() {
    let s = Symbol::new("BTC/USDT:USDT").expect("valid symbol");
    assert_eq!(s.quote(), "USDT:USDT");
    assert!(!s.is_quoted_in("USDT"));
}

#[test]
fn suffix_must_follow_separator() {
    // "XUSDT" ends with "USDT" but is not quoted in it.
    let s = Symbol::new("BTC/XUSDT").expect("valid symbol");
    assert!(!s.is_quoted_in("USDT"));
}

#[test]
fn rejects_malformed_symbols() {
    for raw in ["BTCUSDT", "/USDT", "BTC/", ""] {
        let err = Symbol::new(raw).expect_err("malformed");
        assert!(matches!(err, HarvestError::InvalidArg(_)), "{raw}");
    }
}

#[test]
fn serde_validates_on_deserialize() {
    let ok: Symbol = serde_json::from_str("\"ETH/USDT\"").expect("valid");
    assert_eq!(ok.as_str(), "ETH/USDT");
    assert!(serde_json::from_str::<Symbol>("\"ETHUSDT\"").is_err());
}

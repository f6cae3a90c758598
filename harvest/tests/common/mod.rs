#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use harvest::{Harvester, RetryPolicy, Symbol};
use harvest_core::connector::ExchangeConnector;
use tempfile::TempDir;

pub fn sym(s: &str) -> Symbol {
    Symbol::new(s).expect("valid symbol")
}

/// Fresh, empty scratch directory removed when the guard drops.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch dir")
}

pub fn harvester(conn: Arc<dyn ExchangeConnector>, out: &Path) -> Harvester {
    Harvester::builder()
        .with_connector(conn)
        .output_dir(out)
        .build()
        .expect("harvester builds")
}

pub fn harvester_with_retry(
    conn: Arc<dyn ExchangeConnector>,
    out: &Path,
    retry: RetryPolicy,
) -> Harvester {
    Harvester::builder()
        .with_connector(conn)
        .output_dir(out)
        .retry_policy(retry)
        .build()
        .expect("harvester builds")
}

pub mod candles;
pub mod markets;

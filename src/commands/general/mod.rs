/// Latency check.
pub mod ping;

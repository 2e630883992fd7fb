//! Exponential backoff with jitter for status polling.

use std::time::Duration;
use rand::Rng;

/// Delay before poll number `attempt` (1-based).
///
/// The first poll runs immediately. Later delays double from `base_ms` up to
/// `max_ms`, plus up to 10% jitter so concurrent waiters spread out.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt <= 1 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 2);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

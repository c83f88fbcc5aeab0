//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate the wait before retry number `attempt` (1-based).
///
/// Doubles from `min` on each attempt, capped at `max`, plus up to 10%
/// jitter. Attempt 0 never waits.
pub fn calculate_backoff(attempt: u32, min: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = min_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms.max(min_ms));

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Duration = Duration::from_millis(100);

    #[test]
    fn test_backoff_calculation() {
        assert_eq!(calculate_backoff(0, MIN, Duration::from_secs(2)), Duration::ZERO);

        let b1 = calculate_backoff(1, MIN, Duration::from_secs(2));
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, MIN, Duration::from_secs(2));
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, MIN, Duration::from_secs(1));
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);
    }

    #[test]
    fn max_below_min_uses_min() {
        let b = calculate_backoff(3, MIN, Duration::from_millis(10));
        assert!(b.as_millis() >= 100 && b.as_millis() < 110);
    }
}

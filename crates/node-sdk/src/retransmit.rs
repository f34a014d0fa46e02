//! Retransmission policy for confirmable exchanges: exponential back-off of
//! the acknowledgement timeout with a bounded number of retries.

use std::time::Duration;

use rd_domain::config::TransportConfig;

/// Controls how long the transport waits for a response and how often it
/// resends before reporting that nobody answered.
#[derive(Debug, Clone)]
pub struct RetransmitPolicy {
    /// Timeout for the first transmission.
    pub ack_timeout: Duration,
    /// Multiplier applied to the timeout after each unanswered attempt.
    pub backoff_factor: f64,
    /// Upper bound of the random spread applied to the initial timeout
    /// (`1.5` → the timeout lies in `[ack_timeout, 1.5 * ack_timeout)`).
    pub random_factor: f64,
    /// Number of retransmissions after the first attempt.
    pub max_retransmit: u32,
}

impl Default for RetransmitPolicy {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(2),
            backoff_factor: 2.0,
            random_factor: 1.5,
            max_retransmit: 4,
        }
    }
}

impl RetransmitPolicy {
    pub fn from_config(cfg: &TransportConfig) -> Self {
        Self {
            ack_timeout: Duration::from_millis(cfg.ack_timeout_ms),
            backoff_factor: cfg.backoff_factor,
            max_retransmit: cfg.max_retransmit,
            ..Default::default()
        }
    }

    /// Total transmissions, first attempt included.
    pub fn attempts(&self) -> u32 {
        self.max_retransmit.saturating_add(1)
    }

    /// Response timeout for `attempt` (0-indexed) of the exchange identified
    /// by `seed`.
    ///
    /// The initial timeout is spread over `[ack_timeout, random_factor *
    /// ack_timeout)` by a fraction derived from `seed`, then multiplied by
    /// `backoff_factor` for each retransmission.  Nodes seeded differently
    /// therefore retry on different schedules.
    pub fn timeout_for_attempt(&self, attempt: u32, seed: u32) -> Duration {
        let base_ms = self.ack_timeout.as_millis() as f64;
        let spread = (self.random_factor - 1.0).max(0.0) * seed_fraction(seed);
        let timeout_ms = base_ms * (1.0 + spread) * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis(timeout_ms as u64)
    }
}

/// FNV-1a over `bytes`, used to give each node its own jitter seed.
pub fn jitter_seed(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5u32, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(0x0100_0193)
    })
}

/// Deterministic fraction in `[0, 1)` for `seed`.  Not cryptographically
/// secure.
fn seed_fraction(seed: u32) -> f64 {
    // murmur3 finalizer: spreads nearby seeds (consecutive message ids)
    // across the whole range.
    let mut h = seed ^ 0x9e37_79b9;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    f64::from(h) / (f64::from(u32::MAX) + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_values() {
        let p = RetransmitPolicy::default();
        assert_eq!(p.ack_timeout, Duration::from_secs(2));
        assert_eq!(p.max_retransmit, 4);
        assert_eq!(p.attempts(), 5);
    }

    #[test]
    fn timeout_grows_with_backoff() {
        let p = RetransmitPolicy::default();
        let t0 = p.timeout_for_attempt(0, 7);
        let t1 = p.timeout_for_attempt(1, 7);
        let t2 = p.timeout_for_attempt(2, 7);
        assert!(t1 > t0);
        assert!(t2 > t1);
    }

    #[test]
    fn first_timeout_within_random_window() {
        let p = RetransmitPolicy::default();
        for seed in 0..64 {
            let t0 = p.timeout_for_attempt(0, seed);
            assert!(t0 >= Duration::from_secs(2), "seed {seed}: {t0:?}");
            assert!(t0 < Duration::from_secs(3), "seed {seed}: {t0:?}");
        }
    }

    #[test]
    fn first_timeout_varies_with_seed() {
        let p = RetransmitPolicy::default();
        let distinct: std::collections::HashSet<Duration> =
            (0..16).map(|seed| p.timeout_for_attempt(0, seed)).collect();
        assert!(distinct.len() > 8, "{distinct:?}");
    }

    #[test]
    fn jitter_seed_differs_per_endpoint() {
        let a = jitter_seed(b"ep=18.75.0.6.13.178.161");
        let b = jitter_seed(b"ep=18.75.0.6.13.178.162");
        assert_ne!(a, b);
        assert_eq!(a, jitter_seed(b"ep=18.75.0.6.13.178.161"));
    }

    #[test]
    fn no_spread_when_random_factor_is_one() {
        let p = RetransmitPolicy {
            ack_timeout: Duration::from_millis(100),
            backoff_factor: 2.0,
            random_factor: 1.0,
            max_retransmit: 2,
        };
        for seed in [0, 1, u32::MAX] {
            assert_eq!(p.timeout_for_attempt(0, seed), Duration::from_millis(100));
            assert_eq!(p.timeout_for_attempt(1, seed), Duration::from_millis(200));
            assert_eq!(p.timeout_for_attempt(2, seed), Duration::from_millis(400));
        }
    }

    #[test]
    fn from_config_copies_fields() {
        let cfg = TransportConfig {
            ack_timeout_ms: 500,
            backoff_factor: 1.5,
            max_retransmit: 1,
        };
        let p = RetransmitPolicy::from_config(&cfg);
        assert_eq!(p.ack_timeout, Duration::from_millis(500));
        assert_eq!(p.attempts(), 2);
        assert!((p.backoff_factor - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn max_retransmit_saturates() {
        let p = RetransmitPolicy {
            max_retransmit: u32::MAX,
            ..Default::default()
        };
        assert_eq!(p.attempts(), u32::MAX);
    }
}

//! Reel pacing configuration.

use core::fmt::Display;
use core::str::FromStr;
use std::time::Duration;

use skinvault_core::{DomainError, DomainResult};

/// Timing and randomness knobs for a spin.
///
/// Defaults reproduce the classic feel: 2–3 full cycles over 4 s, flat-out
/// for the first 2 s, then linearly easing from 30 ms to 200 ms per step.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Inclusive lower bound of full cycles before landing.
    pub min_cycles: u32,
    /// Exclusive upper bound of full cycles before landing.
    pub max_cycles: u32,
    /// Total animation duration `D`.
    pub duration: Duration,
    /// Deceleration breakpoint `B` (`B < D`).
    pub slowdown_at: Duration,
    /// Step interval before `B`.
    pub fast_interval: Duration,
    /// Step interval reached at `D`.
    pub slow_interval: Duration,
    /// Lower bound of any timer period.
    pub min_interval: Duration,
    /// Fraction of `D` after which the settle floor may kick in.
    pub settle_progress: f64,
    /// The settle floor applies while fewer than this many steps remain.
    pub settle_steps: u64,
    /// Settle floor as a multiple of `slow_interval`.
    pub settle_floor_factor: f64,
    /// Cosmetic pause between settling and announcing the win.
    pub won_delay: Duration,
    /// Fixed RNG seed for reproducible cycle counts and target picks.
    pub seed: Option<u64>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            min_cycles: 2,
            max_cycles: 4,
            duration: Duration::from_millis(4000),
            slowdown_at: Duration::from_millis(2000),
            fast_interval: Duration::from_millis(30),
            slow_interval: Duration::from_millis(200),
            min_interval: Duration::from_millis(30),
            settle_progress: 0.85,
            settle_steps: 5,
            settle_floor_factor: 1.5,
            won_delay: Duration::from_millis(300),
            seed: None,
        }
    }
}

impl RevealConfig {
    pub fn with_cycles(mut self, min: u32, max: u32) -> Self {
        self.min_cycles = min;
        self.max_cycles = max;
        self
    }

    /// Set `D` and `B` together.
    pub fn with_duration(mut self, duration: Duration, slowdown_at: Duration) -> Self {
        self.duration = duration;
        self.slowdown_at = slowdown_at;
        self
    }

    /// Set the fast / slow step intervals and the minimum timer period.
    pub fn with_intervals(mut self, fast: Duration, slow: Duration, min: Duration) -> Self {
        self.fast_interval = fast;
        self.slow_interval = slow;
        self.min_interval = min;
        self
    }

    pub fn with_won_delay(mut self, delay: Duration) -> Self {
        self.won_delay = delay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.min_cycles >= self.max_cycles {
            return Err(DomainError::validation(format!(
                "min_cycles ({}) must be below max_cycles ({})",
                self.min_cycles, self.max_cycles
            )));
        }
        if self.duration.is_zero() {
            return Err(DomainError::validation("duration must be positive"));
        }
        if self.slowdown_at >= self.duration {
            return Err(DomainError::validation("slowdown_at must be before duration"));
        }
        if self.fast_interval > self.slow_interval {
            return Err(DomainError::validation("fast_interval cannot exceed slow_interval"));
        }
        if self.min_interval.is_zero() {
            return Err(DomainError::validation("min_interval must be positive"));
        }
        if !(0.0..=1.0).contains(&self.settle_progress) {
            return Err(DomainError::validation("settle_progress must be within [0, 1]"));
        }
        if !self.settle_floor_factor.is_finite() || self.settle_floor_factor < 0.0 {
            return Err(DomainError::validation("settle_floor_factor must be a finite non-negative number"));
        }
        Ok(())
    }

    /// Load overrides from `SKINVAULT_REVEAL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through `get`, keyed like the environment variables.
    ///
    /// Unparsable values are logged and ignored; an inconsistent combination falls
    /// back to the defaults as a whole.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| setting::<u64>(&get, key);
        let millis = |key: &str| value(key).map(Duration::from_millis);
        let config = Self {
            min_cycles: setting(&get, "SKINVAULT_REVEAL_MIN_CYCLES").unwrap_or(defaults.min_cycles),
            max_cycles: setting(&get, "SKINVAULT_REVEAL_MAX_CYCLES").unwrap_or(defaults.max_cycles),
            duration: millis("SKINVAULT_REVEAL_DURATION_MS").unwrap_or(defaults.duration),
            slowdown_at: millis("SKINVAULT_REVEAL_SLOWDOWN_MS").unwrap_or(defaults.slowdown_at),
            fast_interval: millis("SKINVAULT_REVEAL_FAST_MS").unwrap_or(defaults.fast_interval),
            slow_interval: millis("SKINVAULT_REVEAL_SLOW_MS").unwrap_or(defaults.slow_interval),
            won_delay: millis("SKINVAULT_REVEAL_WON_DELAY_MS").unwrap_or(defaults.won_delay),
            seed: value("SKINVAULT_REVEAL_SEED").or(defaults.seed),
            ..defaults.clone()
        };

        match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(error = %err, "inconsistent reveal settings; using defaults");
                defaults
            }
        }
    }
}

fn setting<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, "ignoring invalid reveal setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RevealConfig::default();
        config.validate().unwrap();
        assert_eq!(config.duration, Duration::from_millis(4000));
        assert_eq!(config.slowdown_at, Duration::from_millis(2000));
        assert_eq!((config.min_cycles, config.max_cycles), (2, 4));
    }

    #[test]
    fn rejects_breakpoint_after_duration() {
        let config = RevealConfig::default()
            .with_duration(Duration::from_millis(1000), Duration::from_millis(1000));
        assert!(matches!(config.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_empty_cycle_range() {
        let config = RevealConfig::default().with_cycles(3, 3);
        assert!(matches!(config.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_inverted_intervals() {
        let config = RevealConfig::default().with_intervals(
            Duration::from_millis(300),
            Duration::from_millis(200),
            Duration::from_millis(30),
        );
        assert!(config.validate().is_err());
    }

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = RevealConfig::from_lookup(lookup(&[
            ("SKINVAULT_REVEAL_MIN_CYCLES", "3"),
            ("SKINVAULT_REVEAL_MAX_CYCLES", " 6 "),
            ("SKINVAULT_REVEAL_DURATION_MS", "5000"),
            ("SKINVAULT_REVEAL_SEED", "99"),
        ]));
        assert_eq!((config.min_cycles, config.max_cycles), (3, 6));
        assert_eq!(config.duration, Duration::from_millis(5000));
        assert_eq!(config.slowdown_at, Duration::from_millis(2000));
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn unparsable_value_keeps_the_default() {
        let config = RevealConfig::from_lookup(lookup(&[
            ("SKINVAULT_REVEAL_DURATION_MS", "abc"),
            ("SKINVAULT_REVEAL_WON_DELAY_MS", "100"),
        ]));
        assert_eq!(config.duration, Duration::from_millis(4000));
        assert_eq!(config.won_delay, Duration::from_millis(100));
    }

    #[test]
    fn inconsistent_overrides_revert_to_defaults() {
        let config = RevealConfig::from_lookup(lookup(&[
            ("SKINVAULT_REVEAL_MIN_CYCLES", "5"),
            ("SKINVAULT_REVEAL_MAX_CYCLES", "2"),
            ("SKINVAULT_REVEAL_WON_DELAY_MS", "100"),
        ]));
        assert_eq!(config, RevealConfig::default());
    }

    #[test]
    fn empty_lookup_is_default() {
        assert_eq!(RevealConfig::from_lookup(|_| None), RevealConfig::default());
    }
}

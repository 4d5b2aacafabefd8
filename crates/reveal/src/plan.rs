//! Landing math for a single spin.
//!
//! Everything here is a pure function of `(reel_len, target_index, cycles)` and
//! elapsed time, so the sequence of displayed indices is reproducible for a
//! given plan; only the wall-clock instants at which it is sampled vary.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use skinvault_core::{DomainError, DomainResult};

use crate::config::RevealConfig;

/// The fixed trajectory of one spin.
///
/// `total_steps = cycles * reel_len + target_index`, hence
/// `total_steps % reel_len == target_index`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SpinPlan {
    reel_len: usize,
    target_index: usize,
    cycles: u32,
    total_steps: u64,
}

impl SpinPlan {
    pub fn new(reel_len: usize, target_index: usize, cycles: u32) -> DomainResult<Self> {
        check_target(reel_len, target_index)?;

        let total_steps = u64::from(cycles) * reel_len as u64 + target_index as u64;
        Ok(Self {
            reel_len,
            target_index,
            cycles,
            total_steps,
        })
    }

    pub fn reel_len(&self) -> usize {
        self.reel_len
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Steps traversed after `elapsed`: `floor((t / D) * total_steps)`, capped at `total_steps`.
    pub fn step_at(&self, elapsed: Duration, duration: Duration) -> u64 {
        if elapsed >= duration {
            return self.total_steps;
        }
        // Integer nanos keep the floor exact.
        let traversed = elapsed.as_nanos() * u128::from(self.total_steps) / duration.as_nanos();
        traversed as u64
    }

    /// Index shown at `elapsed`.
    pub fn index_at(&self, elapsed: Duration, duration: Duration) -> usize {
        (self.step_at(elapsed, duration) % self.reel_len as u64) as usize
    }

    pub fn remaining_at(&self, elapsed: Duration, duration: Duration) -> u64 {
        self.total_steps - self.step_at(elapsed, duration)
    }

    /// Delay until the next tick when a tick fires at `elapsed`.
    ///
    /// Flat `fast_interval` up to the breakpoint, then linear towards
    /// `slow_interval` at `D`. Late in the spin, with only a handful of steps
    /// left, the interval is floored at `slow_interval * settle_floor_factor`.
    /// Never below `min_interval`.
    pub fn interval_at(&self, elapsed: Duration, config: &RevealConfig) -> Duration {
        let mut interval = config.fast_interval;

        if elapsed > config.slowdown_at {
            let window = config.duration.saturating_sub(config.slowdown_at).as_secs_f64();
            let slowdown = ((elapsed - config.slowdown_at).as_secs_f64() / window).min(1.0);
            let spread = config.slow_interval.saturating_sub(config.fast_interval);
            interval = config.fast_interval + spread.mul_f64(slowdown);
        }

        let progress = elapsed.as_secs_f64() / config.duration.as_secs_f64();
        if progress > config.settle_progress
            && self.remaining_at(elapsed, config.duration) < config.settle_steps
        {
            interval = interval.max(config.slow_interval.mul_f64(config.settle_floor_factor));
        }

        interval.max(config.min_interval)
    }
}

/// Reject an empty reel or a target outside it.
pub fn check_target(reel_len: usize, target_index: usize) -> DomainResult<()> {
    if reel_len == 0 {
        return Err(DomainError::validation("reel must contain at least one item"));
    }
    if target_index >= reel_len {
        return Err(DomainError::validation(format!(
            "target index {target_index} out of range for reel of {reel_len}"
        )));
    }
    Ok(())
}

/// Draw a cycle count uniformly from `[min_cycles, max_cycles)`.
pub fn pick_cycles<R: Rng>(rng: &mut R, config: &RevealConfig) -> u32 {
    rng.gen_range(config.min_cycles..config.max_cycles)
}

/// Draw the winning index uniformly from `[0, reel_len)`.
pub fn pick_target<R: Rng>(rng: &mut R, reel_len: usize) -> DomainResult<usize> {
    if reel_len == 0 {
        return Err(DomainError::validation("cannot pick a target from an empty reel"));
    }
    Ok(rng.gen_range(0..reel_len))
}

//! Reel state machine.
//!
//! `Idle -> Spinning -> Settled -> Spinning -> ...`. While spinning only
//! [`Reel::advance`] moves `current_index`; once settled `current_index` equals
//! `target_index` until the next spin starts.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use skinvault_core::{DomainResult, Item, SpinId};

use crate::config::RevealConfig;
use crate::plan::SpinPlan;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Spinning,
    Settled,
}

/// Snapshot of a reel, as handed to renderers.
///
/// Items are shared (`Arc<[Item]>`) so every frame is cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct ReelState {
    items: Arc<[Item]>,
    current_index: usize,
    target_index: usize,
    phase: Phase,
}

impl ReelState {
    pub fn idle() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            current_index: 0,
            target_index: 0,
            phase: Phase::Idle,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.items.get(self.current_index)
    }

    pub fn target_item(&self) -> Option<&Item> {
        self.items.get(self.target_index)
    }

    /// Items visible in a strip of `slots` cells centred on the current index.
    ///
    /// Slot `(slots - 1) / 2` shows the current item; neighbours wrap around the
    /// reel. An eight-slot strip shows offsets `-3..=4`.
    pub fn window(&self, slots: usize) -> Vec<&Item> {
        if self.items.is_empty() || slots == 0 {
            return Vec::new();
        }
        let len = self.items.len() as isize;
        let centre = ((slots - 1) / 2) as isize;
        (0..slots as isize)
            .map(|slot| {
                let index = (self.current_index as isize + slot - centre).rem_euclid(len);
                &self.items[index as usize]
            })
            .collect()
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Still spinning; schedule the next tick after `next_tick`.
    Frame {
        state: ReelState,
        next_tick: Duration,
        /// True exactly once per spin, on the first tick past the breakpoint.
        slowed_down: bool,
    },
    /// The spin reached `D` and landed on the target.
    Settled(ReelState),
    /// Nothing to do: the reel is idle or was already settled (e.g. skipped).
    Inactive,
}

/// A single reel. At most one spin is in flight at a time.
#[derive(Debug)]
pub struct Reel {
    config: RevealConfig,
    state: ReelState,
    plan: Option<SpinPlan>,
    spin_id: Option<SpinId>,
    slowed: bool,
}

impl Reel {
    pub fn new(config: RevealConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ReelState::idle(),
            plan: None,
            spin_id: None,
            slowed: false,
        })
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn state(&self) -> &ReelState {
        &self.state
    }

    pub fn plan(&self) -> Option<&SpinPlan> {
        self.plan.as_ref()
    }

    pub fn spin_id(&self) -> Option<SpinId> {
        self.spin_id
    }

    pub fn is_spinning(&self) -> bool {
        self.state.phase == Phase::Spinning
    }

    /// Begin a spin landing on `target_index` after `cycles` full turns.
    ///
    /// Invalid input is rejected before anything changes. Returns `Ok(None)`
    /// without touching the running spin if one is already in flight.
    pub fn start(
        &mut self,
        spin_id: SpinId,
        items: Arc<[Item]>,
        target_index: usize,
        cycles: u32,
    ) -> DomainResult<Option<SpinPlan>> {
        let plan = SpinPlan::new(items.len(), target_index, cycles)?;
        if self.is_spinning() {
            return Ok(None);
        }

        self.state = ReelState {
            items,
            current_index: 0,
            target_index,
            phase: Phase::Spinning,
        };
        self.plan = Some(plan);
        self.spin_id = Some(spin_id);
        self.slowed = false;
        Ok(Some(plan))
    }

    /// Recompute the displayed index for a tick firing at `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> Advance {
        let plan = match (self.state.phase, self.plan) {
            (Phase::Spinning, Some(plan)) => plan,
            _ => return Advance::Inactive,
        };

        if elapsed >= self.config.duration {
            return Advance::Settled(self.settle());
        }

        self.state.current_index = plan.index_at(elapsed, self.config.duration);

        let slowed_down = !self.slowed && elapsed > self.config.slowdown_at;
        if slowed_down {
            self.slowed = true;
        }

        Advance::Frame {
            state: self.state.clone(),
            next_tick: plan.interval_at(elapsed, &self.config),
            slowed_down,
        }
    }

    /// Jump straight to the settled state. `None` if no spin is in flight.
    pub fn skip(&mut self) -> Option<ReelState> {
        if !self.is_spinning() {
            return None;
        }
        Some(self.settle())
    }

    fn settle(&mut self) -> ReelState {
        self.state.current_index = self.state.target_index;
        self.state.phase = Phase::Settled;
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use skinvault_core::ItemId;
    use skinvault_core::DomainError;
    use uuid::Uuid;

    fn reel_of(labels: &[&str]) -> Arc<[Item]> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| Item::new(ItemId::from_uuid(Uuid::from_u128(i as u128 + 1)), *label))
            .collect()
    }

    fn run_to_completion(reel: &mut Reel) -> (Vec<usize>, ReelState) {
        let mut elapsed = Duration::ZERO;
        let mut indices = Vec::new();
        loop {
            match reel.advance(elapsed) {
                Advance::Frame { state, next_tick, .. } => {
                    indices.push(state.current_index());
                    elapsed += next_tick;
                }
                Advance::Settled(state) => return (indices, state),
                Advance::Inactive => panic!("reel stopped without settling"),
            }
        }
    }

    #[test]
    fn natural_completion_lands_on_target() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        let plan = reel
            .start(SpinId::new(), reel_of(&["A", "B", "C"]), 1, 2)
            .unwrap()
            .unwrap();
        assert_eq!(plan.total_steps(), 7);

        let (indices, settled) = run_to_completion(&mut reel);
        assert!(!indices.is_empty());
        assert_eq!(indices[0], 0);
        assert_eq!(settled.phase(), Phase::Settled);
        assert_eq!(settled.current_index(), 1);
        assert_eq!(settled.current_item().unwrap().label, "B");

        assert_eq!(reel.advance(Duration::from_secs(10)), Advance::Inactive);
    }

    #[test]
    fn same_plan_same_indices() {
        let items = reel_of(&["A", "B", "C", "D", "E"]);
        let mut first = Reel::new(RevealConfig::default()).unwrap();
        let mut second = Reel::new(RevealConfig::default()).unwrap();
        first.start(SpinId::new(), items.clone(), 4, 3).unwrap();
        second.start(SpinId::new(), items, 4, 3).unwrap();

        assert_eq!(run_to_completion(&mut first).0, run_to_completion(&mut second).0);
    }

    #[test]
    fn slowed_down_reported_once() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        reel.start(SpinId::new(), reel_of(&["A", "B"]), 0, 2).unwrap();

        let mut elapsed = Duration::ZERO;
        let mut reports = 0;
        while let Advance::Frame { slowed_down, next_tick, .. } = reel.advance(elapsed) {
            if slowed_down {
                reports += 1;
                assert!(elapsed > Duration::from_millis(2000));
            }
            elapsed += next_tick;
        }
        assert_eq!(reports, 1);
    }

    #[test]
    fn restart_while_spinning_is_ignored() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        let first = SpinId::new();
        reel.start(first, reel_of(&["A", "B", "C"]), 2, 2).unwrap();
        reel.advance(Duration::from_millis(500));

        let again = reel.start(SpinId::new(), reel_of(&["X"]), 0, 3).unwrap();
        assert!(again.is_none());
        assert_eq!(reel.spin_id(), Some(first));
        assert_eq!(reel.state().target_index(), 2);
        assert_eq!(reel.state().items().len(), 3);
    }

    #[test]
    fn empty_reel_is_rejected_without_side_effects() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        let err = reel.start(SpinId::new(), reel_of(&[]), 0, 2).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(reel.state().phase(), Phase::Idle);
        assert!(reel.plan().is_none());
    }

    #[test]
    fn skip_settles_and_stops_the_loop() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        reel.start(SpinId::new(), reel_of(&["A", "B", "C", "D"]), 3, 2).unwrap();
        reel.advance(Duration::from_millis(100));

        let settled = reel.skip().unwrap();
        assert_eq!(settled.phase(), Phase::Settled);
        assert_eq!(settled.current_index(), 3);

        assert_eq!(reel.advance(Duration::from_millis(130)), Advance::Inactive);
        assert!(reel.skip().is_none());
    }

    #[test]
    fn settled_reel_can_spin_again() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        reel.start(SpinId::new(), reel_of(&["A", "B"]), 1, 2).unwrap();
        reel.skip();
        let plan = reel.start(SpinId::new(), reel_of(&["A", "B"]), 0, 2).unwrap();
        assert!(plan.is_some());
        assert!(reel.is_spinning());
        assert_eq!(reel.state().current_index(), 0);
    }

    #[test]
    fn eight_slot_window_wraps() {
        let mut reel = Reel::new(RevealConfig::default()).unwrap();
        reel.start(SpinId::new(), reel_of(&["A", "B", "C", "D", "E"]), 1, 2).unwrap();
        let state = reel.skip().unwrap();

        let labels: Vec<&str> = state.window(8).iter().map(|i| i.label.as_str()).collect();
        // current = B (1); offsets -3..=4
        assert_eq!(labels, ["D", "E", "A", "B", "C", "D", "E", "A"]);
        assert!(ReelState::idle().window(8).is_empty());
    }

    #[test]
    fn inconsistent_config_is_rejected() {
        let config = RevealConfig::default().with_intervals(
            Duration::from_millis(300),
            Duration::from_millis(200),
            Duration::from_millis(30),
        );
        assert!(matches!(Reel::new(config), Err(DomainError::Validation(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: any spin driven by its own intervals settles on the target.
        #[test]
        fn every_spin_settles_on_target(
            len in 1usize..64,
            target_seed in any::<usize>(),
            cycles in 2u32..4,
        ) {
            let labels: Vec<String> = (0..len).map(|i| format!("skin-{i}")).collect();
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            let target = target_seed % len;

            let mut reel = Reel::new(RevealConfig::default()).unwrap();
            reel.start(SpinId::new(), reel_of(&refs), target, cycles).unwrap();
            let (indices, settled) = run_to_completion(&mut reel);

            prop_assert!(indices.iter().all(|i| *i < len));
            prop_assert_eq!(settled.current_index(), target);
            prop_assert_eq!(settled.phase(), Phase::Settled);
        }

        /// Property: skipping at any point before D yields the settled target.
        #[test]
        fn skip_at_any_time_settles(
            len in 1usize..32,
            target_seed in any::<usize>(),
            skip_ms in 0u64..4000,
        ) {
            let labels: Vec<String> = (0..len).map(|i| format!("skin-{i}")).collect();
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            let target = target_seed % len;

            let mut reel = Reel::new(RevealConfig::default()).unwrap();
            reel.start(SpinId::new(), reel_of(&refs), target, 2).unwrap();
            let _ = reel.advance(Duration::from_millis(skip_ms));

            let settled = reel.skip().unwrap();
            prop_assert_eq!(settled.current_index(), target);
            prop_assert_eq!(reel.advance(Duration::from_millis(skip_ms + 30)), Advance::Inactive);
        }
    }
}

//! Self-pacing driver for a [`Reel`].
//!
//! Each spin runs on its own named thread. A tick locks the reel, checks that the
//! spin is still live, publishes one state and then waits on a wake channel for
//! the interval computed at that instant. `skip()` settles the reel under the
//! same lock, so once the terminal state is published no further frame of that
//! spin can follow.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use skinvault_core::{DomainError, DomainResult, Item, SpinId};
use skinvault_events::EventBus;

use crate::audio::{AudioCues, Cue, SilentAudio, play_cue};
use crate::config::RevealConfig;
use crate::event::{ItemWon, ReelFrame, RevealEvent, SpinSettled, SpinStarted};
use crate::plan::{SpinPlan, check_target, pick_cycles, pick_target};
use crate::reel::{Advance, Reel, ReelState};

/// Result of asking for a spin.
#[derive(Debug)]
pub enum StartOutcome {
    Started(SpinHandle),
    /// A spin was already in flight; it continues unaffected.
    Ignored,
}

impl StartOutcome {
    pub fn handle(self) -> Option<SpinHandle> {
        match self {
            StartOutcome::Started(handle) => Some(handle),
            StartOutcome::Ignored => None,
        }
    }
}

/// Handle to a running spin.
#[derive(Debug)]
pub struct SpinHandle {
    spin_id: SpinId,
    plan: SpinPlan,
    join: Option<thread::JoinHandle<()>>,
}

impl SpinHandle {
    pub fn spin_id(&self) -> SpinId {
        self.spin_id
    }

    pub fn plan(&self) -> SpinPlan {
        self.plan
    }

    /// Block until the driver thread has published its last event.
    pub fn wait(mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!(spin_id = %self.spin_id, "reveal driver panicked");
            }
        }
    }
}

struct Shared<B, A> {
    config: RevealConfig,
    reel: Mutex<Reel>,
    bus: Arc<B>,
    audio: Arc<A>,
}

impl<B, A> Shared<B, A>
where
    B: EventBus<RevealEvent> + 'static,
    A: AudioCues + 'static,
{
    fn lock_reel(&self) -> MutexGuard<'_, Reel> {
        self.reel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: RevealEvent) {
        let event_type = skinvault_events::Event::event_type(&event);
        if let Err(err) = self.bus.publish(event) {
            warn!(event_type, error = ?err, "failed to publish reveal event");
        }
    }

    fn publish_won(&self, spin_id: SpinId, state: &ReelState) {
        let Some(item) = state.target_item().cloned() else {
            return;
        };
        play_cue(self.audio.as_ref(), Cue::Reveal);
        info!(%spin_id, item = %item.label, "item won");
        self.publish(RevealEvent::ItemWon(ItemWon {
            spin_id,
            item,
            occurred_at: Utc::now(),
        }));
    }
}

/// Drives one reel: start, tick, skip.
pub struct RevealScheduler<B, A = SilentAudio> {
    shared: Arc<Shared<B, A>>,
    rng: Mutex<StdRng>,
    wake: Mutex<Option<Sender<()>>>,
}

impl<B> RevealScheduler<B, SilentAudio>
where
    B: EventBus<RevealEvent> + 'static,
{
    pub fn new(config: RevealConfig, bus: Arc<B>) -> DomainResult<Self> {
        Self::with_audio(config, bus, Arc::new(SilentAudio))
    }
}

impl<B, A> RevealScheduler<B, A>
where
    B: EventBus<RevealEvent> + 'static,
    A: AudioCues + 'static,
{
    pub fn with_audio(config: RevealConfig, bus: Arc<B>, audio: Arc<A>) -> DomainResult<Self> {
        let reel = Reel::new(config.clone())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            shared: Arc::new(Shared {
                reel: Mutex::new(reel),
                config,
                bus,
                audio,
            }),
            rng: Mutex::new(rng),
            wake: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RevealConfig {
        &self.shared.config
    }

    pub fn is_spinning(&self) -> bool {
        self.shared.lock_reel().is_spinning()
    }

    pub fn state(&self) -> ReelState {
        self.shared.lock_reel().state().clone()
    }

    /// Pick a winner uniformly, then spin towards it.
    pub fn open(&self, items: impl Into<Arc<[Item]>>) -> DomainResult<StartOutcome> {
        let items = items.into();
        check_target(items.len(), 0)?;
        let reel_len = items.len();
        self.launch(items, |rng| pick_target(rng, reel_len))
    }

    /// Spin `items` so that the reel lands on `target_index`.
    ///
    /// Rejects an empty reel or an out-of-range target. Ignored while a spin is
    /// already in flight.
    pub fn start_spin(
        &self,
        items: impl Into<Arc<[Item]>>,
        target_index: usize,
    ) -> DomainResult<StartOutcome> {
        let items = items.into();
        check_target(items.len(), target_index)?;
        self.launch(items, |_| Ok(target_index))
    }

    /// Draws from the RNG only once the reel has accepted the spin, so ignored
    /// starts leave a seeded sequence untouched.
    fn launch(
        &self,
        items: Arc<[Item]>,
        choose_target: impl FnOnce(&mut StdRng) -> DomainResult<usize>,
    ) -> DomainResult<StartOutcome> {
        let spin_id = SpinId::new();

        let (plan, wake_rx) = {
            let mut reel = self.shared.lock_reel();
            if reel.is_spinning() {
                debug!(active = ?reel.spin_id(), "spin already in flight; start ignored");
                return Ok(StartOutcome::Ignored);
            }

            let (target_index, cycles) = {
                let mut rng = self.lock_rng();
                let target_index = choose_target(&mut *rng)?;
                (target_index, pick_cycles(&mut *rng, &self.shared.config))
            };
            let Some(plan) = reel.start(spin_id, items, target_index, cycles)? else {
                return Ok(StartOutcome::Ignored);
            };
            self.shared.publish(RevealEvent::SpinStarted(SpinStarted {
                spin_id,
                target_index,
                cycles,
                total_steps: plan.total_steps(),
                occurred_at: Utc::now(),
            }));

            // Installed under the reel lock so the sender always belongs to the
            // spin that currently owns the reel.
            let (wake_tx, wake_rx) = mpsc::channel();
            *self.wake.lock().unwrap_or_else(PoisonError::into_inner) = Some(wake_tx);
            (plan, wake_rx)
        };

        info!(
            %spin_id,
            reel_len = plan.reel_len(),
            target_index = plan.target_index(),
            cycles = plan.cycles(),
            total_steps = plan.total_steps(),
            "spin started"
        );
        play_cue(self.shared.audio.as_ref(), Cue::SpinStart);

        let shared = Arc::clone(&self.shared);
        let join = thread::Builder::new()
            .name(format!("reveal-{spin_id}"))
            .spawn(move || drive(shared, spin_id, wake_rx))
            .map_err(|e| {
                self.shared.lock_reel().skip();
                DomainError::invariant(format!("failed to spawn reveal driver: {e}"))
            })?;

        Ok(StartOutcome::Started(SpinHandle {
            spin_id,
            plan,
            join: Some(join),
        }))
    }

    /// Settle the in-flight spin immediately.
    ///
    /// Publishes the terminal state and the win, then wakes the driver so it can
    /// observe the cancellation and exit. Returns `false` if nothing was spinning.
    pub fn skip(&self) -> bool {
        {
            let mut reel = self.shared.lock_reel();
            let Some(spin_id) = reel.spin_id() else {
                return false;
            };
            let Some(state) = reel.skip() else {
                return false;
            };

            info!(%spin_id, target_index = state.target_index(), "spin skipped");
            play_cue(self.shared.audio.as_ref(), Cue::Settle);
            self.shared.publish(RevealEvent::Settled(SpinSettled {
                spin_id,
                state: state.clone(),
                skipped: true,
                occurred_at: Utc::now(),
            }));
            self.shared.publish_won(spin_id, &state);
        }

        if let Some(wake) = self.wake.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            let _ = wake.send(());
        }
        true
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn drive<B, A>(shared: Arc<Shared<B, A>>, spin_id: SpinId, wake: Receiver<()>)
where
    B: EventBus<RevealEvent> + 'static,
    A: AudioCues + 'static,
{
    let started = Instant::now();

    let settled = loop {
        let next_tick = {
            let mut reel = shared.lock_reel();
            if reel.spin_id() != Some(spin_id) {
                debug!(%spin_id, "reel taken over by a newer spin; driver exiting");
                return;
            }
            match reel.advance(started.elapsed()) {
                Advance::Inactive => {
                    debug!(%spin_id, "spin no longer live; driver exiting");
                    return;
                }
                Advance::Settled(state) => {
                    info!(%spin_id, target_index = state.target_index(), "spin settled");
                    play_cue(shared.audio.as_ref(), Cue::Settle);
                    shared.publish(RevealEvent::Settled(SpinSettled {
                        spin_id,
                        state: state.clone(),
                        skipped: false,
                        occurred_at: Utc::now(),
                    }));
                    break state;
                }
                Advance::Frame {
                    state,
                    next_tick,
                    slowed_down,
                } => {
                    if slowed_down {
                        debug!(%spin_id, "spin slowing down");
                        play_cue(shared.audio.as_ref(), Cue::SlowDown);
                        shared.publish(RevealEvent::SlowedDown {
                            spin_id,
                            occurred_at: Utc::now(),
                        });
                    }
                    shared.publish(RevealEvent::Frame(ReelFrame {
                        spin_id,
                        state,
                        occurred_at: Utc::now(),
                    }));
                    next_tick
                }
            }
        };

        pause(&wake, next_tick);
    };

    pause(&wake, shared.config.won_delay);
    shared.publish_won(spin_id, &settled);
}

/// Wait for `delay` or until woken, whichever comes first.
fn pause(wake: &Receiver<()>, delay: Duration) {
    match wake.recv_timeout(delay) {
        Ok(()) | Err(RecvTimeoutError::Timeout) => {}
        // Scheduler dropped or superseded: keep pacing without a wake source.
        Err(RecvTimeoutError::Disconnected) => thread::sleep(delay),
    }
}

//! The crate-opening reel.
//!
//! A spin lands on a target chosen **before** the first frame. The reel itself is a
//! pure state machine ([`Reel`]) advanced with elapsed time; [`RevealScheduler`]
//! drives it from a self-pacing timer loop, publishes every state to an
//! [`EventBus`](skinvault_events::EventBus) and accepts a cooperative skip.

pub mod audio;
pub mod config;
pub mod event;
pub mod plan;
pub mod reel;
pub mod scheduler;

pub use audio::{AudioCues, AudioError, Cue, SilentAudio};
pub use config::RevealConfig;
pub use event::{ItemWon, ReelFrame, RevealEvent, SpinSettled, SpinStarted};
pub use plan::{SpinPlan, check_target, pick_cycles, pick_target};
pub use reel::{Advance, Phase, Reel, ReelState};
pub use scheduler::{RevealScheduler, SpinHandle, StartOutcome};

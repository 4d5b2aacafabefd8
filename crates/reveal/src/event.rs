//! Events published while a reel spins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skinvault_core::{Item, SpinId};
use skinvault_events::Event;

use crate::reel::ReelState;

/// Event: a spin was accepted and its outcome fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinStarted {
    pub spin_id: SpinId,
    pub target_index: usize,
    pub cycles: u32,
    pub total_steps: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: an intermediate reel position.
#[derive(Debug, Clone, PartialEq)]
pub struct ReelFrame {
    pub spin_id: SpinId,
    pub state: ReelState,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the terminal state of a spin. No frame of the same spin follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinSettled {
    pub spin_id: SpinId,
    pub state: ReelState,
    pub skipped: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the target item was won. Consumed by the inventory recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWon {
    pub spin_id: SpinId,
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    SpinStarted(SpinStarted),
    Frame(ReelFrame),
    SlowedDown {
        spin_id: SpinId,
        occurred_at: DateTime<Utc>,
    },
    Settled(SpinSettled),
    ItemWon(ItemWon),
}

impl RevealEvent {
    pub fn spin_id(&self) -> SpinId {
        match self {
            RevealEvent::SpinStarted(e) => e.spin_id,
            RevealEvent::Frame(e) => e.spin_id,
            RevealEvent::SlowedDown { spin_id, .. } => *spin_id,
            RevealEvent::Settled(e) => e.spin_id,
            RevealEvent::ItemWon(e) => e.spin_id,
        }
    }
}

impl Event for RevealEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RevealEvent::SpinStarted(_) => "reveal.spin.started",
            RevealEvent::Frame(_) => "reveal.spin.frame",
            RevealEvent::SlowedDown { .. } => "reveal.spin.slowed_down",
            RevealEvent::Settled(_) => "reveal.spin.settled",
            RevealEvent::ItemWon(_) => "reveal.item.won",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RevealEvent::SpinStarted(e) => e.occurred_at,
            RevealEvent::Frame(e) => e.occurred_at,
            RevealEvent::SlowedDown { occurred_at, .. } => *occurred_at,
            RevealEvent::Settled(e) => e.occurred_at,
            RevealEvent::ItemWon(e) => e.occurred_at,
        }
    }
}

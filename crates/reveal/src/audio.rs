//! Audio-cue port.
//!
//! Cues are advisory: a failing or missing sound is logged and the spin carries on.

use serde::Serialize;
use thiserror::Error;

/// Points in a spin where a host may play a sound.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    SpinStart,
    SlowDown,
    Settle,
    Reveal,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no sound loaded for cue {0:?}")]
    Missing(Cue),

    #[error("playback failed: {0}")]
    Playback(String),
}

/// Injected sound player.
pub trait AudioCues: Send + Sync {
    fn play(&self, cue: Cue) -> Result<(), AudioError>;
}

/// Plays nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct SilentAudio;

impl AudioCues for SilentAudio {
    fn play(&self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}

pub(crate) fn play_cue<A: AudioCues + ?Sized>(audio: &A, cue: Cue) {
    if let Err(err) = audio.play(cue) {
        tracing::warn!(?cue, error = %err, "audio cue failed");
    }
}

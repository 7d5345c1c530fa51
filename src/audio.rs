//! Sound cue dispatch
//!
//! The simulation never plays sound itself. Hosts drain `MatchEvent`s and
//! hand them to an [`AudioManager`], which maps them to cues and forwards
//! them to whatever [`AudioSink`] the platform provides.

use crate::Settings;
use crate::sim::MatchEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player left the ground
    Jump,
    /// Running on the ground
    Footstep,
    /// Projectile detonated
    Explosion,
    /// Player took damage
    Hurt,
    /// Match won
    Victory,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump",
            SoundEffect::Footstep => "footstep",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Hurt => "hurt",
            SoundEffect::Victory => "victory",
        }
    }

    /// Mix level relative to the other effects
    fn base_gain(&self) -> f32 {
        match self {
            SoundEffect::Footstep => 0.4,
            SoundEffect::Jump => 0.7,
            SoundEffect::Hurt => 0.8,
            SoundEffect::Explosion | SoundEffect::Victory => 1.0,
        }
    }

    /// The cue a match event should trigger, if any
    pub fn for_event(event: &MatchEvent) -> Option<Self> {
        match event {
            MatchEvent::Jumped { .. } => Some(SoundEffect::Jump),
            MatchEvent::Footstep { .. } => Some(SoundEffect::Footstep),
            MatchEvent::Exploded { .. } => Some(SoundEffect::Explosion),
            MatchEvent::PlayerHurt { .. } | MatchEvent::PlayerFell { .. } => Some(SoundEffect::Hurt),
            MatchEvent::Victory { .. } => Some(SoundEffect::Victory),
            _ => None,
        }
    }
}

/// Platform audio output
pub trait AudioSink {
    /// Start playing `effect` at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards everything (tests, headless runs without logging)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Reports cues through the log instead of a speaker
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {} @ {volume:.2}", effect.name());
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(sink: S, settings: &Settings) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.base_gain();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play the cues for a batch of drained match events
    pub fn play_events(&mut self, events: &[MatchEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

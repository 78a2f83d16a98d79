//! Audio system using Web Audio API
//!
//! Sound effects are generated procedurally with oscillators; the background
//! music is a looping `<audio>` element. Native builds get silent sinks.

use crate::sim::GameEvent;

/// Background track, relative to the page
pub const MUSIC_URL: &str = "sounds/vexento-pixel-party.mp3";

/// Default music volume
pub const DEFAULT_MUSIC_VOLUME: f32 = 0.3;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// MON token collected
    Collect,
    /// Gas bomb hit
    Boom,
    /// Level reached
    LevelUp,
    /// Last life lost
    GameOver,
}

impl SoundEffect {
    /// Mix level relative to the sfx volume
    pub fn gain(&self) -> f32 {
        match self {
            SoundEffect::Collect => 0.7,
            SoundEffect::Boom => 0.8,
            SoundEffect::LevelUp => 0.5,
            SoundEffect::GameOver => 0.6,
        }
    }
}

/// Cue for a game event, if it has one
pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::TokenCollected { .. } => Some(SoundEffect::Collect),
        GameEvent::BombHit { .. } => Some(SoundEffect::Boom),
        GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
        GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
        _ => None,
    }
}

/// Clamp a user supplied volume into 0..=1; garbage mutes
pub fn clamp_volume(vol: f32) -> f32 {
    if vol.is_finite() { vol.clamp(0.0, 1.0) } else { 0.0 }
}

/// Fire-and-forget effect playback
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Effects volume after the master fader
    fn set_volume(&mut self, _vol: f32) {}
}

/// Sink that plays nothing (native builds, headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, effect: SoundEffect) {
        log::debug!("Sound: {:?}", effect);
    }
}

/// Looping background music with play/pause/volume
pub struct MusicTrack {
    playing: bool,
    volume: f32,
    #[cfg(target_arch = "wasm32")]
    element: Option<web_sys::HtmlAudioElement>,
}

impl Default for MusicTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicTrack {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self::with_source(MUSIC_URL)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn with_source(url: &str) -> Self {
        let element = web_sys::HtmlAudioElement::new_with_src(url).ok();
        match &element {
            Some(el) => {
                el.set_loop(true);
                el.set_volume(DEFAULT_MUSIC_VOLUME as f64);
            }
            None => log::warn!("Failed to create audio element - music disabled"),
        }
        Self {
            playing: false,
            volume: DEFAULT_MUSIC_VOLUME,
            element,
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            playing: false,
            volume: DEFAULT_MUSIC_VOLUME,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Start the track. Browsers may refuse before a user gesture; the
    /// refusal is logged and the track stays marked as wanted.
    pub fn play(&mut self) {
        self.playing = true;
        #[cfg(target_arch = "wasm32")]
        if let Some(el) = &self.element {
            match el.play() {
                Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        log::warn!("Music playback blocked: {:?}", err);
                    }
                }),
                Err(err) => log::warn!("Music playback failed: {:?}", err),
            }
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
        #[cfg(target_arch = "wasm32")]
        if let Some(el) = &self.element {
            let _ = el.pause();
        }
    }

    /// Flip between playing and paused; returns the new state
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    pub fn set_volume(&mut self, vol: f32) {
        self.volume = clamp_volume(vol);
        #[cfg(target_arch = "wasm32")]
        if let Some(el) = &self.element {
            el.set_volume(self.volume as f64);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, clamp_volume};

    /// Procedural effects on a shared `AudioContext`
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 1.0 }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short rising bip
        fn play_collect(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [880.0, 1320.0].iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * 0.06;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.1).ok();
            }
        }

        /// Low sawtooth sweep with a noisy crack on top
        fn play_boom(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.frequency().set_value_at_time(120.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.5).ok();
            }
            if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.15, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }

        /// Rising arpeggio
        fn play_level_up(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [500.0, 630.0, 750.0, 1000.0].iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * 0.08;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }

        /// Sad descending line
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * 0.2;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.volume * effect.gain();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Collect => self.play_collect(ctx, vol),
                SoundEffect::Boom => self.play_boom(ctx, vol),
                SoundEffect::LevelUp => self.play_level_up(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        fn set_volume(&mut self, vol: f32) {
            self.volume = clamp_volume(vol);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::ScoreSubmission;
    use crate::session::UserId;

    #[test]
    fn test_event_cues() {
        assert_eq!(
            sound_for(&GameEvent::TokenCollected { reward: 50, total: 1 }),
            Some(SoundEffect::Collect)
        );
        assert_eq!(
            sound_for(&GameEvent::BombHit { lives_remaining: 2 }),
            Some(SoundEffect::Boom)
        );
        assert_eq!(sound_for(&GameEvent::Paused), None);
        assert_eq!(
            sound_for(&GameEvent::ScoreRecorded(ScoreSubmission {
                user_id: UserId::new("u"),
                score: 1,
                mon_tokens: 0,
                level_reached: 1,
            })),
            None
        );
    }

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(0.5), 0.5);
        assert_eq!(clamp_volume(-1.0), 0.0);
        assert_eq!(clamp_volume(3.0), 1.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
    }

    #[test]
    fn test_music_toggle_and_volume() {
        let mut music = MusicTrack::new();
        assert!(!music.is_playing());
        assert_eq!(music.volume(), DEFAULT_MUSIC_VOLUME);

        assert!(music.toggle());
        assert!(music.is_playing());
        assert!(!music.toggle());

        music.set_volume(1.7);
        assert_eq!(music.volume(), 1.0);
    }
}

//! Audio system over a pluggable mixer backend
//!
//! `AudioManager` owns the policy: enable flags, volumes and which effects
//! have a sound asset. The `Mixer` it drives only starts and stops voices.

use std::path::{Path, PathBuf};

use crate::error::RacerError;
use crate::settings::GameConfig;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    /// Looping engine hum while a run is active
    Engine,
    /// Player hit an enemy
    Crash,
    /// Orb collected
    Pickup,
    /// Menu confirm
    Click,
    /// Menu selection changed
    Hover,
}

impl Sfx {
    pub const ALL: [Sfx; 5] = [Sfx::Engine, Sfx::Crash, Sfx::Pickup, Sfx::Click, Sfx::Hover];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sfx::Engine => "engine",
            Sfx::Crash => "crash",
            Sfx::Pickup => "pickup",
            Sfx::Click => "click",
            Sfx::Hover => "hover",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn file_name(&self) -> String {
        format!("{}.wav", self.as_str())
    }
}

/// Loop count meaning "until stopped"
pub const LOOP_FOREVER: i32 = -1;

/// Playback backend. Calls are fire-and-forget.
pub trait Mixer {
    fn start(&mut self, sfx: Sfx, loops: i32, volume: f32);
    fn halt(&mut self, sfx: Sfx);
    fn halt_all(&mut self);
    fn start_music(&mut self, file: &Path, volume: f32);
    fn halt_music(&mut self);
}

/// Headless backend that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMixer;

impl Mixer for LogMixer {
    fn start(&mut self, sfx: Sfx, loops: i32, volume: f32) {
        log::debug!("play {} (loops={}, volume={:.2})", sfx.as_str(), loops, volume);
    }

    fn halt(&mut self, sfx: Sfx) {
        log::debug!("stop {}", sfx.as_str());
    }

    fn halt_all(&mut self) {
        log::debug!("stop all effects");
    }

    fn start_music(&mut self, file: &Path, volume: f32) {
        log::debug!("music {} (volume={:.2})", file.display(), volume);
    }

    fn halt_music(&mut self) {
        log::debug!("stop music");
    }
}

/// Path of the sound file for `sfx` under `dir`
pub fn probe_asset(dir: &Path, sfx: Sfx) -> Result<PathBuf, RacerError> {
    let path = dir.join(sfx.file_name());
    if path.is_file() {
        Ok(path)
    } else {
        Err(RacerError::AssetMissing(path))
    }
}

/// Audio manager for the game
pub struct AudioManager<M: Mixer> {
    mixer: M,
    sound_enabled: bool,
    music_enabled: bool,
    sound_volume: f32,
    music_volume: f32,
    /// Effects whose asset was not found
    missing: Vec<Sfx>,
}

impl<M: Mixer> AudioManager<M> {
    pub fn new(mixer: M, config: &GameConfig) -> Self {
        Self {
            mixer,
            sound_enabled: config.sound_on,
            music_enabled: config.music_on,
            sound_volume: config.sound_volume.clamp(0.0, 1.0),
            music_volume: config.music_volume.clamp(0.0, 1.0),
            missing: Vec::new(),
        }
    }

    /// Probe `<dir>/<name>.wav` for every effect; absent files disable that effect
    pub fn with_asset_dir(mut self, dir: &Path) -> Self {
        self.missing = Sfx::ALL
            .into_iter()
            .filter(|&sfx| match probe_asset(dir, sfx) {
                Ok(_) => false,
                Err(e) => {
                    log::debug!("{}", e);
                    true
                }
            })
            .collect();
        if !self.missing.is_empty() {
            log::warn!(
                "{} of {} sound effects missing under {}, those stay silent",
                self.missing.len(),
                Sfx::ALL.len(),
                dir.display()
            );
        }
        self
    }

    pub fn is_available(&self, sfx: Sfx) -> bool {
        !self.missing.contains(&sfx)
    }

    /// Play a sound effect; `loops` of 0 plays once
    pub fn play(&mut self, sfx: Sfx, loops: i32) {
        if !self.sound_enabled || self.sound_volume <= 0.0 || !self.is_available(sfx) {
            return;
        }
        self.mixer.start(sfx, loops, self.sound_volume);
    }

    /// Play by effect name; unknown names are ignored
    pub fn play_named(&mut self, name: &str, loops: i32) {
        match Sfx::from_name(name) {
            Some(sfx) => self.play(sfx, loops),
            None => log::debug!("Unknown sound effect '{}'", name),
        }
    }

    pub fn stop(&mut self, sfx: Sfx) {
        self.mixer.halt(sfx);
    }

    pub fn stop_all(&mut self) {
        self.mixer.halt_all();
    }

    pub fn play_music(&mut self, file: impl Into<PathBuf>) {
        if !self.music_enabled || self.music_volume <= 0.0 {
            return;
        }
        self.mixer.start_music(&file.into(), self.music_volume);
    }

    pub fn stop_music(&mut self) {
        self.mixer.halt_music();
    }

    /// Set effects volume (0.0 - 1.0)
    pub fn set_sound_volume(&mut self, vol: f32) {
        self.sound_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Disabling effects also silences anything still playing
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
        if !enabled {
            self.mixer.halt_all();
        }
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        if !enabled {
            self.mixer.halt_music();
        }
    }

    pub fn sound_volume(&self) -> f32 {
        self.sound_volume
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    pub fn mixer(&self) -> &M {
        &self.mixer
    }
}

/// Test double that records every backend call
#[cfg(test)]
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct RecordingMixer {
    pub calls: Vec<MixerCall>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MixerCall {
    Start(Sfx, i32),
    Halt(Sfx),
    HaltAll,
    StartMusic(PathBuf),
    HaltMusic,
}

#[cfg(test)]
impl RecordingMixer {
    pub fn count(&self, call: &MixerCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn starts(&self, sfx: Sfx) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MixerCall::Start(s, _) if *s == sfx))
            .count()
    }
}

#[cfg(test)]
impl Mixer for RecordingMixer {
    fn start(&mut self, sfx: Sfx, loops: i32, _volume: f32) {
        self.calls.push(MixerCall::Start(sfx, loops));
    }

    fn halt(&mut self, sfx: Sfx) {
        self.calls.push(MixerCall::Halt(sfx));
    }

    fn halt_all(&mut self) {
        self.calls.push(MixerCall::HaltAll);
    }

    fn start_music(&mut self, file: &Path, _volume: f32) {
        self.calls.push(MixerCall::StartMusic(file.to_path_buf()));
    }

    fn halt_music(&mut self) {
        self.calls.push(MixerCall::HaltMusic);
    }
}

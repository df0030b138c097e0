//! Screen state machine around the simulation
//!
//! Menu → Running ⇄ Paused → GameOver → Menu. Only Running steps the
//! simulation. Audio cues and persistence happen here, never inside `sim`.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioManager, LOOP_FOREVER, Mixer, Sfx};
use crate::consts::*;
use crate::difficulty::{DifficultyLevel, DifficultyProfile, save_difficulty};
use crate::highscores::HighScores;
use crate::input::{InputEvent, InputSource, Key, steer_intent};
use crate::settings::{GameConfig, StoragePaths};
use crate::sim::{GameEvent, RenderSnapshot, Simulation, TickInput, tick};
use crate::track::{Track, TrackGenerator};

/// Mixed into the run seed so the track and the world draw different streams
const TRACK_SEED_SALT: u64 = 0x7261_6365_7472_6b00;

/// Background music played during runs
pub const MUSIC_FILE: &str = "assets/music/race.ogg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Quit,
}

/// Top-level game: screens, the active run, audio and saved files
pub struct Game<M: Mixer> {
    config: GameConfig,
    paths: StoragePaths,
    audio: AudioManager<M>,
    high_scores: HighScores,
    /// Scores added since the last successful write
    scores_dirty: bool,
    last_rank: Option<usize>,
    screen: Screen,
    menu_choice: DifficultyLevel,
    sim: Option<Simulation>,
    runs: u64,
    music: PathBuf,
    music_playing: bool,
    held_left: bool,
    held_right: bool,
}

impl<M: Mixer> Game<M> {
    pub fn new(config: GameConfig, paths: StoragePaths, audio: AudioManager<M>) -> Self {
        let high_scores = HighScores::load(&paths.high_scores);
        Self {
            menu_choice: config.difficulty,
            config,
            paths,
            audio,
            high_scores,
            scores_dirty: false,
            last_rank: None,
            screen: Screen::Menu,
            sim: None,
            runs: 0,
            music: PathBuf::from(MUSIC_FILE),
            music_playing: false,
            held_left: false,
            held_right: false,
        }
    }

    pub fn with_music(mut self, file: impl Into<PathBuf>) -> Self {
        self.music = file.into();
        self
    }

    /// Handle one frame of input and advance the active screen
    pub fn frame(&mut self, input: &impl InputSource, frame_ms: f32) -> FrameOutcome {
        if input.has_event(InputEvent::Quit) {
            self.shutdown();
            return FrameOutcome::Quit;
        }

        let outcome = match self.screen {
            Screen::Menu => self.menu_frame(input),
            Screen::Running => {
                self.running_frame(input, frame_ms);
                FrameOutcome::Continue
            }
            Screen::Paused => {
                self.paused_frame(input, frame_ms);
                FrameOutcome::Continue
            }
            Screen::GameOver => {
                self.game_over_frame(input);
                FrameOutcome::Continue
            }
        };

        self.held_left = input.is_down(Key::Left) || input.is_down(Key::A);
        self.held_right = input.is_down(Key::Right) || input.is_down(Key::D);

        if outcome == FrameOutcome::Quit {
            self.shutdown();
        }
        outcome
    }

    fn menu_frame(&mut self, input: &impl InputSource) -> FrameOutcome {
        let left = input.is_down(Key::Left) || input.is_down(Key::A);
        let right = input.is_down(Key::Right) || input.is_down(Key::D);

        let choice = if left && !self.held_left {
            self.menu_choice.easier()
        } else if right && !self.held_right {
            self.menu_choice.harder()
        } else {
            None
        };
        if let Some(choice) = choice {
            self.menu_choice = choice;
            self.audio.play(Sfx::Hover, 0);
        }

        if input.has_event(InputEvent::Enter) || input.has_event(InputEvent::Space) {
            self.audio.play(Sfx::Click, 0);
            if self.menu_choice != self.config.difficulty {
                if let Err(e) = save_difficulty(&self.paths.difficulty, self.menu_choice) {
                    log::warn!("Could not save difficulty: {}", e);
                }
                self.config = self.config.with_difficulty(self.menu_choice);
            }
            self.start_run();
        } else if input.has_event(InputEvent::Escape) {
            return FrameOutcome::Quit;
        }
        FrameOutcome::Continue
    }

    fn running_frame(&mut self, input: &impl InputSource, frame_ms: f32) {
        let Some(sim) = self.sim.as_mut() else {
            self.screen = Screen::Menu;
            return;
        };

        if input.has_event(InputEvent::Pause) || input.has_event(InputEvent::Escape) {
            tick(sim, &TickInput { steer: 0.0, pause: true }, 0.0);
            self.audio.stop(Sfx::Engine);
            self.screen = Screen::Paused;
            log::info!("Paused");
            return;
        }

        let events = tick(
            sim,
            &TickInput {
                steer: steer_intent(input),
                pause: false,
            },
            frame_ms,
        );
        let game_over = sim.world.game_over;

        for event in events {
            match event {
                GameEvent::OrbCollected { .. } => self.audio.play(Sfx::Pickup, 0),
                GameEvent::NearMiss => log::debug!("Near miss"),
                GameEvent::DifficultyShift(level) => log::info!("Difficulty shifted to {}", level),
                GameEvent::Crash => {}
            }
        }

        if game_over {
            self.finish_run();
        }
    }

    fn paused_frame(&mut self, input: &impl InputSource, frame_ms: f32) {
        if input.has_event(InputEvent::Pause) {
            if let Some(sim) = self.sim.as_mut() {
                tick(
                    sim,
                    &TickInput {
                        steer: steer_intent(input),
                        pause: true,
                    },
                    frame_ms,
                );
            }
            self.audio.play(Sfx::Engine, LOOP_FOREVER);
            self.screen = Screen::Running;
            log::info!("Resumed");
        } else if input.has_event(InputEvent::Escape) {
            log::info!("Run abandoned");
            self.return_to_menu();
        }
    }

    fn game_over_frame(&mut self, input: &impl InputSource) {
        if input.has_event(InputEvent::Enter) || input.has_event(InputEvent::Space) {
            self.audio.play(Sfx::Click, 0);
            self.start_run();
        } else if input.has_event(InputEvent::Escape) {
            self.return_to_menu();
        }
    }

    /// Build a fresh track and simulation and switch to Running
    pub fn start_run(&mut self) {
        self.runs += 1;
        let seed = self.config.seed.wrapping_add(self.runs);

        let mut track_rng = Pcg32::seed_from_u64(seed ^ TRACK_SEED_SALT);
        let track = TrackGenerator::new(self.config.generator_config())
            .generate(self.config.track_length, self.config.player_skill, &mut track_rng)
            .unwrap_or_else(|e| {
                log::warn!("{}; using a flat track", e);
                Track::flat(DEFAULT_TRACK_LENGTH, SEGMENT_LENGTH)
            });

        let sim = Simulation::new(
            track,
            DifficultyProfile::preset(self.config.difficulty),
            seed,
            self.config.adaptive,
        )
        .with_high_score(self.high_scores.top_score().unwrap_or(0));
        self.sim = Some(sim);
        self.last_rank = None;
        self.screen = Screen::Running;

        self.audio.play(Sfx::Engine, LOOP_FOREVER);
        if !self.music_playing {
            self.audio.play_music(self.music.clone());
            self.music_playing = true;
        }
        log::info!(
            "Run {} started: difficulty={} seed={}",
            self.runs,
            self.config.difficulty,
            seed
        );
    }

    fn finish_run(&mut self) {
        self.audio.stop(Sfx::Engine);
        self.audio.play(Sfx::Crash, 0);
        self.record_score();
    }

    /// End the active run without a crash, keeping its score
    pub fn retire(&mut self) {
        if !matches!(self.screen, Screen::Running | Screen::Paused) {
            return;
        }
        log::info!("Run retired with score {}", self.score());
        self.audio.stop(Sfx::Engine);
        self.record_score();
    }

    /// Add the final score to the board and switch to GameOver
    fn record_score(&mut self) {
        self.screen = Screen::GameOver;

        let score = self.score();
        self.last_rank = self.high_scores.add_score(score);
        if let Some(rank) = self.last_rank {
            log::info!("Score {} ranked #{}", score, rank);
            self.scores_dirty = true;
        }
        if self.scores_dirty {
            match self.high_scores.save(&self.paths.high_scores) {
                Ok(()) => self.scores_dirty = false,
                Err(e) => log::warn!("Could not save high scores, will retry: {}", e),
            }
        }
    }

    fn return_to_menu(&mut self) {
        self.audio.stop_all();
        self.audio.stop_music();
        self.music_playing = false;
        self.sim = None;
        self.screen = Screen::Menu;
    }

    fn shutdown(&mut self) {
        self.audio.stop_all();
        self.audio.stop_music();
        log::info!("Quit after {} run(s)", self.runs);
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn menu_choice(&self) -> DifficultyLevel {
        self.menu_choice
    }

    pub fn score(&self) -> u64 {
        self.sim.as_ref().map(|s| s.world.score).unwrap_or(0)
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Rank reached by the last finished run, if it made the board
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.sim.as_mut()
    }

    pub fn snapshot(&self) -> Option<RenderSnapshot> {
        self.sim.as_ref().map(Simulation::snapshot)
    }

    pub fn audio(&self) -> &AudioManager<M> {
        &self.audio
    }
}

//! Retro Racer - headless entry point
//!
//! No window toolkit is linked, so the binary runs one demo race driven by
//! the autopilot, records the score and exits.

use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

use retro_racer::app::{FrameOutcome, Game, Screen};
use retro_racer::audio::{AudioManager, LogMixer};
use retro_racer::autopilot::Autopilot;
use retro_racer::input::{InputEvent, ScriptedInput};
use retro_racer::{GameConfig, StoragePaths};

/// Fixed frame time of the demo loop (ms)
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Demo runs end after this much simulated time (s)
const DEMO_SECONDS: f32 = 120.0;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("retro-racer: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    log::info!("Retro Racer (headless) starting...");

    let paths = StoragePaths::from_env();
    paths
        .ensure_dir()
        .with_context(|| format!("cannot use data directory {}", paths.dir.display()))?;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .context("system clock is before the unix epoch")?;
    let config = GameConfig::load(&paths, seed);
    let audio =
        AudioManager::new(LogMixer, &config).with_asset_dir(&paths.dir.join("assets/sounds"));

    let mut game = Game::new(config, paths, audio);
    let pilot = Autopilot::default();
    let max_frames = (DEMO_SECONDS * 1000.0 / FRAME_MS) as u64;
    let mut frames = 0u64;

    loop {
        let input = match game.screen() {
            Screen::Menu => Autopilot::confirm(),
            Screen::Running if frames >= max_frames => {
                game.retire();
                continue;
            }
            Screen::Running => match game.snapshot() {
                Some(snapshot) => pilot.drive(&snapshot),
                None => ScriptedInput::none().press(InputEvent::Quit),
            },
            Screen::Paused | Screen::GameOver => ScriptedInput::none().press(InputEvent::Quit),
        };
        if game.frame(&input, FRAME_MS) == FrameOutcome::Quit {
            break;
        }
        frames += 1;
    }

    let best = game.high_scores().top_score().unwrap_or(0);
    match game.last_rank() {
        Some(rank) => log::info!("Demo score {} ranked #{} (best {})", game.score(), rank, best),
        None => log::info!("Demo score {} (best {})", game.score(), best),
    }
    log::info!("Simulated {} frames", frames);
    Ok(())
}

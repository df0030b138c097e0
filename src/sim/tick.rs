//! Per-frame simulation step
//!
//! The order inside a step is fixed: advance difficulty, move the player,
//! scroll the road, move and collide enemies, move and collect orbs, spawn,
//! update the high score, then feed adaptive metrics.

use super::spawn::{choose_enemy_lane, speed_jitter, spawn_roll};
use super::state::{GameEvent, Simulation};
use crate::consts::*;
use crate::lane_center;
use rand::Rng;

/// Input commands for a single step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal intent, -1 (left) to +1 (right)
    pub steer: f32,
    /// Pause toggle
    pub pause: bool,
}

/// Convert a frame time to a simulation delta, clamped against clock jumps
pub fn frame_dt(frame_ms: f32) -> f32 {
    if frame_ms.is_nan() {
        return 0.0;
    }
    (frame_ms / 1000.0).clamp(0.0, MAX_FRAME_DT)
}

/// Advance the simulation by one frame of `frame_ms` milliseconds
pub fn tick(sim: &mut Simulation, input: &TickInput, frame_ms: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause && !sim.world.game_over {
        sim.world.paused = !sim.world.paused;
        if sim.world.paused {
            return events;
        }
    }

    // Don't step if paused or game over
    if sim.world.paused || sim.world.game_over {
        return events;
    }

    let dt = frame_dt(frame_ms);
    let dt_norm = dt * TARGET_FPS;

    sim.controller.advance(dt);
    sim.world.elapsed_time_s += dt;
    let level = sim.controller.level();
    let enemy_speed = sim.controller.enemy_speed();
    let scroll_speed = sim.controller.scroll_speed();

    sim.player.steer(input.steer, dt_norm);
    let player_rect = sim.player.rect();

    let scroll = scroll_speed * dt_norm;
    sim.road.scroll(scroll);
    sim.world.distance += scroll;

    let cull_y = SCREEN_HEIGHT + CULL_MARGIN;

    // Enemies
    let mut crashed = false;
    for enemy in &mut sim.enemies {
        enemy.speed_mul = speed_jitter(level, &mut sim.world.rng);
        let before = enemy.rect();
        enemy.pos.y += enemy_speed * enemy.speed_mul * dt_norm;

        // Test the whole distance covered this step so long frames cannot skip the player
        let rect = enemy.rect();
        if before.union(&rect).intersects(&player_rect) {
            crashed = true;
        } else if !enemy.passed && rect.top() > player_rect.bottom() {
            enemy.passed = true;
            if rect.horizontal_gap(&player_rect) < NEAR_MISS_GAP {
                events.push(GameEvent::NearMiss);
                if let Some(metrics) = sim.metrics.as_mut() {
                    metrics.record_near_miss();
                }
            }
        }
    }
    sim.enemies.retain(|e| e.pos.y <= cull_y);

    if crashed {
        sim.world.game_over = true;
        events.push(GameEvent::Crash);
        if let Some(metrics) = sim.metrics.as_mut() {
            metrics.record_collision();
        }
        log::info!(
            "Crash after {:.1}s, score {} ({} orbs)",
            sim.world.elapsed_time_s,
            sim.world.score,
            sim.world.orbs_collected
        );
        update_high_score(sim);
        return events;
    }

    // Orbs
    let points = level.orb_points();
    for orb in &mut sim.orbs {
        if orb.collected {
            debug_assert!(!orb.collected, "collected orb {} still active", orb.id);
            log::error!("Collected orb {} still active, skipping", orb.id);
            continue;
        }
        let before = orb.rect();
        orb.center.y += scroll_speed * dt_norm;
        if before.union(&orb.rect()).intersects(&player_rect) {
            orb.collected = true;
            sim.world.score += points;
            sim.world.orbs_collected += 1;
            events.push(GameEvent::OrbCollected { points });
        }
    }
    sim.orbs.retain(|o| !o.collected && o.center.y - o.radius <= cull_y);

    spawn(sim, dt);
    update_high_score(sim);

    if sim.metrics.is_some() {
        feed_metrics(sim, dt, scroll_speed, &mut events);
    }

    events
}

fn spawn(sim: &mut Simulation, dt: f32) {
    let level = sim.controller.level();

    if spawn_roll(sim.controller.enemy_spawn(), dt, &mut sim.world.rng) {
        let lane = choose_enemy_lane(
            level,
            sim.world.last_enemy_lane,
            LANE_COUNT,
            &mut sim.world.rng,
        );
        if let Some(lane) = lane {
            if sim.spawn_enemy_in_lane(lane, -ENEMY_HEIGHT).is_some() {
                sim.world.last_enemy_lane = Some(lane);
            }
        }
    }

    if spawn_roll(sim.controller.orb_spawn(), dt, &mut sim.world.rng) {
        let lane = sim.world.rng.random_range(0..LANE_COUNT);
        if let Some(x) = lane_center(lane) {
            sim.spawn_orb_at(x, -ORB_RADIUS);
        }
    }
}

fn update_high_score(sim: &mut Simulation) {
    sim.world.high_score = sim.world.high_score.max(sim.world.score);
}

fn feed_metrics(sim: &mut Simulation, dt: f32, scroll_speed: f32, events: &mut Vec<GameEvent>) {
    let segment = sim.track().segment_at(sim.world.distance);
    let on_shoulder = sim.player.on_shoulder();
    let Some(metrics) = sim.metrics.as_mut() else {
        return;
    };

    metrics.record_frame(scroll_speed * TARGET_FPS, dt, on_shoulder);

    sim.segment_clock += dt;
    if segment != sim.current_segment {
        metrics.record_segment_time(sim.segment_clock * 1000.0);
        sim.segment_clock = 0.0;
        sim.current_segment = segment;
    }

    if let Some(target) = metrics.update(dt) {
        if let Some(level) = sim.controller.nudge_toward(target) {
            events.push(GameEvent::DifficultyShift(level));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::{DifficultyLevel, DifficultyProfile};
    use crate::track::{GeneratorConfig, Theme, TrackGenerator};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    fn sim_with(profile: DifficultyProfile, seed: u64, adaptive: bool) -> Simulation {
        let mut rng = Pcg32::seed_from_u64(seed);
        let track = TrackGenerator::new(GeneratorConfig {
            theme: Theme::Synthwave,
            ..Default::default()
        })
        .generate(2000, 0.5, &mut rng)
        .unwrap();
        Simulation::new(track, profile, seed, adaptive)
    }

    #[test]
    fn test_frame_dt_clamped() {
        assert_eq!(frame_dt(0.0), 0.0);
        assert_eq!(frame_dt(-5.0), 0.0);
        assert!((frame_dt(16.0) - 0.016).abs() < 1e-6);
        assert_eq!(frame_dt(5000.0), MAX_FRAME_DT);
        assert_eq!(frame_dt(f32::NAN), 0.0);
    }

    #[test]
    fn test_straight_run_easy_score_matches_orbs() {
        let mut sim = sim_with(DifficultyProfile::easy(), 42, false);
        for _ in 0..600 {
            // Keep the road clear so the run always lasts the full ten seconds
            sim.enemies.clear();
            tick(&mut sim, &TickInput::default(), FRAME_MS);
        }
        assert!(!sim.world.game_over);
        assert_eq!(
            sim.world.score,
            sim.world.orbs_collected as u64 * DifficultyLevel::Easy.orb_points()
        );
        assert!(sim.world.high_score >= sim.world.score);
        let s = sim.controller.current();
        assert!((2.6..=3.0).contains(&s.scroll_speed));
        assert!((1.6..=2.0).contains(&s.enemy_speed));
    }

    #[test]
    fn test_collision_ends_run() {
        let mut sim = sim_with(DifficultyProfile::medium(), 42, false);
        let p = sim.player.rect();
        sim.spawn_enemy_at(p.left(), p.top() - 10.0);

        let events = tick(&mut sim, &TickInput::default(), FRAME_MS);
        assert!(sim.world.game_over);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Crash).count(), 1);

        // Terminal: further steps do nothing
        let elapsed = sim.world.elapsed_time_s;
        let events = tick(&mut sim, &TickInput::default(), FRAME_MS);
        assert!(events.is_empty());
        assert_eq!(sim.world.elapsed_time_s, elapsed);
    }

    #[test]
    fn test_long_frame_cannot_skip_enemy() {
        let mut sim = sim_with(DifficultyProfile::hard(), 42, false);
        sim.controller.advance(1.0e6);
        assert_eq!(sim.controller.enemy_speed(), DifficultyProfile::hard().max_enemy_speed);

        // Bottom edge touching the player's top; a 250 ms step moves it 180-270 px,
        // so its end position lies wholly below the player.
        let p = sim.player.rect();
        sim.spawn_enemy_at(p.left(), p.top() - ENEMY_HEIGHT);

        let events = tick(&mut sim, &TickInput::default(), 250.0);
        assert!(sim.world.game_over);
        assert!(events.contains(&GameEvent::Crash));
    }

    #[test]
    fn test_long_frame_sweep_stays_in_its_column() {
        let mut sim = sim_with(DifficultyProfile::hard(), 42, false);
        sim.controller.advance(1.0e6);
        let p = sim.player.rect();
        sim.spawn_enemy_at(p.right() + NEAR_MISS_GAP + 1.0, p.top() - ENEMY_HEIGHT);

        let events = tick(&mut sim, &TickInput::default(), 250.0);
        assert!(!sim.world.game_over);
        assert!(!events.contains(&GameEvent::Crash));
        assert!(!events.contains(&GameEvent::NearMiss));
    }

    #[test]
    fn test_long_frame_cannot_skip_orb() {
        let mut sim = sim_with(DifficultyProfile::hard(), 42, false);
        sim.controller.advance(1.0e6);
        let p = sim.player.rect();
        sim.spawn_orb_at(p.center().x, p.top() - ORB_RADIUS - 1.0);

        let events = tick(&mut sim, &TickInput::default(), 250.0);
        assert_eq!(sim.world.orbs_collected, 1);
        assert!(events.contains(&GameEvent::OrbCollected {
            points: DifficultyLevel::Hard.orb_points()
        }));
    }

    #[test]
    fn test_orb_scores_once_per_level() {
        for level in DifficultyLevel::ALL {
            let mut sim = sim_with(DifficultyProfile::preset(level), 42, false);
            let c = sim.player.rect().center();
            let id = sim.spawn_orb_at(c.x, c.y);

            let events = tick(&mut sim, &TickInput::default(), FRAME_MS);
            assert_eq!(sim.world.score, level.orb_points());
            assert_eq!(sim.world.orbs_collected, 1);
            assert!(events.contains(&GameEvent::OrbCollected {
                points: level.orb_points()
            }));
            assert!(sim.orbs.iter().all(|o| o.id != id));

            // Never scores twice
            for _ in 0..5 {
                tick(&mut sim, &TickInput::default(), 0.0);
            }
            assert_eq!(sim.world.orbs_collected, 1);
        }
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut sim = sim_with(DifficultyProfile::easy(), 7, false);
        tick(&mut sim, &TickInput::default(), FRAME_MS);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut sim, &pause, FRAME_MS);
        assert!(sim.world.paused);

        let elapsed = sim.world.elapsed_time_s;
        let distance = sim.world.distance;
        for _ in 0..10 {
            tick(&mut sim, &TickInput::default(), FRAME_MS);
        }
        assert_eq!(sim.world.elapsed_time_s, elapsed);
        assert_eq!(sim.world.distance, distance);

        tick(&mut sim, &pause, FRAME_MS);
        assert!(!sim.world.paused);
        assert!(sim.world.elapsed_time_s > elapsed);
    }

    #[test]
    fn test_large_frame_is_clamped() {
        let mut sim = sim_with(DifficultyProfile::easy(), 1, false);
        tick(&mut sim, &TickInput::default(), 10_000.0);
        assert_eq!(sim.world.elapsed_time_s, MAX_FRAME_DT);
        assert_eq!(sim.controller.elapsed(), MAX_FRAME_DT);
    }

    #[test]
    fn test_steering_moves_player() {
        let mut sim = sim_with(DifficultyProfile::easy(), 1, false);
        let x0 = sim.player.pos.x;
        let right = TickInput {
            steer: 1.0,
            ..Default::default()
        };
        tick(&mut sim, &right, FRAME_MS);
        assert!(sim.player.pos.x > x0);
        for _ in 0..1000 {
            tick(&mut sim, &right, FRAME_MS);
            if sim.world.game_over {
                break;
            }
        }
        assert!(sim.player.pos.x <= sim.player.max_x());
    }

    #[test]
    fn test_offscreen_entities_culled() {
        let mut sim = sim_with(DifficultyProfile::easy(), 1, false);
        sim.spawn_enemy_at(ROAD_LEFT, SCREEN_HEIGHT + CULL_MARGIN - 0.1);
        sim.spawn_orb_at(ROAD_LEFT, SCREEN_HEIGHT + CULL_MARGIN + ORB_RADIUS - 0.1);
        tick(&mut sim, &TickInput::default(), FRAME_MS);
        assert!(sim.enemies.iter().all(|e| e.pos.y < SCREEN_HEIGHT));
        assert!(sim.orbs.iter().all(|o| o.center.y < SCREEN_HEIGHT));
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<TickInput> = (0..900)
            .map(|i| TickInput {
                steer: ((i / 40) % 3) as f32 - 1.0,
                pause: false,
            })
            .collect();

        let run = || {
            let mut sim = sim_with(DifficultyProfile::hard(), 99, false);
            let mut trace = Vec::new();
            for input in &inputs {
                tick(&mut sim, input, FRAME_MS);
                trace.push((
                    sim.player.pos,
                    sim.enemies.iter().map(|e| e.pos).collect::<Vec<_>>(),
                    sim.orbs.iter().map(|o| o.center).collect::<Vec<_>>(),
                    sim.world.score,
                ));
            }
            (trace, sim.world.game_over)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_adaptive_disabled_matches_plain_run() {
        // Metrics never touch the RNG, so early trajectories agree until a
        // difficulty shift could first happen (one evaluation interval).
        let mut plain = sim_with(DifficultyProfile::medium(), 5, false);
        let mut adaptive = sim_with(DifficultyProfile::medium(), 5, true);
        for _ in 0..250 {
            tick(&mut plain, &TickInput::default(), FRAME_MS);
            tick(&mut adaptive, &TickInput::default(), FRAME_MS);
            let a: Vec<_> = plain.enemies.iter().map(|e| e.pos).collect();
            let b: Vec<_> = adaptive.enemies.iter().map(|e| e.pos).collect();
            assert_eq!(a, b);
            assert_eq!(plain.world.score, adaptive.world.score);
        }
        assert!(plain.metrics().is_none());
        assert!(adaptive.metrics().is_some());
    }

    #[test]
    fn test_adaptive_run_shifts_difficulty() {
        // Medium at its starting pace already rates as a skilled driver, so the
        // first evaluation after five seconds moves the run up to hard.
        let mut sim = sim_with(DifficultyProfile::medium(), 42, true);
        let mut shifts = Vec::new();
        for _ in 0..360 {
            sim.enemies.clear();
            let events = tick(&mut sim, &TickInput::default(), FRAME_MS);
            shifts.extend(events.into_iter().filter_map(|e| match e {
                GameEvent::DifficultyShift(level) => Some(level),
                _ => None,
            }));
        }

        assert!(!sim.world.game_over);
        assert_eq!(shifts, vec![DifficultyLevel::Hard]);
        assert_eq!(sim.controller.level(), DifficultyLevel::Hard);

        // The ramp keeps its elapsed time across the shift
        assert!((sim.controller.elapsed() - sim.world.elapsed_time_s).abs() < 1e-3);
        let s = sim.controller.current();
        assert!(s.scroll_speed > DifficultyProfile::hard().init_scroll_speed);

        let metrics = sim.metrics().unwrap();
        assert!(metrics.segment_samples() >= 5);
        assert!(metrics.skill() >= 0.65);
        assert_eq!(metrics.collisions(), 0);
    }

    #[test]
    fn test_no_overlap_survives_a_step() {
        let mut sim = sim_with(DifficultyProfile::hard(), 13, false);
        for _ in 0..3000 {
            tick(&mut sim, &TickInput::default(), FRAME_MS);
            let p = sim.player.rect();
            let overlapping = sim.enemies.iter().any(|e| e.rect().intersects(&p));
            assert!(!overlapping || sim.world.game_over);
            if sim.world.game_over {
                break;
            }
        }
    }

    #[test]
    fn test_high_score_carried_and_monotone() {
        let mut sim = sim_with(DifficultyProfile::easy(), 3, false).with_high_score(50);
        let mut last_score = 0;
        for _ in 0..1200 {
            tick(&mut sim, &TickInput::default(), FRAME_MS);
            assert!(sim.world.score >= last_score);
            assert!(sim.world.high_score >= 50);
            assert!(sim.world.high_score >= sim.world.score);
            last_score = sim.world.score;
        }
    }
}

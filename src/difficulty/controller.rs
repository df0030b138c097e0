//! Live difficulty controller
//!
//! Each current value is a closed-form function of the active profile and
//! the elapsed run time:
//!
//! ```text
//! factor  = 1 + ln(1 + elapsed / 60)
//! current = min(max, initial + growth * scale * elapsed * factor)
//! ```
//!
//! `scale` is 600 for speeds and 60 for spawn rates. Because nothing is
//! accumulated across steps, two controllers with the same profile and
//! elapsed time always agree regardless of how the time was sliced.

use serde::{Deserialize, Serialize};

use super::profile::{DifficultyLevel, DifficultyProfile};

/// Time-domain scale applied to speed growth
pub const SPEED_TIME_SCALE: f32 = 600.0;
/// Time-domain scale applied to spawn-rate growth
pub const SPAWN_TIME_SCALE: f32 = 60.0;
/// Gap between target skill and the level's tuning point that triggers a nudge
const NUDGE_THRESHOLD: f32 = 0.05;

/// The four live values plus the level that produced them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySnapshot {
    pub enemy_speed: f32,
    pub scroll_speed: f32,
    pub enemy_spawn: f32,
    pub orb_spawn: f32,
    pub level: DifficultyLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyController {
    profile: DifficultyProfile,
    elapsed: f32,
    enemy_speed: f32,
    scroll_speed: f32,
    enemy_spawn: f32,
    orb_spawn: f32,
}

impl DifficultyController {
    pub fn new(profile: DifficultyProfile) -> Self {
        let mut controller = Self {
            profile,
            elapsed: 0.0,
            enemy_speed: 0.0,
            scroll_speed: 0.0,
            enemy_spawn: 0.0,
            orb_spawn: 0.0,
        };
        controller.reset();
        controller
    }

    /// Switch to a new profile and restart the ramp
    pub fn apply(&mut self, profile: DifficultyProfile) {
        log::info!("Difficulty profile applied: {}", profile.level);
        self.profile = profile;
        self.reset();
    }

    /// Back to the profile's initial values
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.enemy_speed = self.profile.init_enemy_speed;
        self.scroll_speed = self.profile.init_scroll_speed;
        self.enemy_spawn = self.profile.init_enemy_spawn;
        self.orb_spawn = self.profile.init_orb_spawn;
    }

    /// Advance the ramp by `dt` seconds; negative or NaN deltas count as zero
    pub fn advance(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        self.recompute();
    }

    fn recompute(&mut self) {
        let p = &self.profile;
        let t = self.elapsed;
        let speed = |init, max| ramp(init, max, p.speed_growth, SPEED_TIME_SCALE, t);
        let spawn = |init, max| ramp(init, max, p.spawn_growth, SPAWN_TIME_SCALE, t);
        self.enemy_speed = speed(p.init_enemy_speed, p.max_enemy_speed);
        self.scroll_speed = speed(p.init_scroll_speed, p.max_scroll_speed);
        self.enemy_spawn = spawn(p.init_enemy_spawn, p.max_enemy_spawn);
        self.orb_spawn = spawn(p.init_orb_spawn, p.max_orb_spawn);
    }

    pub fn current(&self) -> DifficultySnapshot {
        DifficultySnapshot {
            enemy_speed: self.enemy_speed,
            scroll_speed: self.scroll_speed,
            enemy_spawn: self.enemy_spawn,
            orb_spawn: self.orb_spawn,
            level: self.profile.level,
        }
    }

    pub fn enemy_speed(&self) -> f32 {
        self.enemy_speed
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn enemy_spawn(&self) -> f32 {
        self.enemy_spawn
    }

    pub fn orb_spawn(&self) -> f32 {
        self.orb_spawn
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn level(&self) -> DifficultyLevel {
        self.profile.level
    }

    pub fn level_name(&self) -> &'static str {
        self.profile.level.as_str()
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Scroll speed as a percentage of the profile cap
    pub fn speed_percentage(&self) -> f32 {
        if self.profile.max_scroll_speed <= 0.0 {
            return 0.0;
        }
        (self.scroll_speed / self.profile.max_scroll_speed * 100.0).clamp(0.0, 100.0)
    }

    /// Move one level toward the level suited to `target` skill.
    ///
    /// Keeps the elapsed time, so the ramp continues on the new profile.
    /// Returns the new level when a change happened.
    pub fn nudge_toward(&mut self, target: f32) -> Option<DifficultyLevel> {
        let current = self.profile.level;
        if (target - current.skill_center()).abs() <= NUDGE_THRESHOLD {
            return None;
        }
        let desired = DifficultyLevel::for_skill(target);
        let next = match desired.cmp(&current) {
            std::cmp::Ordering::Greater => current.harder(),
            std::cmp::Ordering::Less => current.easier(),
            std::cmp::Ordering::Equal => None,
        }?;
        log::info!(
            "Adaptive difficulty: {} -> {} (target skill {:.2})",
            current,
            next,
            target
        );
        self.profile = DifficultyProfile::preset(next);
        self.recompute();
        Some(next)
    }
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(DifficultyProfile::default())
    }
}

#[inline]
fn ramp(initial: f32, max: f32, growth: f32, scale: f32, elapsed: f32) -> f32 {
    let factor = 1.0 + (elapsed / 60.0).ln_1p();
    (initial + growth * scale * elapsed * factor).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn advanced(profile: DifficultyProfile, seconds: f32, steps: u32) -> DifficultyController {
        let mut c = DifficultyController::new(profile);
        for _ in 0..steps {
            c.advance(seconds / steps as f32);
        }
        c
    }

    #[test]
    fn test_reset_then_zero_advance_is_initial() {
        let p = DifficultyProfile::hard();
        let mut c = advanced(p, 42.0, 10);
        c.reset();
        c.advance(0.0);
        let s = c.current();
        assert_eq!(s.enemy_speed, p.init_enemy_speed);
        assert_eq!(s.scroll_speed, p.init_scroll_speed);
        assert_eq!(s.enemy_spawn, p.init_enemy_spawn);
        assert_eq!(s.orb_spawn, p.init_orb_spawn);
        assert_eq!(c.elapsed(), 0.0);
    }

    #[test]
    fn test_zero_dt_leaves_values() {
        let mut c = advanced(DifficultyProfile::medium(), 12.0, 4);
        let before = c.current();
        c.advance(0.0);
        assert_eq!(c.current(), before);
        c.advance(-1.0);
        assert_eq!(c.current(), before);
    }

    #[test]
    fn test_huge_dt_hits_cap() {
        let p = DifficultyProfile::easy();
        let mut c = DifficultyController::new(p);
        c.advance(1e9);
        let s = c.current();
        assert_eq!(s.enemy_speed, p.max_enemy_speed);
        assert_eq!(s.scroll_speed, p.max_scroll_speed);
        assert_eq!(s.enemy_spawn, p.max_enemy_spawn);
        assert_eq!(s.orb_spawn, p.max_orb_spawn);
    }

    #[test]
    fn test_easy_after_ten_seconds() {
        let c = advanced(DifficultyProfile::easy(), 10.0, 600);
        let s = c.current();
        assert!((2.6..=3.0).contains(&s.scroll_speed), "scroll {}", s.scroll_speed);
        assert!((1.6..=2.0).contains(&s.enemy_speed), "enemy {}", s.enemy_speed);
        assert_eq!(c.level_name(), "easy");
    }

    #[test]
    fn test_scroll_ordered_at_thirty_seconds() {
        let [e, m, h] =
            DifficultyLevel::ALL.map(|l| advanced(DifficultyProfile::preset(l), 30.0, 1800));
        assert!(h.scroll_speed() > m.scroll_speed());
        assert!(m.scroll_speed() > e.scroll_speed());
    }

    #[test]
    fn test_apply_resets_elapsed() {
        let mut c = advanced(DifficultyProfile::easy(), 20.0, 2);
        c.apply(DifficultyProfile::hard());
        assert_eq!(c.elapsed(), 0.0);
        assert_eq!(c.level(), DifficultyLevel::Hard);
        assert_eq!(c.enemy_speed(), DifficultyProfile::hard().init_enemy_speed);
    }

    #[test]
    fn test_nudge_steps_one_level() {
        let mut c = advanced(DifficultyProfile::easy(), 5.0, 1);
        assert_eq!(c.nudge_toward(1.0), Some(DifficultyLevel::Medium));
        assert_eq!(c.elapsed(), 5.0);
        assert_eq!(c.nudge_toward(1.0), Some(DifficultyLevel::Hard));
        assert_eq!(c.nudge_toward(1.0), None);
        assert_eq!(c.nudge_toward(0.1), Some(DifficultyLevel::Medium));
        // Close enough to the medium tuning point
        assert_eq!(c.nudge_toward(0.62), None);
    }

    #[test]
    fn test_speed_percentage() {
        let mut c = DifficultyController::new(DifficultyProfile::medium());
        assert!((c.speed_percentage() - 5.0 / 12.0 * 100.0).abs() < 1e-3);
        c.advance(1e9);
        assert_eq!(c.speed_percentage(), 100.0);
    }

    proptest! {
        #[test]
        fn prop_values_within_profile_bounds(
            level_idx in 0usize..3,
            dts in prop::collection::vec(0.0f32..5.0, 0..200),
        ) {
            let p = DifficultyProfile::preset(DifficultyLevel::ALL[level_idx]);
            let mut c = DifficultyController::new(p);
            let mut last = c.current();
            let mut last_elapsed = 0.0;
            for dt in dts {
                c.advance(dt);
                let s = c.current();
                prop_assert!((p.init_enemy_speed..=p.max_enemy_speed).contains(&s.enemy_speed));
                prop_assert!((p.init_scroll_speed..=p.max_scroll_speed).contains(&s.scroll_speed));
                prop_assert!((p.init_enemy_spawn..=p.max_enemy_spawn).contains(&s.enemy_spawn));
                prop_assert!((p.init_orb_spawn..=p.max_orb_spawn).contains(&s.orb_spawn));
                prop_assert!(s.scroll_speed >= last.scroll_speed);
                prop_assert!(s.enemy_speed >= last.enemy_speed);
                prop_assert!(c.elapsed() >= last_elapsed);
                last = s;
                last_elapsed = c.elapsed();
            }
        }

        #[test]
        fn prop_harder_is_never_slower(elapsed in 0.0f32..100_000.0) {
            let speeds: Vec<_> = DifficultyLevel::ALL
                .iter()
                .map(|&l| {
                    let mut c = DifficultyController::new(DifficultyProfile::preset(l));
                    c.advance(elapsed);
                    (c.enemy_speed(), c.scroll_speed())
                })
                .collect();
            for pair in speeds.windows(2) {
                prop_assert!(pair[1].0 >= pair[0].0);
                prop_assert!(pair[1].1 >= pair[0].1);
            }
        }

        #[test]
        fn prop_same_elapsed_same_values(a in 0.0f32..50.0, b in 0.0f32..50.0) {
            let p = DifficultyProfile::medium();
            let mut one = DifficultyController::new(p);
            one.advance(a + b);
            let mut two = DifficultyController::new(p);
            two.advance(b + a);
            prop_assert_eq!(one.current(), two.current());
        }
    }
}

//! Idle/demo driver
//!
//! Plays the game from the render snapshot alone: dodge the nearest car
//! closing in on the player, otherwise chase the nearest orb.

use crate::consts::*;
use crate::input::{InputEvent, Key, ScriptedInput};
use crate::lane_width;
use crate::sim::{EntityKind, EntityView, RenderSnapshot};

/// How far above the player an enemy counts as a threat
const THREAT_LOOKAHEAD: f32 = 260.0;
/// Extra horizontal clearance wanted around the player
const CLEARANCE: f32 = 8.0;
/// Close enough to the target that steering stops
const DEADZONE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autopilot {
    pub lookahead: f32,
    pub deadzone: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            lookahead: THREAT_LOOKAHEAD,
            deadzone: DEADZONE,
        }
    }
}

impl Autopilot {
    /// Held keys for this frame
    pub fn drive(&self, snapshot: &RenderSnapshot) -> ScriptedInput {
        let intent = self.steer(snapshot);
        let input = ScriptedInput::none();
        if intent < 0.0 {
            input.hold(Key::Left)
        } else if intent > 0.0 {
            input.hold(Key::Right)
        } else {
            input
        }
    }

    /// Menu and game-over screens just need a confirm
    pub fn confirm() -> ScriptedInput {
        ScriptedInput::none().press(InputEvent::Enter)
    }

    /// Horizontal intent: -1, 0 or +1
    pub fn steer(&self, snapshot: &RenderSnapshot) -> f32 {
        let Some(player) = snapshot.player() else {
            return 0.0;
        };
        let px = player.x + player.w / 2.0;

        let target = if self.threatened(snapshot, player, player.x, player.x + player.w) {
            self.safest_lane(snapshot, player, px)
        } else {
            self.nearest_orb(snapshot, player, px)
        };

        match target {
            Some(tx) if (tx - px).abs() > self.deadzone => (tx - px).signum(),
            _ => 0.0,
        }
    }

    /// Enemies overlapping `[left, right]` inside the lookahead window
    fn threatened(
        &self,
        snapshot: &RenderSnapshot,
        player: &EntityView,
        left: f32,
        right: f32,
    ) -> bool {
        snapshot.of_kind(EntityKind::Enemy).any(|e| {
            let vertical = e.y + e.h > player.y - self.lookahead && e.y < player.y + player.h;
            let horizontal = e.x < right + CLEARANCE && e.x + e.w > left - CLEARANCE;
            vertical && horizontal
        })
    }

    /// Closest lane centre the player fits into without a threat
    fn safest_lane(&self, snapshot: &RenderSnapshot, player: &EntityView, px: f32) -> Option<f32> {
        (0..LANE_COUNT)
            .filter_map(crate::lane_center)
            .filter(|&c| {
                let left = c - player.w / 2.0;
                !self.threatened(snapshot, player, left, left + player.w)
            })
            .min_by(|a, b| (a - px).abs().total_cmp(&(b - px).abs()))
    }

    /// Nearest reachable orb ahead whose lane is clear
    fn nearest_orb(&self, snapshot: &RenderSnapshot, player: &EntityView, px: f32) -> Option<f32> {
        snapshot
            .of_kind(EntityKind::Orb)
            .filter(|o| o.y + o.h < player.y + player.h)
            .map(|o| o.x + o.w / 2.0)
            .filter(|&ox| {
                let left = ox - player.w / 2.0;
                !self.threatened(snapshot, player, left, left + player.w)
            })
            .min_by(|a, b| {
                let da = (a - px).abs() / lane_width();
                let db = (b - px).abs() / lane_width();
                da.total_cmp(&db)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyProfile;
    use crate::input::{InputSource, steer_intent};
    use crate::lane_center;
    use crate::sim::{Simulation, TickInput, tick};
    use crate::track::Track;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    fn quiet_sim() -> Simulation {
        Simulation::new(Track::flat(200, SEGMENT_LENGTH), DifficultyProfile::easy(), 42, false)
    }

    #[test]
    fn test_idle_with_nothing_around() {
        let sim = quiet_sim();
        let pilot = Autopilot::default();
        assert_eq!(pilot.steer(&sim.snapshot()), 0.0);
        assert!(!pilot.drive(&sim.snapshot()).is_down(Key::Left));
    }

    #[test]
    fn test_dodges_car_ahead() {
        let mut sim = quiet_sim();
        let lane1 = lane_center(1).unwrap();
        let top = sim.player.pos.y - 150.0;
        sim.spawn_enemy_at(lane1 - ENEMY_WIDTH / 2.0, top);
        let pilot = Autopilot::default();
        // Lane 2 is the closest clear lane to a centred player
        assert_eq!(pilot.steer(&sim.snapshot()), 1.0);
    }

    #[test]
    fn test_chases_orb() {
        let mut sim = quiet_sim();
        sim.spawn_orb_at(lane_center(0).unwrap(), 100.0);
        let pilot = Autopilot::default();
        let input = pilot.drive(&sim.snapshot());
        assert_eq!(steer_intent(&input), -1.0);
    }

    #[test]
    fn test_ignores_orb_behind_car() {
        let mut sim = quiet_sim();
        let lane0 = lane_center(0).unwrap();
        sim.spawn_orb_at(lane0, 100.0);
        sim.spawn_enemy_at(lane0 - ENEMY_WIDTH / 2.0, sim.player.pos.y - 200.0);
        assert_eq!(Autopilot::default().steer(&sim.snapshot()), 0.0);
    }

    #[test]
    fn test_survives_forced_enemy() {
        let mut sim = quiet_sim();
        let lane1 = lane_center(1).unwrap();
        let top = sim.player.pos.y - 200.0 - ENEMY_HEIGHT;
        let id = sim.spawn_enemy_at(lane1 - ENEMY_WIDTH / 2.0, top);
        let pilot = Autopilot::default();
        for _ in 0..260 {
            let input = pilot.drive(&sim.snapshot());
            tick(
                &mut sim,
                &TickInput {
                    steer: steer_intent(&input),
                    pause: false,
                },
                FRAME_MS,
            );
            assert!(!sim.world.game_over);
        }
        assert!(sim.enemies.iter().all(|e| e.id != id || e.passed));
    }

    #[test]
    fn test_confirm_presses_enter() {
        assert!(Autopilot::confirm().has_event(InputEvent::Enter));
    }
}

//! Adaptive player metrics
//!
//! Aggregates a sliding picture of how the player is doing and, every few
//! seconds, turns it into a skill estimate in [0.1, 1.0]. The simulation
//! hands the resulting target to the difficulty controller. Nothing here
//! draws from the world RNG, so a run with metrics disabled is unaffected.

use std::collections::VecDeque;

/// Seconds between skill evaluations
pub const EVALUATION_INTERVAL: f32 = 5.0;
/// Per-frame smoothing of the speed EMA
const SPEED_EMA_ALPHA: f32 = 0.05;
/// Number of segment times kept
const SEGMENT_HISTORY: usize = 20;
/// Segment samples needed before variance is trusted
const MIN_SEGMENT_SAMPLES: usize = 5;
/// Speed (px/s) that maps to a full speed score
const SPEED_REFERENCE: f32 = 300.0;
/// Segment-time variance (ms²) that maps to a zero reaction score
const VARIANCE_REFERENCE: f32 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveMetrics {
    speed_ema: f32,
    speed_samples: u64,
    collisions: u32,
    near_misses: u32,
    offroad_seconds: f32,
    /// Most recent segment traversal times in milliseconds, oldest first
    segment_times: VecDeque<f32>,
    since_evaluation: f32,
    skill: f32,
}

impl Default for AdaptiveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveMetrics {
    pub fn new() -> Self {
        Self {
            speed_ema: 0.0,
            speed_samples: 0,
            collisions: 0,
            near_misses: 0,
            offroad_seconds: 0.0,
            segment_times: VecDeque::with_capacity(SEGMENT_HISTORY),
            since_evaluation: 0.0,
            skill: 0.5,
        }
    }

    /// Record one frame of driving at `speed` px/s
    pub fn record_frame(&mut self, speed: f32, dt: f32, offroad: bool) {
        if self.speed_samples == 0 {
            self.speed_ema = speed;
        } else {
            self.speed_ema += SPEED_EMA_ALPHA * (speed - self.speed_ema);
        }
        self.speed_samples += 1;
        if offroad {
            self.offroad_seconds += dt.max(0.0);
        }
    }

    pub fn record_collision(&mut self) {
        self.collisions += 1;
    }

    pub fn record_near_miss(&mut self) {
        self.near_misses += 1;
    }

    /// Record the time taken to cover one track segment
    pub fn record_segment_time(&mut self, millis: f32) {
        if self.segment_times.len() == SEGMENT_HISTORY {
            self.segment_times.pop_front();
        }
        self.segment_times.push_back(millis);
    }

    /// Advance the evaluation clock; returns a target skill when an evaluation fires
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        self.since_evaluation += dt.max(0.0);
        if self.since_evaluation < EVALUATION_INTERVAL {
            return None;
        }
        self.since_evaluation = 0.0;
        self.skill = self.compute_skill();
        let target = (self.skill + 0.1).min(1.0);
        log::debug!(
            "Skill check: skill={:.2} target={:.2} near_misses={} collisions={} offroad={:.1}s",
            self.skill,
            target,
            self.near_misses,
            self.collisions,
            self.offroad_seconds
        );
        Some(target)
    }

    pub fn compute_skill(&self) -> f32 {
        let speed_score = (self.speed_ema / SPEED_REFERENCE).min(1.0);
        let reaction_score = if self.segment_times.len() >= MIN_SEGMENT_SAMPLES {
            (1.0 - self.segment_variance() / VARIANCE_REFERENCE).max(0.0)
        } else {
            0.5
        };
        let skill = 0.4 * speed_score + 0.3 * reaction_score
            + (0.02 * self.near_misses as f32).min(0.2)
            - (0.1 * self.collisions as f32).min(0.5)
            - (0.05 * self.offroad_seconds).min(0.3);
        skill.clamp(0.1, 1.0)
    }

    fn segment_variance(&self) -> f32 {
        let n = self.segment_times.len() as f32;
        let mean = self.segment_times.iter().sum::<f32>() / n;
        self.segment_times
            .iter()
            .map(|t| (t - mean) * (t - mean))
            .sum::<f32>()
            / n
    }

    /// Skill from the last evaluation
    pub fn skill(&self) -> f32 {
        self.skill
    }

    pub fn average_speed(&self) -> f32 {
        self.speed_ema
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn near_misses(&self) -> u32 {
        self.near_misses
    }

    pub fn offroad_seconds(&self) -> f32 {
        self.offroad_seconds
    }

    pub fn segment_samples(&self) -> usize {
        self.segment_times.len()
    }
}

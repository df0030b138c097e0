//! Procedural track generator
//!
//! Walks the track from start to end emitting sections drawn from a
//! template palette, decorates each section with roadside sprites, then
//! runs a moving-average pass over the numeric arrays.
//!
//! Every random draw comes from the caller's RNG in a fixed order, so the
//! same seed and parameters always give a bit-identical track.

use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::model::{RoadsideSprite, Section, SectionKind, Side, SpriteKind, Track};
use crate::consts::SEGMENT_LENGTH;
use crate::ease;
use crate::error::RacerError;

/// Probability of forcing a straight section at each step
const STRAIGHT_CHANCE: f32 = 0.2;
/// Segments scanned per sprite roll
const SPRITE_WINDOW: usize = 20;
/// Moving-average window applied in the final pass
const SMOOTHING_WINDOW: usize = 5;
/// Amplitude multiplier for extreme sections
const EXTREME_FACTOR: f32 = 1.5;
/// Share of the max amplitude used by mixed sections
const MIXED_FACTOR: f32 = 0.8;
/// Creativity above which extreme sections join the palette
const EXTREME_CREATIVITY: f32 = 0.7;

const BASE_PALETTE: [SectionKind; 6] = [
    SectionKind::Straight,
    SectionKind::Curves,
    SectionKind::Hills,
    SectionKind::Narrow,
    SectionKind::Wide,
    SectionKind::Mixed,
];

const EXTREME_PALETTE: [SectionKind; 3] = [
    SectionKind::ExtremeCurves,
    SectionKind::ExtremeHills,
    SectionKind::Alternating,
];

/// Visual theme, selects the roadside sprite mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Synthwave,
    Cyberpunk,
    Retrowave,
    Night,
    #[default]
    Default,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Synthwave => "synthwave",
            Theme::Cyberpunk => "cyberpunk",
            Theme::Retrowave => "retrowave",
            Theme::Night => "night",
            Theme::Default => "default",
        }
    }

    /// Parse a theme name; unknown names fall back to `Default`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "synthwave" => Theme::Synthwave,
            "cyberpunk" => Theme::Cyberpunk,
            "retrowave" => Theme::Retrowave,
            "night" => Theme::Night,
            "default" => Theme::Default,
            other => {
                log::warn!("Unknown theme '{}', using default sprite set", other);
                Theme::Default
            }
        }
    }

    /// Sprite kinds drawn from uniformly (repeats weight the draw)
    pub fn sprite_pool(&self) -> &'static [SpriteKind] {
        use SpriteKind::*;
        match self {
            Theme::Synthwave => &[Billboard, Building, Tree],
            Theme::Cyberpunk => &[Building, Billboard, Building],
            Theme::Retrowave => &[Tree, Billboard, Rock],
            Theme::Night | Theme::Default => &[Tree, Billboard, Rock, Building],
        }
    }
}

/// Generator knobs; out-of-range values are clamped on use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub complexity: f32,
    pub creativity: f32,
    pub theme: Theme,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            complexity: 0.5,
            creativity: 0.5,
            theme: Theme::Default,
        }
    }
}

/// Per-run parameters derived from skill and config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Informational: how many sections a track of typical length holds
    pub section_count_target: usize,
    pub min_section_len: usize,
    pub max_section_len: usize,
    pub max_curve: f32,
    pub max_hill: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub sprite_probability: f32,
    pub extreme_enabled: bool,
    pub alternating_cycle: usize,
    pub alternating_amplitude: f32,
}

impl GenerationParams {
    pub fn derive(player_skill: f32, config: &GeneratorConfig) -> Self {
        let skill = clamp_unit(player_skill);
        let complexity = clamp_unit(config.complexity);
        let creativity = clamp_unit(config.creativity);

        Self {
            section_count_target: (20.0 + 30.0 * complexity).round() as usize,
            min_section_len: (200.0 - 100.0 * skill).max(50.0).round() as usize,
            max_section_len: (300.0 - 100.0 * skill).max(100.0).round() as usize,
            max_curve: 0.3 + 0.7 * complexity,
            max_hill: 0.05 + 0.10 * complexity,
            min_width: (0.8 - 0.3 * skill).max(0.5),
            max_width: 1.3 + 0.2 * creativity,
            sprite_probability: 0.2 + 0.2 * creativity,
            extreme_enabled: creativity > EXTREME_CREATIVITY,
            alternating_cycle: (30.0 - 15.0 * skill).max(10.0).round() as usize,
            alternating_amplitude: 0.3 + 0.2 * creativity,
        }
    }
}

/// Builds tracks from section templates
#[derive(Debug, Clone)]
pub struct TrackGenerator {
    config: GeneratorConfig,
    segment_length: f32,
}

impl TrackGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            segment_length: SEGMENT_LENGTH,
        }
    }

    pub fn with_segment_length(mut self, segment_length: f32) -> Self {
        self.segment_length = segment_length;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a track of `length` segments
    pub fn generate<R: Rng + ?Sized>(
        &self,
        length: usize,
        player_skill: f32,
        rng: &mut R,
    ) -> Result<Track, RacerError> {
        if length == 0 {
            return Err(RacerError::InvalidArgument(
                "track length must be positive".to_string(),
            ));
        }

        let params = GenerationParams::derive(player_skill, &self.config);
        log::debug!(
            "Generating track: len={} theme={} sections={} curve={:.2} hill={:.3} extreme={}",
            length,
            self.config.theme.as_str(),
            params.section_count_target,
            params.max_curve,
            params.max_hill,
            params.extreme_enabled
        );

        let mut b = Builder::new(length);
        let mut pos = 0;
        while pos < length {
            let kind = pick_section(rng, params.extreme_enabled);
            let len = rng
                .random_range(params.min_section_len..=params.max_section_len)
                .min(length - pos);

            b.emit(kind, pos, len, &params, rng);
            b.decorate(pos, len, &params, self.config.theme, rng);
            b.sections.push(Section {
                kind,
                start: pos,
                len,
            });
            pos += len;
        }

        smooth(&mut b.curvature, SMOOTHING_WINDOW);
        smooth(&mut b.hills, SMOOTHING_WINDOW);
        smooth(&mut b.width_mul, SMOOTHING_WINDOW);

        log::info!(
            "Track generated: {} segments in {} sections",
            length,
            b.sections.len()
        );

        Ok(Track::from_parts(
            b.curvature,
            b.hills,
            b.width_mul,
            b.sprites,
            b.sections,
            self.segment_length,
        ))
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn pick_section<R: Rng + ?Sized>(rng: &mut R, extreme_enabled: bool) -> SectionKind {
    if rng.random::<f32>() < STRAIGHT_CHANCE {
        return SectionKind::Straight;
    }
    let extreme_len = if extreme_enabled {
        EXTREME_PALETTE.len()
    } else {
        0
    };
    let palette_len = BASE_PALETTE.len() + extreme_len;
    let idx = rng.random_range(0..palette_len);
    BASE_PALETTE
        .get(idx)
        .copied()
        .unwrap_or_else(|| EXTREME_PALETTE[idx - BASE_PALETTE.len()])
}

/// Normalised position of `j` within a run of `len` samples
#[inline]
fn unit_t(j: usize, len: usize) -> f32 {
    if len <= 1 {
        0.0
    } else {
        j as f32 / (len - 1) as f32
    }
}

/// Eased half-sine bump: 0 at both ends, 1 in the middle
#[inline]
fn bump(t: f32) -> f32 {
    (PI * ease(t)).sin()
}

/// Split `[start, start+len)` into `parts` consecutive runs, remainder to the last
fn split(start: usize, len: usize, parts: usize) -> impl Iterator<Item = (usize, usize)> {
    let parts = parts.clamp(1, len.max(1));
    let base = len / parts;
    (0..parts).map(move |p| {
        let s = start + p * base;
        let l = if p + 1 == parts { len - p * base } else { base };
        (s, l)
    })
}

/// Moving average over the interior; the first and last `window / 2` samples stay as-is
fn smooth(values: &mut [f32], window: usize) {
    let half = window / 2;
    if values.len() < window {
        return;
    }
    let src = values.to_vec();
    for i in half..values.len() - half {
        let sum: f32 = src[i - half..=i + half].iter().sum();
        values[i] = sum / window as f32;
    }
}

struct Builder {
    curvature: Vec<f32>,
    hills: Vec<f32>,
    width_mul: Vec<f32>,
    sprites: Vec<Option<RoadsideSprite>>,
    sections: Vec<Section>,
}

impl Builder {
    fn new(n: usize) -> Self {
        Self {
            curvature: vec![0.0; n],
            hills: vec![0.0; n],
            width_mul: vec![1.0; n],
            sprites: vec![None; n],
            sections: Vec::new(),
        }
    }

    fn emit<R: Rng + ?Sized>(
        &mut self,
        kind: SectionKind,
        start: usize,
        len: usize,
        params: &GenerationParams,
        rng: &mut R,
    ) {
        let end = start + len;
        match kind {
            SectionKind::Straight => {
                self.curvature[start..end].fill(0.0);
                self.hills[start..end].fill(0.0);
            }
            SectionKind::Curves => {
                let parts = rng.random_range(1..=3);
                bumps(&mut self.curvature, start, len, parts, params.max_curve, rng);
            }
            SectionKind::ExtremeCurves => {
                let parts = rng.random_range(2..=4);
                let amp = params.max_curve * EXTREME_FACTOR;
                bumps(&mut self.curvature, start, len, parts, amp, rng);
            }
            SectionKind::Hills => {
                let parts = rng.random_range(1..=4);
                bumps(&mut self.hills, start, len, parts, params.max_hill, rng);
            }
            SectionKind::ExtremeHills => {
                let parts = rng.random_range(2..=5);
                let amp = params.max_hill * EXTREME_FACTOR;
                bumps(&mut self.hills, start, len, parts, amp, rng);
            }
            SectionKind::Narrow => {
                for j in 0..len {
                    self.width_mul[start + j] =
                        1.0 + (params.min_width - 1.0) * bump(unit_t(j, len));
                }
            }
            SectionKind::Wide => {
                for j in 0..len {
                    self.width_mul[start + j] =
                        1.0 + (params.max_width - 1.0) * bump(unit_t(j, len));
                }
            }
            SectionKind::Mixed => {
                let c_amp = params.max_curve * MIXED_FACTOR;
                let h_amp = params.max_hill * MIXED_FACTOR;
                let c = rng.random_range(-c_amp..=c_amp);
                let h = rng.random_range(-h_amp..=h_amp);
                for j in 0..len {
                    let phase = PI * ease(unit_t(j, len));
                    self.curvature[start + j] = c * phase.sin();
                    // sin * cos keeps both ends at zero
                    self.hills[start + j] = h * 2.0 * phase.sin() * phase.cos();
                }
            }
            SectionKind::Alternating => {
                let cycle = params.alternating_cycle.max(1);
                for j in 0..len {
                    let k = j % cycle;
                    self.width_mul[start + j] = 1.0
                        + params.alternating_amplitude
                            * (2.0 * PI * k as f32 / cycle as f32).sin();
                }
            }
        }
    }

    fn decorate<R: Rng + ?Sized>(
        &mut self,
        start: usize,
        len: usize,
        params: &GenerationParams,
        theme: Theme,
        rng: &mut R,
    ) {
        let end = start + len;
        let pool = theme.sprite_pool();
        let mut window_start = start;
        while window_start < end {
            let window_len = SPRITE_WINDOW.min(end - window_start);
            if rng.random::<f32>() < params.sprite_probability {
                let offset = rng.random_range(0..window_len);
                let side = if rng.random_bool(0.5) {
                    Side::Left
                } else {
                    Side::Right
                };
                let kind = pool[rng.random_range(0..pool.len())];
                self.sprites[window_start + offset] = Some(RoadsideSprite { kind, side });
            }
            window_start += SPRITE_WINDOW;
        }
    }
}

/// Fill `parts` consecutive eased bumps with amplitudes drawn from `[-amp, amp]`
fn bumps<R: Rng + ?Sized>(
    values: &mut [f32],
    start: usize,
    len: usize,
    parts: usize,
    amp: f32,
    rng: &mut R,
) {
    for (s, l) in split(start, len, parts) {
        let a = rng.random_range(-amp..=amp);
        for j in 0..l {
            values[s + j] = a * bump(unit_t(j, l));
        }
    }
}

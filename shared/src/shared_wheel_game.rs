use crate::prize::{DrawResult, PrizeTable};
use crate::sampler;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Nudge applied before flooring so a pointer sitting exactly on a
/// segment centre never rounds into the previous segment.
pub const POINTER_EPSILON: f64 = 1e-7;

/// Minimum spacing of the tick sound while the wheel turns.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

fn normalize(rotation: f64) -> f64 {
    rotation.rem_euclid(TAU)
}

/// Segment under the pointer, which sits at angle 0 on the right-hand side.
/// Segment `i` spans `[i * 2π/n, (i + 1) * 2π/n)` in wheel coordinates.
pub fn index_under_pointer(rotation: f64, segment_count: usize) -> Option<usize> {
    if segment_count == 0 || !rotation.is_finite() {
        return None;
    }
    let segment_angle = TAU / segment_count as f64;
    let angle = (TAU - normalize(rotation)).rem_euclid(TAU);
    let index = ((angle + POINTER_EPSILON) / segment_angle).floor() as usize;
    Some(index.min(segment_count - 1))
}

/// Rotation that parks segment `index` under the pointer, `POINTER_EPSILON`
/// past its centre, after `revolutions` whole turns.
pub fn target_rotation(index: usize, segment_count: usize, revolutions: u32) -> f64 {
    if segment_count == 0 {
        return 0.0;
    }
    let index = index.min(segment_count - 1);
    let segment_angle = TAU / segment_count as f64;
    let target = index as f64 * segment_angle + segment_angle / 2.0 + POINTER_EPSILON;
    revolutions as f64 * TAU + (TAU - target).rem_euclid(TAU)
}

/// `1 - (1 - p)^4`.
pub fn ease_out_quart(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinSettings {
    pub min_revolutions: u32,
    pub max_revolutions: u32,
    pub duration_ms: u64,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            min_revolutions: 5,
            max_revolutions: 8,
            duration_ms: 4000,
        }
    }
}

impl From<&crate::config::WheelDefaults> for SpinSettings {
    fn from(defaults: &crate::config::WheelDefaults) -> Self {
        Self {
            min_revolutions: defaults.min_revolutions,
            max_revolutions: defaults.max_revolutions,
            duration_ms: defaults.animation_duration,
        }
    }
}

/// A planned spin: the prize is decided first and the motion is derived
/// from it, so the wheel always stops on the drawn segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelSpin {
    pub prize: DrawResult,
    pub revolutions: u32,
    pub start_rotation: f64,
    pub final_rotation: f64,
    pub duration_ms: u64,
}

impl WheelSpin {
    pub fn rotation_at(&self, elapsed_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return self.final_rotation;
        }
        let progress = elapsed_ms as f64 / self.duration_ms as f64;
        self.start_rotation + (self.final_rotation - self.start_rotation) * ease_out_quart(progress)
    }

    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }

    pub fn tick_interval_ms(&self) -> u64 {
        (self.duration_ms / 25).max(MIN_TICK_INTERVAL_MS)
    }
}

/// Draws a segment, then a whole number of turns in
/// `[min_revolutions, max_revolutions]`, continuing from `current_rotation`.
pub fn plan_spin<R: Rng + ?Sized>(
    rng: &mut R,
    table: &PrizeTable,
    settings: &SpinSettings,
    current_rotation: f64,
) -> Option<WheelSpin> {
    let prize = sampler::draw(rng, table)?;
    let low = settings.min_revolutions.min(settings.max_revolutions);
    let high = settings.min_revolutions.max(settings.max_revolutions);
    let revolutions = rng.gen_range(low..=high);

    let start_rotation = if current_rotation.is_finite() { current_rotation } else { 0.0 };
    let base_turns = (start_rotation / TAU).floor();
    let final_rotation = base_turns * TAU + target_rotation(prize.prize_index, table.len(), revolutions);

    Some(WheelSpin {
        prize,
        revolutions,
        start_rotation,
        final_rotation,
        duration_ms: settings.duration_ms,
    })
}

/// Wheel state between spins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WheelGame {
    pub rotation: f64,
    pub current_spin: Option<WheelSpin>,
    pub spin_started_at: Option<u64>,
}

impl WheelGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_spinning(&self) -> bool {
        self.current_spin.is_some()
    }

    pub fn start_spin(&mut self, spin: WheelSpin, current_time: u64) {
        self.current_spin = Some(spin);
        self.spin_started_at = Some(current_time);
    }

    /// Rotation to draw at `current_time`; lands the spin once it is over.
    pub fn update(&mut self, current_time: u64) -> f64 {
        if let (Some(spin), Some(started)) = (&self.current_spin, self.spin_started_at) {
            let elapsed = current_time.saturating_sub(started);
            self.rotation = spin.rotation_at(elapsed);
            if spin.is_finished(elapsed) {
                self.rotation = spin.final_rotation;
                self.current_spin = None;
                self.spin_started_at = None;
            }
        }
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prize::Prize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(n: usize) -> PrizeTable {
        PrizeTable::new((0..n).map(|i| Prize::new(format!("segment {}", i))).collect()).unwrap()
    }

    #[test]
    fn test_alignment_round_trip() {
        for n in 1..=24 {
            for index in 0..n {
                for revolutions in 0..=12 {
                    let rotation = target_rotation(index, n, revolutions);
                    assert_eq!(index_under_pointer(rotation, n), Some(index), "n={} i={} r={}", n, index, revolutions);
                }
            }
        }
    }

    #[test]
    fn test_target_sits_just_past_segment_centre() {
        for n in [1usize, 4, 7, 12] {
            let segment_angle = TAU / n as f64;
            for index in 0..n {
                let rotation = target_rotation(index, n, 0);
                let angle = (TAU - rotation.rem_euclid(TAU)).rem_euclid(TAU);
                let centre = index as f64 * segment_angle + segment_angle / 2.0;
                assert!((angle - centre - POINTER_EPSILON).abs() < 1e-9, "n={} i={}", n, index);
            }
        }
    }

    #[test]
    fn test_index_always_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let n = rng.gen_range(1..40);
            let rotation = rng.gen_range(-100.0..100.0);
            let index = index_under_pointer(rotation, n).unwrap();
            assert!(index < n);
        }
        assert_eq!(index_under_pointer(1.0, 0), None);
        assert_eq!(index_under_pointer(f64::NAN, 4), None);
    }

    #[test]
    fn test_zero_rotation_points_at_first_segment() {
        assert_eq!(index_under_pointer(0.0, 6), Some(0));
    }

    #[test]
    fn test_planned_spin_lands_on_drawn_prize() {
        let mut rng = StdRng::seed_from_u64(42);
        let table = table(6);
        let settings = SpinSettings::default();
        let mut current = 0.0;
        for _ in 0..200 {
            let spin = plan_spin(&mut rng, &table, &settings, current).unwrap();
            assert!((5..=8).contains(&spin.revolutions));
            assert!(spin.final_rotation > spin.start_rotation);
            assert_eq!(index_under_pointer(spin.final_rotation, 6), Some(spin.prize.prize_index));
            assert_eq!(spin.rotation_at(spin.duration_ms), spin.final_rotation);
            current = spin.final_rotation;
        }
    }

    #[test]
    fn test_plan_spin_on_empty_table() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(plan_spin(&mut rng, &table(0), &SpinSettings::default(), 0.0).is_none());
    }

    #[test]
    fn test_easing_is_monotonic() {
        let mut previous = 0.0;
        for step in 0..=100 {
            let eased = ease_out_quart(step as f64 / 100.0);
            assert!(eased >= previous);
            previous = eased;
        }
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert_eq!(ease_out_quart(2.0), 1.0);
    }

    #[test]
    fn test_game_update_lands_spin() {
        let mut rng = StdRng::seed_from_u64(3);
        let spin = plan_spin(&mut rng, &table(8), &SpinSettings::default(), 0.0).unwrap();
        let final_rotation = spin.final_rotation;
        assert!(spin.tick_interval_ms() >= MIN_TICK_INTERVAL_MS);
        let mut game = WheelGame::new();
        game.start_spin(spin, 1_000);
        assert!(game.is_spinning());
        assert!(game.update(2_000) < final_rotation);
        assert_eq!(game.update(5_000), final_rotation);
        assert!(!game.is_spinning());
    }
}

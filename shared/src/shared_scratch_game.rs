use crate::config::ScratchDefaults;
use crate::prize::{DrawResult, PrizeTable};
use crate::sampler;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Side of one coverage cell in card pixels.
pub const CELL_SIZE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScratchPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScratchProgress {
    pub percentage: f64,
    /// True only for the stroke that crossed the threshold.
    pub just_revealed: bool,
}

/// The silver surface over a prize drawn when the card was dealt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchCard {
    prize: DrawResult,
    columns: usize,
    rows: usize,
    cleared: Vec<bool>,
    cleared_count: usize,
    brush_radius: f64,
    threshold: f64,
    revealed: bool,
}

impl ScratchCard {
    pub fn deal<R: Rng + ?Sized>(rng: &mut R, table: &PrizeTable, defaults: &ScratchDefaults) -> Option<Self> {
        let prize = sampler::draw(rng, table)?;
        let columns = ((defaults.card_width as f64 / CELL_SIZE).ceil() as usize).max(1);
        let rows = ((defaults.card_height as f64 / CELL_SIZE).ceil() as usize).max(1);
        Some(Self {
            prize,
            columns,
            rows,
            cleared: vec![false; columns * rows],
            cleared_count: 0,
            brush_radius: defaults.brush_radius.max(0.0),
            threshold: defaults.reveal_threshold.clamp(0.0, 100.0),
            revealed: false,
        })
    }

    pub fn prize(&self) -> &DrawResult {
        &self.prize
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn percentage(&self) -> f64 {
        self.cleared_count as f64 / self.cleared.len() as f64 * 100.0
    }

    /// Clears every cell whose centre lies under the brush at each point.
    pub fn scratch(&mut self, points: &[ScratchPoint]) -> ScratchProgress {
        for point in points {
            self.clear_around(*point);
        }
        let percentage = self.percentage();
        let just_revealed = !self.revealed && percentage >= self.threshold;
        if just_revealed {
            self.revealed = true;
            log::debug!("scratch card revealed at {:.1}%", percentage);
        }
        ScratchProgress { percentage, just_revealed }
    }

    fn clear_around(&mut self, point: ScratchPoint) {
        if !point.x.is_finite() || !point.y.is_finite() {
            return;
        }
        let r = self.brush_radius;
        let first_col = ((point.x - r) / CELL_SIZE).floor().max(0.0) as usize;
        let last_col = (((point.x + r) / CELL_SIZE).floor().max(0.0) as usize).min(self.columns - 1);
        let first_row = ((point.y - r) / CELL_SIZE).floor().max(0.0) as usize;
        let last_row = (((point.y + r) / CELL_SIZE).floor().max(0.0) as usize).min(self.rows - 1);

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let cx = (col as f64 + 0.5) * CELL_SIZE;
                let cy = (row as f64 + 0.5) * CELL_SIZE;
                let (dx, dy) = (cx - point.x, cy - point.y);
                if dx * dx + dy * dy <= r * r {
                    let cell = &mut self.cleared[row * self.columns + col];
                    if !*cell {
                        *cell = true;
                        self.cleared_count += 1;
                    }
                }
            }
        }
    }

    /// Restores the surface and deals a new prize.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, table: &PrizeTable) -> bool {
        let Some(prize) = sampler::draw(rng, table) else {
            return false;
        };
        self.prize = prize;
        self.cleared.iter_mut().for_each(|c| *c = false);
        self.cleared_count = 0;
        self.revealed = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScratchCardConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card() -> ScratchCard {
        let mut rng = StdRng::seed_from_u64(2);
        let config = ScratchCardConfig::default();
        ScratchCard::deal(&mut rng, &config.prizes, &config.defaults).unwrap()
    }

    fn sweep(width: f64, height: f64, step: f64) -> Vec<ScratchPoint> {
        let mut points = Vec::new();
        let mut y = 0.0;
        while y <= height {
            let mut x = 0.0;
            while x <= width {
                points.push(ScratchPoint { x, y });
                x += step;
            }
            y += step;
        }
        points
    }

    #[test]
    fn test_single_stroke_stays_below_threshold() {
        let mut card = card();
        let progress = card.scratch(&[ScratchPoint { x: 200.0, y: 125.0 }]);
        assert!(progress.percentage > 0.0 && progress.percentage < 60.0);
        assert!(!progress.just_revealed);
        assert!(!card.is_revealed());
    }

    #[test]
    fn test_reveals_exactly_once() {
        let mut card = card();
        let first = card.scratch(&sweep(400.0, 250.0, 20.0));
        assert!(first.just_revealed);
        assert!(first.percentage >= 60.0);
        let second = card.scratch(&[ScratchPoint { x: 10.0, y: 10.0 }]);
        assert!(!second.just_revealed);
        assert!(card.is_revealed());
    }

    #[test]
    fn test_points_off_card_are_ignored() {
        let mut card = card();
        let progress = card.scratch(&[ScratchPoint { x: -500.0, y: -500.0 }, ScratchPoint { x: f64::NAN, y: 0.0 }]);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn test_reset_restores_surface() {
        let mut rng = StdRng::seed_from_u64(3);
        let table = ScratchCardConfig::default().prizes;
        let mut card = card();
        card.scratch(&sweep(400.0, 250.0, 20.0));
        assert!(card.reset(&mut rng, &table));
        assert_eq!(card.percentage(), 0.0);
        assert!(!card.is_revealed());
    }
}

use crate::config::PlinkoDefaults;
use crate::constants::FRAME_MS;
use crate::prize::{DrawResult, PrizeTable};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const GRAVITY: f64 = 0.5;
pub const FRICTION: f64 = 0.98;
pub const BOUNCE: f64 = 0.7;
/// Total spread of the random deflection applied on every pin hit, in radians.
pub const DEFLECTION_SPREAD: f64 = 0.5;

const PIN_AREA_TOP: f64 = 100.0;
const PRIZE_AREA_HEIGHT: f64 = 200.0;
const LANDING_MARGIN: f64 = 100.0;
const DROP_START_Y: f64 = 20.0;
const MAX_FRAMES: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f64,
    pub height: f64,
    pub pin_rows: u32,
    pub ball_radius: f64,
    pub pin_radius: f64,
}

impl Default for Board {
    fn default() -> Self {
        Self::from(&PlinkoDefaults::default())
    }
}

impl From<&PlinkoDefaults> for Board {
    fn from(defaults: &PlinkoDefaults) -> Self {
        Self {
            width: defaults.board_width,
            height: defaults.board_height,
            pin_rows: defaults.pin_rows,
            ball_radius: defaults.ball_size,
            pin_radius: defaults.pin_size,
        }
    }
}

impl Board {
    /// Pins in a triangle; the single-pin apex row is left out so the ball
    /// falls freely before its first hit.
    pub fn pins(&self) -> Vec<Point> {
        let mut pins = Vec::new();
        if self.pin_rows == 0 {
            return pins;
        }
        let pin_spacing = self.width / (self.pin_rows as f64 + 1.0);
        let row_spacing = (self.height - PRIZE_AREA_HEIGHT) / self.pin_rows as f64;

        for row in 1..self.pin_rows {
            let pins_in_row = row + 1;
            let row_width = pins_in_row as f64 * pin_spacing;
            let start_x = (self.width - row_width) / 2.0 + pin_spacing / 2.0;
            for col in 0..pins_in_row {
                pins.push(Point {
                    x: start_x + col as f64 * pin_spacing,
                    y: PIN_AREA_TOP + row as f64 * row_spacing,
                });
            }
        }
        pins
    }

    pub fn landing_y(&self) -> f64 {
        self.height - LANDING_MARGIN
    }
}

/// Slot under horizontal position `x`, clamped into `[0, slots - 1]`.
pub fn slot_for_x(x: f64, width: f64, slots: usize) -> Option<usize> {
    if slots == 0 || width <= 0.0 {
        return None;
    }
    let slot_width = width / slots as f64;
    let raw = (x / slot_width).floor();
    if raw.is_nan() || raw < 0.0 {
        return Some(0);
    }
    Some((raw as usize).min(slots - 1))
}

#[derive(Debug, Clone, Copy)]
struct Ball {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlinkoDrop {
    pub path: Vec<Point>,
    pub frames: u32,
    pub landing_x: f64,
    pub slot: usize,
}

impl PlinkoDrop {
    pub fn duration_ms(&self) -> u64 {
        (self.frames as f64 * FRAME_MS).round() as u64
    }

    pub fn draw_result(&self, table: &PrizeTable) -> Option<DrawResult> {
        table.draw_result(self.slot)
    }
}

/// Runs one drop frame by frame until the ball reaches the landing line.
/// The outcome is whatever slot the physics ends in.
pub fn simulate_drop<R: Rng + ?Sized>(rng: &mut R, board: &Board, slots: usize) -> Option<PlinkoDrop> {
    if slots == 0 || board.width <= 0.0 || board.height <= 0.0 {
        return None;
    }
    let pins = board.pins();
    let min_distance = board.ball_radius + board.pin_radius;
    let mut ball = Ball {
        x: board.width / 2.0,
        y: DROP_START_Y,
        vx: rng.gen::<f64>() - 0.5,
        vy: 0.0,
    };
    let mut path = vec![Point { x: ball.x, y: ball.y }];
    let mut frames = 0;

    while ball.y < board.landing_y() && frames < MAX_FRAMES {
        frames += 1;
        ball.vy += GRAVITY;
        ball.x += ball.vx;
        ball.y += ball.vy;
        ball.vx *= FRICTION;

        for pin in &pins {
            let dx = ball.x - pin.x;
            let dy = ball.y - pin.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < min_distance {
                let angle = dy.atan2(dx);
                ball.x = pin.x + angle.cos() * min_distance;
                ball.y = pin.y + angle.sin() * min_distance;

                let deflected = angle + (rng.gen::<f64>() - 0.5) * DEFLECTION_SPREAD;
                let speed = (ball.vx * ball.vx + ball.vy * ball.vy).sqrt();
                ball.vx = deflected.cos() * speed * BOUNCE;
                ball.vy = deflected.sin() * speed * BOUNCE;
            }
        }

        if ball.x - board.ball_radius < 0.0 {
            ball.x = board.ball_radius;
            ball.vx = ball.vx.abs() * BOUNCE;
        } else if ball.x + board.ball_radius > board.width {
            ball.x = board.width - board.ball_radius;
            ball.vx = -ball.vx.abs() * BOUNCE;
        }

        path.push(Point { x: ball.x, y: ball.y });
    }

    if frames >= MAX_FRAMES {
        log::warn!("plinko drop hit the frame cap at y={:.1}", ball.y);
    }

    let slot = slot_for_x(ball.x, board.width, slots)?;
    Some(PlinkoDrop {
        path,
        frames,
        landing_x: ball.x,
        slot,
    })
}

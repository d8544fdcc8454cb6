//! Prize selection: uniform, weighted and rarity-tiered draws.
//!
//! Every function takes the caller's RNG; nothing here keeps state between
//! draws. An empty table (or a table whose weights are all zero) yields `None`.

use crate::prize::{DrawResult, PrizeTable, Rarity};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const BAND_SUM_TOLERANCE: f64 = 1e-6;

/// `floor(u * len)`, clamped so `u` landing on 1.0 through rounding stays in range.
pub fn draw_uniform<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let u: f64 = rng.gen();
    let index = (u * len as f64).floor() as usize;
    Some(index.min(len - 1))
}

/// Cumulative walk over `weights`. Zero, negative and non-finite weights are
/// skipped and can never be returned.
pub fn draw_weighted<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let usable = |w: f64| w.is_finite() && w > 0.0;
    let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
    if total <= 0.0 {
        return None;
    }

    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_usable = None;
    for (index, &weight) in weights.iter().enumerate() {
        if !usable(weight) {
            continue;
        }
        cumulative += weight;
        last_usable = Some(index);
        if target < cumulative {
            return Some(index);
        }
    }
    last_usable
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    pub rarity: Rarity,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TierBandsError {
    Empty,
    InvalidProbability { rarity: Rarity },
    DoesNotSumToOne { sum: f64 },
}

impl fmt::Display for TierBandsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "at least one tier band is required"),
            Self::InvalidProbability { rarity } => {
                write!(f, "tier band {} has an invalid probability", rarity)
            }
            Self::DoesNotSumToOne { sum } => {
                write!(f, "tier band probabilities sum to {} instead of 1", sum)
            }
        }
    }
}

impl std::error::Error for TierBandsError {}

/// Contiguous bands partitioning `[0, 1)`, checked in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierBand>", into = "Vec<TierBand>")]
pub struct TierBands {
    bands: Vec<TierBand>,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            bands: vec![
                TierBand { rarity: Rarity::Legendary, probability: 0.03 },
                TierBand { rarity: Rarity::Epic, probability: 0.12 },
                TierBand { rarity: Rarity::Rare, probability: 0.25 },
                TierBand { rarity: Rarity::Common, probability: 0.60 },
            ],
        }
    }
}

impl TierBands {
    pub fn new(bands: Vec<TierBand>) -> Result<Self, TierBandsError> {
        if bands.is_empty() {
            return Err(TierBandsError::Empty);
        }
        for band in &bands {
            if !band.probability.is_finite() || band.probability < 0.0 {
                return Err(TierBandsError::InvalidProbability { rarity: band.rarity });
            }
        }
        let sum: f64 = bands.iter().map(|b| b.probability).sum();
        if (sum - 1.0).abs() > BAND_SUM_TOLERANCE {
            return Err(TierBandsError::DoesNotSumToOne { sum });
        }
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[TierBand] {
        &self.bands
    }

    /// Locates the band containing `u`. Values at or past the end fall into
    /// the last band.
    pub fn tier_for(&self, u: f64) -> Rarity {
        let mut upper = 0.0;
        for band in &self.bands {
            upper += band.probability;
            if u < upper {
                return band.rarity;
            }
        }
        self.bands[self.bands.len() - 1].rarity
    }

    pub fn probability_of(&self, rarity: Rarity) -> f64 {
        self.bands
            .iter()
            .filter(|b| b.rarity == rarity)
            .map(|b| b.probability)
            .sum()
    }
}

impl TryFrom<Vec<TierBand>> for TierBands {
    type Error = TierBandsError;

    fn try_from(bands: Vec<TierBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<TierBands> for Vec<TierBand> {
    fn from(bands: TierBands) -> Self {
        bands.bands
    }
}

/// Draws a tier by its band, then a prize uniformly inside that tier.
/// Bands with no prizes in `table` are skipped and the rest renormalised.
pub fn draw_tiered<R: Rng + ?Sized>(
    rng: &mut R,
    table: &PrizeTable,
    bands: &TierBands,
) -> Option<usize> {
    let populated: Vec<(f64, Vec<usize>)> = bands
        .bands()
        .iter()
        .map(|band| (band.probability, table.indices_of(band.rarity)))
        .filter(|(probability, members)| *probability > 0.0 && !members.is_empty())
        .collect();

    let band_weights: Vec<f64> = populated.iter().map(|(p, _)| *p).collect();
    let band = draw_weighted(rng, &band_weights)?;
    let members = &populated[band].1;
    let pick = draw_uniform(rng, members.len())?;
    Some(members[pick])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Weighting {
    /// Follow the table: weighted if any prize has a weight, else uniform.
    Table,
    Uniform,
    Tiered { bands: TierBands },
}

pub fn draw_index<R: Rng + ?Sized>(
    rng: &mut R,
    table: &PrizeTable,
    weighting: &Weighting,
) -> Option<usize> {
    match weighting {
        Weighting::Uniform => draw_uniform(rng, table.len()),
        Weighting::Tiered { bands } => draw_tiered(rng, table, bands),
        Weighting::Table => match table.weights() {
            Some(weights) => draw_weighted(rng, &weights),
            None => draw_uniform(rng, table.len()),
        },
    }
}

/// One draw using the table's own weighting.
pub fn draw<R: Rng + ?Sized>(rng: &mut R, table: &PrizeTable) -> Option<DrawResult> {
    draw_with(rng, table, &Weighting::Table)
}

pub fn draw_with<R: Rng + ?Sized>(
    rng: &mut R,
    table: &PrizeTable,
    weighting: &Weighting,
) -> Option<DrawResult> {
    let index = draw_index(rng, table, weighting)?;
    table.draw_result(index)
}

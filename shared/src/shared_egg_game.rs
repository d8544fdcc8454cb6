use crate::prize::{DrawResult, PrizeTable, Rarity};
use crate::sampler::{self, TierBands};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EggError {
    AlreadyCracked(usize),
    NoSuchEgg(usize),
    EmptyTable,
}

impl fmt::Display for EggError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCracked(index) => write!(f, "Egg {} is already cracked", index),
            Self::NoSuchEgg(index) => write!(f, "There is no egg {}", index),
            Self::EmptyTable => write!(f, "{}", crate::constants::EMPTY_PRIZE_TABLE_ERROR),
        }
    }
}

impl std::error::Error for EggError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackedEgg {
    pub egg: usize,
    pub draw: DrawResult,
}

impl CrackedEgg {
    pub fn rarity(&self) -> Option<Rarity> {
        self.draw.prize.rarity
    }

    /// Rare and better get the confetti cue.
    pub fn is_rare(&self) -> bool {
        self.rarity().map(Rarity::is_rare_or_better).unwrap_or(false)
    }

    pub fn is_legendary(&self) -> bool {
        self.rarity() == Some(Rarity::Legendary)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EggBoard {
    eggs: Vec<Option<DrawResult>>,
}

impl EggBoard {
    pub fn new(egg_count: usize) -> Self {
        Self {
            eggs: vec![None; egg_count],
        }
    }

    pub fn egg_count(&self) -> usize {
        self.eggs.len()
    }

    pub fn cracked_count(&self) -> usize {
        self.eggs.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_cracked(&self, egg: usize) -> bool {
        matches!(self.eggs.get(egg), Some(Some(_)))
    }

    pub fn is_complete(&self) -> bool {
        !self.eggs.is_empty() && self.eggs.iter().all(Option::is_some)
    }

    /// Each egg is drawn at the moment it is cracked, by rarity band.
    pub fn crack<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        egg: usize,
        table: &PrizeTable,
        bands: &TierBands,
    ) -> Result<CrackedEgg, EggError> {
        let slot = self.eggs.get_mut(egg).ok_or(EggError::NoSuchEgg(egg))?;
        if slot.is_some() {
            return Err(EggError::AlreadyCracked(egg));
        }
        let index = sampler::draw_tiered(rng, table, bands).ok_or(EggError::EmptyTable)?;
        let draw = table.draw_result(index).ok_or(EggError::EmptyTable)?;
        *slot = Some(draw.clone());
        Ok(CrackedEgg { egg, draw })
    }

    pub fn reset(&mut self) {
        self.eggs.iter_mut().for_each(|e| *e = None);
    }
}

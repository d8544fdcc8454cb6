use crate::prize::{DrawResult, PrizeTable};
use crate::sampler;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiftError {
    AlreadySelected,
    NoSuchBox(usize),
}

impl fmt::Display for GiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySelected => write!(f, "A gift has already been opened"),
            Self::NoSuchBox(index) => write!(f, "There is no gift box {}", index),
        }
    }
}

impl std::error::Error for GiftError {}

/// Boxes are filled when the session is created, one independent draw
/// each, so the choice of box does not influence the odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftSession {
    boxes: Vec<DrawResult>,
    selected: Option<usize>,
}

impl GiftSession {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, table: &PrizeTable, box_count: usize) -> Option<Self> {
        let boxes = fill_boxes(rng, table, box_count)?;
        Some(Self { boxes, selected: None })
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) -> Result<DrawResult, GiftError> {
        if self.selected.is_some() {
            return Err(GiftError::AlreadySelected);
        }
        let draw = self.boxes.get(index).cloned().ok_or(GiftError::NoSuchBox(index))?;
        self.selected = Some(index);
        Ok(draw)
    }

    /// Contents of every box, shown once a box has been opened.
    pub fn revealed_boxes(&self) -> Option<&[DrawResult]> {
        self.selected.map(|_| self.boxes.as_slice())
    }

    /// Refills every box from `table` and clears the selection.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, table: &PrizeTable) -> bool {
        match fill_boxes(rng, table, self.boxes.len()) {
            Some(boxes) => {
                self.boxes = boxes;
                self.selected = None;
                true
            }
            None => false,
        }
    }
}

fn fill_boxes<R: Rng + ?Sized>(rng: &mut R, table: &PrizeTable, box_count: usize) -> Option<Vec<DrawResult>> {
    if box_count == 0 {
        return None;
    }
    (0..box_count).map(|_| sampler::draw(rng, table)).collect()
}

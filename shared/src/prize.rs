use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

pub const DEFAULT_PRIZE_COLOR: &str = "#95a5a6";

fn default_color() -> String {
    DEFAULT_PRIZE_COLOR.to_string()
}

/// Rarity tier used by tiered draws (mystery egg, slot symbols).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Rare and above get the big celebration.
    pub fn is_rare_or_better(self) -> bool {
        !matches!(self, Rarity::Common)
    }
}

/// One reward option. Field names on the wire follow the configuration
/// documents (`text`, `value`, `color`, `icon`, `probability`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    #[serde(rename = "text")]
    pub label: String,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub detail_value: Option<String>,
    #[serde(
        rename = "probability",
        alias = "weight",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    #[serde(rename = "color", default = "default_color")]
    pub display_color: String,
    #[serde(rename = "icon", default, skip_serializing_if = "Option::is_none")]
    pub display_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
}

impl Prize {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail_value: None,
            weight: None,
            display_color: default_color(),
            display_icon: None,
            multiplier: None,
            rarity: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.detail_value = Some(value.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.display_color = color.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.display_icon = Some(icon.into());
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrizeTableError {
    NegativeWeight { index: usize },
    NonFiniteWeight { index: usize },
}

impl fmt::Display for PrizeTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeWeight { index } => write!(f, "prize {} has a negative weight", index),
            Self::NonFiniteWeight { index } => write!(f, "prize {} has a non-finite weight", index),
        }
    }
}

impl std::error::Error for PrizeTableError {}

/// Ordered prize list. The order is the physical layout order (wheel
/// segments, plinko slots, gift boxes) and must be the one the renderer uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Prize>", into = "Vec<Prize>")]
pub struct PrizeTable {
    prizes: Vec<Prize>,
}

impl PrizeTable {
    pub fn new(prizes: Vec<Prize>) -> Result<Self, PrizeTableError> {
        for (index, prize) in prizes.iter().enumerate() {
            if let Some(weight) = prize.weight {
                if !weight.is_finite() {
                    return Err(PrizeTableError::NonFiniteWeight { index });
                }
                if weight < 0.0 {
                    return Err(PrizeTableError::NegativeWeight { index });
                }
            }
        }
        Ok(Self { prizes })
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Prize> {
        self.prizes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prize> {
        self.prizes.iter()
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    /// True as soon as one prize carries a weight.
    pub fn is_weighted(&self) -> bool {
        self.prizes.iter().any(|p| p.weight.is_some())
    }

    /// Resolved weights, or `None` for a uniform table. Prizes without a
    /// weight in a weighted table resolve to 0 and are never drawn.
    pub fn weights(&self) -> Option<Vec<f64>> {
        if !self.is_weighted() {
            return None;
        }
        Some(self.prizes.iter().map(|p| p.weight.unwrap_or(0.0)).collect())
    }

    pub fn indices_of(&self, rarity: Rarity) -> Vec<usize> {
        self.prizes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.rarity == Some(rarity))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn draw_result(&self, prize_index: usize) -> Option<DrawResult> {
        self.prizes.get(prize_index).map(|prize| DrawResult {
            prize_index,
            prize: prize.clone(),
        })
    }
}

impl TryFrom<Vec<Prize>> for PrizeTable {
    type Error = PrizeTableError;

    fn try_from(prizes: Vec<Prize>) -> Result<Self, Self::Error> {
        Self::new(prizes)
    }
}

impl From<PrizeTable> for Vec<Prize> {
    fn from(table: PrizeTable) -> Self {
        table.prizes
    }
}

impl<'a> IntoIterator for &'a PrizeTable {
    type Item = &'a Prize;
    type IntoIter = std::slice::Iter<'a, Prize>;

    fn into_iter(self) -> Self::IntoIter {
        self.prizes.iter()
    }
}

/// The outcome of one draw. Produced once per play and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResult {
    pub prize_index: usize,
    pub prize: Prize,
}

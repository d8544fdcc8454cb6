use crate::constants::{REEL_COUNT, REEL_ROWS};
use crate::prize::{DrawResult, Prize, PrizeTable, Rarity};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Row that pays.
pub const CENTER_ROW: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSymbol {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub value: u32,
    pub color: String,
    pub rarity: Rarity,
}

impl SlotSymbol {
    fn new(id: &str, symbol: &str, name: &str, value: u32, color: &str, rarity: Rarity) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            value,
            color: color.to_string(),
            rarity,
        }
    }

    pub fn to_prize(&self) -> Prize {
        Prize::new(self.name.clone())
            .with_value(self.value.to_string())
            .with_icon(self.symbol.clone())
            .with_color(self.color.clone())
            .with_rarity(self.rarity)
    }
}

pub fn default_symbols() -> Vec<SlotSymbol> {
    vec![
        SlotSymbol::new("cherry", "🍒", "Cherry", 10, "#e74c3c", Rarity::Common),
        SlotSymbol::new("bell", "🔔", "Bell", 25, "#f1c40f", Rarity::Common),
        SlotSymbol::new("clover", "🍀", "Clover", 50, "#27ae60", Rarity::Rare),
        SlotSymbol::new("diamond", "💎", "Diamond", 100, "#3498db", Rarity::Epic),
        SlotSymbol::new("seven", "7️⃣", "Seven", 500, "#9b59b6", Rarity::Legendary),
    ]
}

/// Copies of each symbol placed on a strip, by rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripCounts {
    pub common: usize,
    pub rare: usize,
    pub epic: usize,
    pub legendary: usize,
}

impl Default for StripCounts {
    fn default() -> Self {
        Self {
            common: 12,
            rare: 6,
            epic: 3,
            legendary: 2,
        }
    }
}

impl StripCounts {
    pub fn for_rarity(&self, rarity: Rarity) -> usize {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// Indices into `symbols`, repeated per rarity count and shuffled.
pub fn build_reel_strip<R: Rng + ?Sized>(rng: &mut R, symbols: &[SlotSymbol], counts: &StripCounts) -> Vec<usize> {
    let mut strip: Vec<usize> = symbols
        .iter()
        .enumerate()
        .flat_map(|(i, s)| std::iter::repeat(i).take(counts.for_rarity(s.rarity)))
        .collect();
    strip.shuffle(rng);
    strip
}

/// Symbol indices laid out `reels[reel][row]`.
pub type Reels = Vec<Vec<usize>>;

/// Each reel gets its own strip; every row is an independent pick from it.
/// `None` when the strips would be empty.
pub fn spin_reels<R: Rng + ?Sized>(rng: &mut R, symbols: &[SlotSymbol], counts: &StripCounts) -> Option<Reels> {
    let mut reels = Vec::with_capacity(REEL_COUNT);
    for _ in 0..REEL_COUNT {
        let strip = build_reel_strip(rng, symbols, counts);
        let mut reel = Vec::with_capacity(REEL_ROWS);
        for _ in 0..REEL_ROWS {
            reel.push(*strip.choose(rng)?);
        }
        reels.push(reel);
    }
    Some(reels)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinResult {
    pub is_win: bool,
    pub win_amount: u32,
    /// Winning row per reel; empty on a loss.
    pub winning_line: Vec<usize>,
    pub symbol_index: Option<usize>,
}

impl WinResult {
    fn loss() -> Self {
        Self {
            is_win: false,
            win_amount: 0,
            winning_line: Vec::new(),
            symbol_index: None,
        }
    }
}

/// Win iff every reel shows the same symbol id on the centre row.
pub fn check_win(reels: &Reels, symbols: &[SlotSymbol]) -> WinResult {
    let centre: Option<Vec<&SlotSymbol>> = reels
        .iter()
        .map(|reel| reel.get(CENTER_ROW).and_then(|&i| symbols.get(i)))
        .collect();
    let Some(centre) = centre else {
        return WinResult::loss();
    };
    let Some(first) = centre.first() else {
        return WinResult::loss();
    };
    if centre.len() != REEL_COUNT || !centre.iter().all(|s| s.id == first.id) {
        return WinResult::loss();
    }
    WinResult {
        is_win: true,
        win_amount: first.value,
        winning_line: vec![CENTER_ROW; REEL_COUNT],
        symbol_index: reels[0].get(CENTER_ROW).copied(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpin {
    pub reels: Reels,
    pub result: WinResult,
    /// Time at which each reel stops, left to right, relative to the pull.
    pub reel_stops_ms: Vec<u64>,
}

impl SlotSpin {
    /// Against the table built from the same symbols: the symbol's entry on
    /// a win, the trailing losing entry otherwise.
    pub fn draw_result(&self, table: &PrizeTable) -> Option<DrawResult> {
        match self.result.symbol_index {
            Some(index) => table.draw_result(index),
            None => table.draw_result(table.len().checked_sub(1)?),
        }
    }
}

/// Reels stop staggered across the spin, the last one at `duration_ms`.
pub fn reel_stop_times(duration_ms: u64) -> Vec<u64> {
    // 800 / 1300 / 1800 at the default duration
    let stagger = duration_ms / 18 * 5 + duration_ms % 18 * 5 / 18;
    (0..REEL_COUNT as u64)
        .map(|i| duration_ms.saturating_sub(stagger * (REEL_COUNT as u64 - 1 - i)))
        .collect()
}

pub fn play_spin<R: Rng + ?Sized>(
    rng: &mut R,
    symbols: &[SlotSymbol],
    counts: &StripCounts,
    duration_ms: u64,
) -> Option<SlotSpin> {
    let reels = spin_reels(rng, symbols, counts)?;
    let result = check_win(&reels, symbols);
    Some(SlotSpin {
        reels,
        result,
        reel_stops_ms: reel_stop_times(duration_ms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, SlotMachineConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn index_of(symbols: &[SlotSymbol], id: &str) -> usize {
        symbols.iter().position(|s| s.id == id).unwrap()
    }

    #[test]
    fn test_strip_counts_by_rarity() {
        let mut rng = StdRng::seed_from_u64(9);
        let symbols = default_symbols();
        let strip = build_reel_strip(&mut rng, &symbols, &StripCounts::default());
        assert_eq!(strip.len(), 12 + 12 + 6 + 3 + 2);
        let count = |id: &str| strip.iter().filter(|&&i| i == index_of(&symbols, id)).count();
        assert_eq!(count("cherry"), 12);
        assert_eq!(count("clover"), 6);
        assert_eq!(count("seven"), 2);
    }

    #[test]
    fn test_centre_row_win() {
        let symbols = default_symbols();
        let seven = index_of(&symbols, "seven");
        let cherry = index_of(&symbols, "cherry");
        let reels = vec![vec![cherry, seven, cherry], vec![cherry, seven, 0], vec![1, seven, 2]];
        let result = check_win(&reels, &symbols);
        assert!(result.is_win);
        assert_eq!(result.win_amount, 500);
        assert_eq!(result.winning_line, vec![1, 1, 1]);
    }

    #[test]
    fn test_other_rows_never_pay() {
        let symbols = default_symbols();
        let bell = index_of(&symbols, "bell");
        let diamond = index_of(&symbols, "diamond");
        let reels = vec![vec![bell, diamond, bell], vec![bell, bell, bell], vec![bell, diamond, bell]];
        let result = check_win(&reels, &symbols);
        assert!(!result.is_win);
        assert_eq!(result.win_amount, 0);
        assert!(result.winning_line.is_empty());
    }

    #[test]
    fn test_spins_stay_in_bounds_and_agree_with_check() {
        let mut rng = StdRng::seed_from_u64(21);
        let symbols = default_symbols();
        let table = SlotMachineConfig::default().prize_table();
        for _ in 0..2_000 {
            let spin = play_spin(&mut rng, &symbols, &StripCounts::default(), 1800).unwrap();
            assert_eq!(spin.reels.len(), 3);
            assert!(spin.reels.iter().all(|r| r.len() == 3 && r.iter().all(|&i| i < symbols.len())));
            let draw = spin.draw_result(&table).unwrap();
            if spin.result.is_win {
                assert_eq!(draw.prize.label, symbols[spin.reels[0][1]].name);
            } else {
                assert_eq!(draw.prize_index, table.len() - 1);
            }
        }
    }

    #[test]
    fn test_reel_stop_times() {
        assert_eq!(reel_stop_times(1800), vec![800, 1300, 1800]);
        assert_eq!(reel_stop_times(0), vec![0, 0, 0]);

        let stops = reel_stop_times(u64::MAX);
        assert_eq!(stops[2], u64::MAX);
        assert!(stops[0] < stops[1] && stops[1] < stops[2]);
    }

    #[test]
    fn test_no_symbols_no_spin() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(spin_reels(&mut rng, &[], &StripCounts::default()).is_none());
    }
}

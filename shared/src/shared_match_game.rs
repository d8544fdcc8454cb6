use crate::constants::MATCH_HIDE_DELAY_MS;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Animal {
    Dog,
    Cat,
    Rabbit,
    Panda,
    Koala,
    Tiger,
    Lion,
    Frog,
}

impl Animal {
    pub fn emoji(self) -> &'static str {
        match self {
            Animal::Dog => "🐶",
            Animal::Cat => "🐱",
            Animal::Rabbit => "🐰",
            Animal::Panda => "🐼",
            Animal::Koala => "🐨",
            Animal::Tiger => "🐯",
            Animal::Lion => "🦁",
            Animal::Frog => "🐸",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Card {
    pub id: usize,
    pub animal: Animal,
    pub revealed: bool,
    pub matched: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PublicCard {
    pub id: usize,
    pub animal: Option<Animal>, // None while face down
    pub emoji: Option<String>,
    pub revealed: bool,
    pub matched: bool,
}

impl Card {
    pub fn new(id: usize, animal: Animal) -> Self {
        Self {
            id,
            animal,
            revealed: false,
            matched: false,
        }
    }

    pub fn to_public(&self) -> PublicCard {
        let face_up = self.revealed || self.matched;
        PublicCard {
            id: self.id,
            animal: face_up.then_some(self.animal),
            emoji: face_up.then(|| self.animal.emoji().to_string()),
            revealed: self.revealed,
            matched: self.matched,
        }
    }
}

/// Two of every animal, shuffled.
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut cards: Vec<Card> = Animal::iter()
        .flat_map(|animal| [animal, animal])
        .enumerate()
        .map(|(id, animal)| Card::new(id, animal))
        .collect();
    cards.shuffle(rng);
    cards
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipError {
    NoSuchCard(usize),
    AlreadyFaceUp(usize),
    Locked,
    Completed,
}

impl fmt::Display for FlipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchCard(index) => write!(f, "There is no card {}", index),
            Self::AlreadyFaceUp(index) => write!(f, "Card {} is already face up", index),
            Self::Locked => write!(f, "Wait for the cards to turn back over"),
            Self::Completed => write!(f, "All pairs have been matched"),
        }
    }
}

impl std::error::Error for FlipError {}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlipOutcome {
    /// First card of a pair.
    Flipped,
    Matched { completed: bool },
    Mismatched,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchGame {
    pub cards: Vec<Card>,
    pub moves: u32,
    pub matched_pairs: u32,
    pending: Option<usize>,
    // Last non-matching pair, hidden once the delay has passed
    last_reveal: Option<(usize, usize)>,
    last_reveal_time: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PublicMatchGame {
    pub cards: Vec<PublicCard>,
    pub moves: u32,
    pub matched_pairs: u32,
    pub total_pairs: u32,
    pub completed: bool,
}

impl MatchGame {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            moves: 0,
            matched_pairs: 0,
            pending: None,
            last_reveal: None,
            last_reveal_time: None,
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(shuffled_deck(rng))
    }

    pub fn total_pairs(&self) -> u32 {
        (self.cards.len() / 2) as u32
    }

    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.matched)
    }

    pub fn to_public(&self) -> PublicMatchGame {
        PublicMatchGame {
            cards: self.cards.iter().map(Card::to_public).collect(),
            moves: self.moves,
            matched_pairs: self.matched_pairs,
            total_pairs: self.total_pairs(),
            completed: self.is_complete(),
        }
    }

    /// Turns a mismatched pair back over once the delay has passed.
    pub fn hide_unmatched(&mut self, current_time: u64) {
        if let (Some((a, b)), Some(at)) = (self.last_reveal, self.last_reveal_time) {
            if current_time.saturating_sub(at) >= MATCH_HIDE_DELAY_MS {
                let (i, j) = if a <= b { (a, b) } else { (b, a) };
                let (first_part, second_part) = self.cards.split_at_mut(j);
                for card in [&mut first_part[i], &mut second_part[0]] {
                    if !card.matched {
                        card.revealed = false;
                    }
                }
                self.last_reveal = None;
                self.last_reveal_time = None;
            }
        }
    }

    pub fn flip(&mut self, index: usize, current_time: u64) -> Result<FlipOutcome, FlipError> {
        self.hide_unmatched(current_time);

        if self.is_complete() {
            return Err(FlipError::Completed);
        }
        if self.last_reveal.is_some() {
            return Err(FlipError::Locked);
        }
        let card = self.cards.get(index).ok_or(FlipError::NoSuchCard(index))?;
        if card.revealed || card.matched {
            return Err(FlipError::AlreadyFaceUp(index));
        }

        let Some(first_index) = self.pending.take() else {
            self.cards[index].revealed = true;
            self.pending = Some(index);
            return Ok(FlipOutcome::Flipped);
        };

        self.moves += 1;
        let (first, second) = if first_index < index {
            let (left, right) = self.cards.split_at_mut(index);
            (&mut left[first_index], &mut right[0])
        } else {
            let (left, right) = self.cards.split_at_mut(first_index);
            (&mut right[0], &mut left[index])
        };
        second.revealed = true;

        if first.animal == second.animal {
            first.matched = true;
            second.matched = true;
            self.matched_pairs += 1;
            log::debug!("pair matched, {} of {}", self.matched_pairs, self.total_pairs());
            Ok(FlipOutcome::Matched {
                completed: self.is_complete(),
            })
        } else {
            self.last_reveal = Some((first_index, index));
            self.last_reveal_time = Some(current_time);
            Ok(FlipOutcome::Mismatched)
        }
    }
}

// === API types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct NewMatchResponse {
    pub session_id: String,
    pub game: PublicMatchGame,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlipRequest {
    pub card_index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlipResponse {
    pub outcome: FlipOutcome,
    pub game: PublicMatchGame,
    pub sounds: Vec<crate::sound::SoundCue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ordered_game() -> MatchGame {
        // pairs sit next to each other: 0/1 dog, 2/3 cat, ...
        let cards = Animal::iter()
            .flat_map(|a| [a, a])
            .enumerate()
            .map(|(id, a)| Card::new(id, a))
            .collect();
        MatchGame::new(cards)
    }

    #[test]
    fn test_deck_has_eight_pairs() {
        let mut rng = StdRng::seed_from_u64(1);
        let deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), 16);
        for animal in Animal::iter() {
            assert_eq!(deck.iter().filter(|c| c.animal == animal).count(), 2);
        }
    }

    #[test]
    fn test_face_down_cards_hide_their_animal() {
        let game = ordered_game();
        assert!(game.to_public().cards.iter().all(|c| c.animal.is_none()));
    }

    #[test]
    fn test_match_counts_one_move() {
        let mut game = ordered_game();
        assert_eq!(game.flip(0, 0), Ok(FlipOutcome::Flipped));
        assert_eq!(game.flip(0, 0), Err(FlipError::AlreadyFaceUp(0)));
        assert_eq!(game.flip(1, 0), Ok(FlipOutcome::Matched { completed: false }));
        assert_eq!(game.moves, 1);
        assert_eq!(game.matched_pairs, 1);
    }

    #[test]
    fn test_mismatch_hides_after_delay() {
        let mut game = ordered_game();
        game.flip(0, 0).unwrap();
        assert_eq!(game.flip(2, 0), Ok(FlipOutcome::Mismatched));
        assert_eq!(game.flip(4, 500), Err(FlipError::Locked));
        assert_eq!(game.flip(4, 1_000), Ok(FlipOutcome::Flipped));
        assert!(!game.cards[0].revealed && !game.cards[2].revealed);
        assert_eq!(game.moves, 1);
    }

    #[test]
    fn test_completes_after_all_pairs() {
        let mut game = ordered_game();
        for pair in 0..8 {
            game.flip(pair * 2 + 1, 0).unwrap();
            let outcome = game.flip(pair * 2, 0).unwrap();
            assert_eq!(outcome, FlipOutcome::Matched { completed: pair == 7 });
        }
        assert!(game.is_complete());
        assert_eq!(game.flip(0, 0), Err(FlipError::Completed));
        assert_eq!(game.to_public().moves, 8);
    }
}

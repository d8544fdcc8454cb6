pub mod config;
pub mod constants;
pub mod prize;
pub mod reveal;
pub mod sampler;
pub mod shared_egg_game;
pub mod shared_gift_game;
pub mod shared_hunt_game;
pub mod shared_match_game;
pub mod shared_plinko_game;
pub mod shared_quiz_game;
pub mod shared_scratch_game;
pub mod shared_slot_game;
pub mod shared_wheel_game;
pub mod sound;
pub mod stats;
pub mod storage;
pub mod validation;

pub use prize::{DrawResult, Prize, PrizeTable, PrizeTableError, Rarity};
pub use reveal::{EmailGate, Phase, RevealError, RevealSession, RevealSettings};

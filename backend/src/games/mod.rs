pub mod backend_hunt_game;
pub mod backend_match_game;
pub mod backend_prize_game;
pub mod backend_quiz_game;

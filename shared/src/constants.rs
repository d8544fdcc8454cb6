pub const INVALID_EMAIL_ERROR: &str = "Please enter a valid email address";
pub const EMPTY_PRIZE_TABLE_ERROR: &str = "No prizes are configured for this game";
pub const ALREADY_PLAYING_ERROR: &str = "A play is already in progress";
pub const EMAIL_REQUIRED_ERROR: &str = "Please enter your email to play";

pub const DEFAULT_REVEAL_DELAY_MS: u64 = 300;
pub const GIFT_REVEAL_MS: u64 = 1000;
pub const EGG_CRACK_MS: u64 = 1500;
pub const MATCH_HIDE_DELAY_MS: u64 = 1000;

pub const GIFT_BOX_COUNT: usize = 3;
pub const EGG_COUNT: usize = 6;
pub const REEL_COUNT: usize = 3;
pub const REEL_ROWS: usize = 3;

pub const HUNT_PROGRESS_KEY: &str = "scavenger-hunt-progress";

// One display refresh at 60 Hz.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

// Answer feedback stays up this long before the result card.
pub const QUIZ_FEEDBACK_MS: u64 = 2000;

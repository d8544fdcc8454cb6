use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::config::{GameConfig, GameKind};
use shared::prize::{DrawResult, PrizeTable, Rarity};
use shared::reveal::{Phase, RevealEvent, RevealSession, RevealSettings, RevealView};
use shared::sampler::TierBands;
use shared::shared_egg_game::EggBoard;
use shared::shared_gift_game::GiftSession;
use shared::shared_plinko_game::{simulate_drop, Board, PlinkoDrop};
use shared::shared_scratch_game::{ScratchCard, ScratchPoint, ScratchProgress};
use shared::shared_slot_game::{play_spin, SlotSpin, SlotSymbol, StripCounts};
use shared::shared_wheel_game::{plan_spin, SpinSettings, WheelGame, WheelSpin};
use shared::sound::{
    AudioService, EggAction, GameSound, GiftAction, LoopSound, PlinkoAction, ScratchAction, SlotAction, SoundBoard,
    SoundCue, SoundId, WheelAction,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::config_loader::GameConfigs;
use crate::error::AppError;
use crate::{now_ms, now_secs, AppState};

const WHEEL_CHANNEL: &str = "wheel";
const SLOT_CHANNEL: &str = "slot";

#[derive(Clone, Default)]
pub struct PrizeGameState {
    pub sessions: Arc<Mutex<HashMap<Uuid, PlaySession>>>,
}

impl PrizeGameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn cleanup_expired_sessions(&self, now: u64, expiry_seconds: u64) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| now.saturating_sub(session.created_at) < expiry_seconds);
        before - sessions.len()
    }
}

/// Outcome of one revealed play, for the stats counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRecord {
    pub is_win: bool,
    pub payout: f64,
}

enum GameCore {
    Wheel { game: WheelGame, settings: SpinSettings },
    Gift { session: GiftSession, reveal_ms: u64 },
    Scratch { card: ScratchCard },
    Plinko { board: Board },
    Slot { symbols: Vec<SlotSymbol>, counts: StripCounts, duration_ms: u64, last_spin: Option<SlotSpin> },
    Egg { board: EggBoard, bands: TierBands, crack_ms: u64 },
}

impl GameCore {
    fn build<R: Rng + ?Sized>(rng: &mut R, kind: GameKind, configs: &GameConfigs, table: &PrizeTable) -> Result<Self, AppError> {
        let core = match kind {
            GameKind::SpinWheel => GameCore::Wheel {
                game: WheelGame::new(),
                settings: SpinSettings::from(&configs.spin_wheel.defaults),
            },
            GameKind::PickAGift => GameCore::Gift {
                session: GiftSession::new(rng, table, configs.pick_a_gift.defaults.box_count)
                    .ok_or(AppError::EmptyPrizeTable)?,
                reveal_ms: configs.pick_a_gift.animation_duration_ms(),
            },
            GameKind::ScratchCard => GameCore::Scratch {
                card: ScratchCard::deal(rng, table, &configs.scratch_card.defaults).ok_or(AppError::EmptyPrizeTable)?,
            },
            GameKind::Plinko => GameCore::Plinko {
                board: Board::from(&configs.plinko.defaults),
            },
            GameKind::SlotMachine => GameCore::Slot {
                symbols: configs.slot_machine.symbols.clone(),
                counts: configs.slot_machine.defaults.strip_counts,
                duration_ms: configs.slot_machine.animation_duration_ms(),
                last_spin: None,
            },
            GameKind::MysteryEgg => GameCore::Egg {
                board: EggBoard::new(configs.mystery_egg.defaults.egg_count),
                bands: configs.mystery_egg.defaults.bands.clone(),
                crack_ms: configs.mystery_egg.animation_duration_ms(),
            },
        };
        Ok(core)
    }

    fn view(&self) -> GameView {
        match self {
            GameCore::Wheel { game, .. } => GameView::Wheel {
                rotation: game.rotation,
                spinning: game.is_spinning(),
            },
            GameCore::Gift { session, .. } => GameView::Gift {
                box_count: session.box_count(),
                selected: session.selected(),
                boxes: session.revealed_boxes().map(<[DrawResult]>::to_vec),
            },
            GameCore::Scratch { card } => GameView::Scratch {
                percentage: card.percentage(),
                threshold: card.threshold(),
                revealed: card.is_revealed(),
            },
            GameCore::Plinko { board } => GameView::Plinko { board: *board },
            GameCore::Slot { last_spin, .. } => GameView::Slot {
                last_spin: last_spin.clone(),
            },
            GameCore::Egg { board, .. } => GameView::Egg {
                egg_count: board.egg_count(),
                cracked: (0..board.egg_count()).filter(|&egg| board.is_cracked(egg)).collect(),
                complete: board.is_complete(),
            },
        }
    }
}

/// What the renderer animates for one play.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayPlan {
    Wheel { spin: WheelSpin },
    Gift { selected: usize },
    Scratch { threshold: f64 },
    Plinko { drop: PlinkoDrop },
    Slot { spin: SlotSpin },
    Egg { egg: usize, rarity: Option<Rarity>, rare: bool },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameView {
    Wheel { rotation: f64, spinning: bool },
    Gift { box_count: usize, selected: Option<usize>, boxes: Option<Vec<DrawResult>> },
    Scratch { percentage: f64, threshold: f64, revealed: bool },
    Plinko { board: Board },
    Slot { last_spin: Option<SlotSpin> },
    Egg { egg_count: usize, cracked: Vec<usize>, complete: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub game: GameKind,
    pub prizes: PrizeTable,
    pub reveal: RevealView,
    pub state: GameView,
    pub sounds: Vec<SoundCue>,
}

/// One open game on one page: the table snapshot it was opened with, its
/// game core and its reveal sequence.
pub struct PlaySession {
    kind: GameKind,
    table: PrizeTable,
    reveal: RevealSession,
    sound: SoundBoard,
    core: GameCore,
    created_at: u64,
    outcome: Option<PlayRecord>,
    landed: bool,
    records: Vec<PlayRecord>,
}

impl PlaySession {
    pub fn open<R: Rng + ?Sized>(
        rng: &mut R,
        kind: GameKind,
        configs: &GameConfigs,
        reveal: RevealSettings,
        sound_enabled: bool,
        created_at: u64,
    ) -> Result<Self, AppError> {
        let table = configs.prize_table(kind);
        let core = GameCore::build(rng, kind, configs, &table)?;
        let mut reveal = RevealSession::new(reveal);
        reveal.open();
        Ok(Self {
            kind,
            table,
            reveal,
            sound: SoundBoard::new(sound_enabled),
            core,
            created_at,
            outcome: None,
            landed: true,
            records: Vec::new(),
        })
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.reveal.phase()
    }

    /// Runs the animation and reveal timers up to `now`.
    pub fn advance(&mut self, now: u64) {
        if let GameCore::Wheel { game, .. } = &mut self.core {
            game.update(now);
        }
        let events = self.reveal.tick(now);
        self.apply(events);
    }

    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R, choice: Option<usize>, now: u64) -> Result<PlayPlan, AppError> {
        self.advance(now);
        self.reveal.check_can_play()?;

        let (plan, draw, duration_ms, outcome) = match &mut self.core {
            GameCore::Wheel { game, settings } => {
                let spin = plan_spin(rng, &self.table, settings, game.rotation).ok_or(AppError::EmptyPrizeTable)?;
                game.start_spin(spin.clone(), now);
                self.sound.play_game(GameSound::Wheel(WheelAction::Spin));
                self.sound.start_loop(WHEEL_CHANNEL, LoopSound::WheelSpin);
                let draw = spin.prize.clone();
                let duration = spin.duration_ms;
                (PlayPlan::Wheel { spin }, draw, duration, PlayRecord { is_win: true, payout: 0.0 })
            }
            GameCore::Gift { session, reveal_ms } => {
                let selected = choice.ok_or_else(|| AppError::BadRequest("Pick a gift box".to_string()))?;
                let draw = session.select(selected)?;
                self.sound.play_game(GameSound::Gift(GiftAction::Select));
                (PlayPlan::Gift { selected }, draw, *reveal_ms, PlayRecord { is_win: true, payout: 0.0 })
            }
            GameCore::Scratch { card } => {
                let draw = card.prize().clone();
                (
                    PlayPlan::Scratch {
                        threshold: card.threshold(),
                    },
                    draw,
                    u64::MAX,
                    PlayRecord { is_win: true, payout: 0.0 },
                )
            }
            GameCore::Plinko { board } => {
                let drop = simulate_drop(rng, board, self.table.len()).ok_or(AppError::EmptyPrizeTable)?;
                let draw = drop.draw_result(&self.table).ok_or(AppError::EmptyPrizeTable)?;
                let multiplier = draw.prize.multiplier.unwrap_or(0.0);
                self.sound.play_game(GameSound::Plinko(PlinkoAction::Drop));
                let duration = drop.duration_ms();
                (
                    PlayPlan::Plinko { drop },
                    draw,
                    duration,
                    PlayRecord {
                        is_win: multiplier > 0.0,
                        payout: multiplier,
                    },
                )
            }
            GameCore::Slot { symbols, counts, duration_ms, last_spin } => {
                let spin = play_spin(rng, symbols, counts, *duration_ms).ok_or(AppError::EmptyPrizeTable)?;
                let draw = spin.draw_result(&self.table).ok_or(AppError::EmptyPrizeTable)?;
                self.sound.play_game(GameSound::Slot(SlotAction::LeverPull));
                self.sound.start_loop(SLOT_CHANNEL, LoopSound::SlotSpinning);
                *last_spin = Some(spin.clone());
                let outcome = PlayRecord {
                    is_win: spin.result.is_win,
                    payout: spin.result.win_amount as f64,
                };
                (PlayPlan::Slot { spin }, draw, *duration_ms, outcome)
            }
            GameCore::Egg { board, bands, crack_ms } => {
                let egg = choice.ok_or_else(|| AppError::BadRequest("Pick an egg".to_string()))?;
                let cracked = board.crack(rng, egg, &self.table, bands)?;
                self.sound.play_game(GameSound::Mystery(EggAction::Crack));
                let plan = PlayPlan::Egg {
                    egg,
                    rarity: cracked.rarity(),
                    rare: cracked.is_rare(),
                };
                (plan, cracked.draw, *crack_ms, PlayRecord { is_win: true, payout: 0.0 })
            }
        };

        info!("{} play drew '{}'", self.kind, draw.prize.label);
        self.reveal.begin_play(draw, now, duration_ms)?;
        self.outcome = Some(outcome);
        self.landed = false;
        self.advance(now);
        Ok(plan)
    }

    /// Scratches the card. The first stroke starts the play; crossing the
    /// threshold ends the animation.
    pub fn scratch<R: Rng + ?Sized>(&mut self, rng: &mut R, points: &[ScratchPoint], now: u64) -> Result<ScratchProgress, AppError> {
        self.advance(now);
        if !matches!(self.core, GameCore::Scratch { .. }) {
            return Err(AppError::BadRequest(format!("{} has no scratch surface", self.kind)));
        }
        match self.reveal.phase() {
            Phase::Idle => {
                self.play(rng, None, now)?;
            }
            Phase::Animating | Phase::Revealed => {}
            Phase::Gated | Phase::Closed => self.reveal.check_can_play()?,
        }

        let GameCore::Scratch { card } = &mut self.core else {
            return Err(AppError::BadRequest(format!("{} has no scratch surface", self.kind)));
        };
        let progress = card.scratch(points);
        if !points.is_empty() {
            self.sound.play_game(GameSound::Scratch(ScratchAction::Scratch));
        }
        if progress.just_revealed && self.reveal.phase() == Phase::Animating {
            let events = self.reveal.complete_animation(now)?;
            self.apply(events);
        }
        Ok(progress)
    }

    pub fn submit_email(&mut self, email: &str, now: u64) -> Result<(), AppError> {
        self.advance(now);
        let events = self.reveal.submit_email(email, now)?;
        self.apply(events);
        Ok(())
    }

    /// Leaves the email gate. A held prize is discarded, so the pre-dealt
    /// games are dealt again.
    pub fn cancel<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), AppError> {
        self.reveal.cancel()?;
        self.redeal(rng)?;
        self.outcome = None;
        Ok(())
    }

    pub fn close(&mut self) {
        self.reveal.close();
        self.sound.stop_all();
        self.outcome = None;
    }

    /// Replay: clears the reveal and re-deals the games that hold their
    /// prizes ahead of the play.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), AppError> {
        self.redeal(rng)?;
        self.reveal.reset();
        self.sound.stop_all();
        self.outcome = None;
        self.landed = true;
        Ok(())
    }

    fn redeal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), AppError> {
        match &mut self.core {
            GameCore::Gift { session, .. } => {
                if !session.reset(rng, &self.table) {
                    return Err(AppError::EmptyPrizeTable);
                }
            }
            GameCore::Scratch { card } => {
                if !card.reset(rng, &self.table) {
                    return Err(AppError::EmptyPrizeTable);
                }
            }
            GameCore::Egg { board, .. } => {
                if board.is_complete() {
                    board.reset();
                }
            }
            GameCore::Slot { last_spin, .. } => *last_spin = None,
            GameCore::Wheel { .. } | GameCore::Plinko { .. } => {}
        }
        Ok(())
    }

    pub fn take_records(&mut self) -> Vec<PlayRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn view(&mut self, id: Uuid) -> SessionView {
        SessionView {
            session_id: id,
            game: self.kind,
            prizes: self.table.clone(),
            reveal: self.reveal.view(),
            state: self.core.view(),
            sounds: self.sound.take_cues(),
        }
    }

    fn apply(&mut self, events: Vec<RevealEvent>) {
        for event in events {
            match event {
                RevealEvent::EnteredGate => self.land(),
                RevealEvent::EnteredRevealed(draw) => {
                    self.land();
                    self.cue_reveal(&draw);
                    if let Some(outcome) = self.outcome.take() {
                        self.records.push(outcome);
                    }
                }
                RevealEvent::Celebrate => self.sound.play(SoundId::Confetti),
            }
        }
    }

    // The animation is over, whether or not the prize is shown yet.
    fn land(&mut self) {
        if self.landed {
            return;
        }
        self.landed = true;
        match &self.core {
            GameCore::Wheel { .. } => {
                self.sound.stop_loop(WHEEL_CHANNEL);
                self.sound.play_game(GameSound::Wheel(WheelAction::Stop));
            }
            GameCore::Slot { .. } => self.sound.stop_loop(SLOT_CHANNEL),
            GameCore::Plinko { .. } => self.sound.play_game(GameSound::Plinko(PlinkoAction::Land)),
            _ => {}
        }
    }

    fn cue_reveal(&mut self, draw: &DrawResult) {
        match &self.core {
            GameCore::Gift { .. } => self.sound.play_game(GameSound::Gift(GiftAction::Reveal)),
            GameCore::Scratch { .. } => self.sound.play_game(GameSound::Scratch(ScratchAction::Reveal)),
            GameCore::Egg { .. } => {
                self.sound.play_game(GameSound::Mystery(EggAction::Reveal));
                match draw.prize.rarity {
                    Some(Rarity::Legendary) => self.sound.play_game(GameSound::Mystery(EggAction::Legendary)),
                    Some(rarity) if rarity.is_rare_or_better() => self.sound.play_game(GameSound::Mystery(EggAction::Rare)),
                    _ => {}
                }
            }
            GameCore::Slot { last_spin, .. } => {
                if last_spin.as_ref().map(|spin| spin.result.is_win).unwrap_or(false) {
                    self.sound.play_game(GameSound::Slot(SlotAction::Win));
                }
            }
            GameCore::Wheel { .. } | GameCore::Plinko { .. } => self.sound.play(SoundId::Prize),
        }
    }
}

// === HTTP ===

#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub game: GameKind,
    #[serde(default = "sound_on")]
    pub sound: bool,
}

fn sound_on() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayRequest {
    pub choice: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ScratchRequest {
    pub points: Vec<ScratchPoint>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub plan: PlayPlan,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct ScratchResponse {
    pub progress: ScratchProgress,
    pub session: SessionView,
}

async fn with_session<T, F>(state: &PrizeGameState, app: &AppState, id: Uuid, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut PlaySession) -> Result<T, AppError>,
{
    let (result, kind, records) = {
        let mut sessions = state.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound)?;
        let result = f(session);
        (result, session.kind(), session.take_records())
    };
    if !records.is_empty() {
        let mut stats = app.stats.lock().await;
        for record in records {
            stats.record(kind, record.is_win, record.payout);
        }
    }
    result
}

async fn create_session(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Json(payload): Json<NewSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = {
        let configs = app.configs.read().await;
        let mut rng = rand::thread_rng();
        PlaySession::open(&mut rng, payload.game, &configs, app.settings.reveal, payload.sound, now_secs())?
    };
    let id = Uuid::new_v4();
    let view = session.view(id);
    state.sessions.lock().await.insert(id, session);
    info!("Opened {} session {}", payload.game, id);
    Ok(Json(view))
}

async fn get_session(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let now = now_ms();
    with_session(&state, &app, id, |session| {
        session.advance(now);
        Ok(Json(session.view(id)))
    })
    .await
}

async fn play(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<PlayRequest>>,
) -> Result<Json<PlayResponse>, AppError> {
    let now = now_ms();
    let choice = payload.and_then(|Json(p)| p.choice);
    with_session(&state, &app, id, |session| {
        let mut rng = rand::thread_rng();
        let plan = session.play(&mut rng, choice, now)?;
        Ok(Json(PlayResponse {
            plan,
            session: session.view(id),
        }))
    })
    .await
}

async fn scratch(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScratchRequest>,
) -> Result<Json<ScratchResponse>, AppError> {
    let now = now_ms();
    with_session(&state, &app, id, |session| {
        let mut rng = rand::thread_rng();
        let progress = session.scratch(&mut rng, &payload.points, now)?;
        Ok(Json(ScratchResponse {
            progress,
            session: session.view(id),
        }))
    })
    .await
}

async fn submit_email(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<SessionView>, AppError> {
    let now = now_ms();
    with_session(&state, &app, id, |session| {
        session.submit_email(&payload.email, now)?;
        Ok(Json(session.view(id)))
    })
    .await
}

async fn cancel(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    with_session(&state, &app, id, |session| {
        let mut rng = rand::thread_rng();
        session.cancel(&mut rng)?;
        Ok(Json(session.view(id)))
    })
    .await
}

async fn close(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    with_session(&state, &app, id, |session| {
        session.close();
        Ok(Json(session.view(id)))
    })
    .await
}

async fn reset(
    State(state): State<Arc<PrizeGameState>>,
    Extension(app): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    with_session(&state, &app, id, |session| {
        let mut rng = rand::thread_rng();
        session.reset(&mut rng)?;
        Ok(Json(session.view(id)))
    })
    .await
}

pub fn create_router() -> Router<Arc<PrizeGameState>> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session))
        .route("/:id/play", post(play))
        .route("/:id/scratch", post(scratch))
        .route("/:id/email", post(submit_email))
        .route("/:id/cancel", post(cancel))
        .route("/:id/close", post(close))
        .route("/:id/reset", post(reset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, call, test_app};
    use axum::http::StatusCode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use shared::reveal::{EmailGate, RevealError};

    fn instant_configs() -> GameConfigs {
        let mut configs = GameConfigs::default();
        configs.spin_wheel.defaults.animation_duration = 0;
        configs.pick_a_gift.defaults.animation_duration = 0;
        configs.slot_machine.defaults.spin_duration = 0;
        configs.mystery_egg.defaults.crack_duration = 0;
        configs
    }

    fn settings(gate: EmailGate) -> RevealSettings {
        RevealSettings { gate, reveal_delay_ms: 0 }
    }

    fn open(kind: GameKind, gate: EmailGate) -> PlaySession {
        let mut rng = StdRng::seed_from_u64(11);
        PlaySession::open(&mut rng, kind, &instant_configs(), settings(gate), true, 0).unwrap()
    }

    #[test]
    fn test_wheel_play_reveals_and_records() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = open(GameKind::SpinWheel, EmailGate::None);
        let plan = session.play(&mut rng, None, 1_000).unwrap();
        let PlayPlan::Wheel { spin } = plan else {
            panic!("expected a wheel plan");
        };
        assert_eq!(session.phase(), Phase::Revealed);
        let view = session.view(Uuid::nil());
        assert_eq!(view.reveal.prize.unwrap(), spin.prize);
        assert!(view.reveal.confetti);
        assert!(view.sounds.contains(&SoundCue::StopLoop {
            channel: WHEEL_CHANNEL.to_string()
        }));
        assert_eq!(session.take_records().len(), 1);
        assert!(session.take_records().is_empty());
    }

    #[test]
    fn test_play_rejected_until_reset() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut session = open(GameKind::SlotMachine, EmailGate::None);
        session.play(&mut rng, None, 0).unwrap();
        assert!(matches!(session.play(&mut rng, None, 0), Err(AppError::Reveal(_))));
        session.reset(&mut rng).unwrap();
        assert!(session.play(&mut rng, None, 0).is_ok());
    }

    #[test]
    fn test_after_play_gate_holds_the_prize() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = open(GameKind::PickAGift, EmailGate::AfterPlay);
        session.play(&mut rng, Some(1), 0).unwrap();
        assert_eq!(session.phase(), Phase::Gated);
        assert!(session.take_records().is_empty());

        assert!(matches!(session.submit_email("nope", 5), Err(AppError::Reveal(_))));
        assert_eq!(session.phase(), Phase::Gated);
        session.submit_email("a@b.co", 10).unwrap();
        assert_eq!(session.phase(), Phase::Revealed);
        assert_eq!(session.take_records().len(), 1);
    }

    #[test]
    fn test_gift_needs_a_box_and_opens_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = open(GameKind::PickAGift, EmailGate::None);
        assert!(matches!(session.play(&mut rng, None, 0), Err(AppError::BadRequest(_))));
        assert!(matches!(session.play(&mut rng, Some(9), 0), Err(AppError::Gift(_))));
        assert_eq!(session.phase(), Phase::Idle);
        session.play(&mut rng, Some(0), 0).unwrap();
        let GameView::Gift { boxes, selected, .. } = session.view(Uuid::nil()).state else {
            panic!("expected a gift view");
        };
        assert_eq!(selected, Some(0));
        assert_eq!(boxes.unwrap().len(), 3);
    }

    #[test]
    fn test_scratch_reveals_on_threshold() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = open(GameKind::ScratchCard, EmailGate::None);
        let first = session.scratch(&mut rng, &[ScratchPoint { x: 10.0, y: 10.0 }], 0).unwrap();
        assert!(!first.just_revealed);
        assert_eq!(session.phase(), Phase::Animating);

        let mut points = Vec::new();
        for y in (0..=250).step_by(10) {
            for x in (0..=400).step_by(10) {
                points.push(ScratchPoint { x: x as f64, y: y as f64 });
            }
        }
        let progress = session.scratch(&mut rng, &points, 50).unwrap();
        assert!(progress.just_revealed);
        assert_eq!(session.phase(), Phase::Revealed);
    }

    fn full_card_strokes() -> Vec<ScratchPoint> {
        let mut points = Vec::new();
        for y in (0..=250).step_by(10) {
            for x in (0..=400).step_by(10) {
                points.push(ScratchPoint { x: x as f64, y: y as f64 });
            }
        }
        points
    }

    #[test]
    fn test_scratch_blocked_while_gated() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut session = open(GameKind::ScratchCard, EmailGate::BeforePlay);
        assert_eq!(session.phase(), Phase::Gated);
        let err = session.scratch(&mut rng, &full_card_strokes(), 0);
        assert!(matches!(err, Err(AppError::Reveal(RevealError::EmailRequired))));
        let GameView::Scratch { percentage, revealed, .. } = session.core.view() else {
            panic!("expected a scratch view");
        };
        assert_eq!(percentage, 0.0);
        assert!(!revealed);

        session.submit_email("a@b.co", 10).unwrap();
        session.scratch(&mut rng, &[ScratchPoint { x: 5.0, y: 5.0 }], 20).unwrap();
        assert_eq!(session.phase(), Phase::Animating);
        let progress = session.scratch(&mut rng, &full_card_strokes(), 30).unwrap();
        assert!(progress.just_revealed);
        assert_eq!(session.phase(), Phase::Revealed);
    }

    #[test]
    fn test_scratch_after_cancelled_gate_deals_a_fresh_card() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut session = open(GameKind::ScratchCard, EmailGate::AfterPlay);
        session.scratch(&mut rng, &full_card_strokes(), 0).unwrap();
        assert_eq!(session.phase(), Phase::Gated);
        assert!(session.scratch(&mut rng, &full_card_strokes(), 5).is_err());

        session.cancel(&mut rng).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        let GameView::Scratch { revealed, percentage, .. } = session.core.view() else {
            panic!("expected a scratch view");
        };
        assert!(!revealed);
        assert_eq!(percentage, 0.0);

        let progress = session.scratch(&mut rng, &full_card_strokes(), 10).unwrap();
        assert!(progress.just_revealed);
        assert_eq!(session.phase(), Phase::Gated);
    }

    #[test]
    fn test_gift_playable_after_cancelled_gate() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut session = open(GameKind::PickAGift, EmailGate::AfterPlay);
        session.play(&mut rng, Some(0), 0).unwrap();
        assert_eq!(session.phase(), Phase::Gated);

        session.cancel(&mut rng).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        let GameView::Gift { selected, boxes, .. } = session.view(Uuid::nil()).state else {
            panic!("expected a gift view");
        };
        assert_eq!(selected, None);
        assert!(boxes.is_none());
        session.play(&mut rng, Some(1), 5).unwrap();
        assert_eq!(session.phase(), Phase::Gated);
    }

    #[test]
    fn test_eggs_crack_once_each() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = open(GameKind::MysteryEgg, EmailGate::None);
        session.play(&mut rng, Some(2), 0).unwrap();
        session.reset(&mut rng).unwrap();
        assert!(matches!(session.play(&mut rng, Some(2), 0), Err(AppError::Egg(_))));
        session.play(&mut rng, Some(3), 0).unwrap();
    }

    #[test]
    fn test_plinko_animates_for_the_drop() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = open(GameKind::Plinko, EmailGate::None);
        let PlayPlan::Plinko { drop } = session.play(&mut rng, None, 0).unwrap() else {
            panic!("expected a plinko plan");
        };
        assert_eq!(session.phase(), Phase::Animating);
        session.advance(drop.duration_ms());
        assert_eq!(session.phase(), Phase::Revealed);
        let view = session.view(Uuid::nil());
        assert_eq!(view.reveal.prize.unwrap().prize_index, drop.slot);
    }

    #[test]
    fn test_muted_session_has_no_cues() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = PlaySession::open(
            &mut rng,
            GameKind::SpinWheel,
            &instant_configs(),
            settings(EmailGate::None),
            false,
            0,
        )
        .unwrap();
        session.play(&mut rng, None, 0).unwrap();
        assert!(session.view(Uuid::nil()).sounds.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_drops_old_sessions() {
        let state = PrizeGameState::new();
        let mut rng = StdRng::seed_from_u64(8);
        let session = PlaySession::open(&mut rng, GameKind::Plinko, &instant_configs(), settings(EmailGate::None), true, 100).unwrap();
        state.sessions.lock().await.insert(Uuid::new_v4(), session);
        assert_eq!(state.cleanup_expired_sessions(500, 900).await, 0);
        assert_eq!(state.cleanup_expired_sessions(1_000, 900).await, 1);
    }

    #[tokio::test]
    async fn test_http_session_flow() {
        let app = test_app(settings(EmailGate::None), instant_configs());

        let (status, created) = call(&app, "POST", "/api/sessions", Some(json!({ "game": "pick-a-gift" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["reveal"]["phase"], "idle");
        let prize_count = GameConfigs::default().pick_a_gift.prizes.len();
        assert_eq!(created["prizes"].as_array().unwrap().len(), prize_count);
        assert_eq!(created["state"]["box_count"], 3);
        let id = created["session_id"].as_str().unwrap().to_string();

        let (status, played) = call(&app, "POST", &format!("/api/sessions/{}/play", id), Some(json!({ "choice": 2 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(played["plan"]["kind"], "gift");
        assert_eq!(played["session"]["reveal"]["phase"], "revealed");

        let (status, error) = call(&app, "POST", &format!("/api/sessions/{}/play", id), Some(json!({ "choice": 0 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(error["error"].is_string());

        let (status, stats) = call(&app, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["overall"]["total_plays"], 1);
        assert_eq!(stats["games"]["pick-a-gift"]["total_plays"], 1);

        let (status, reset) = call(&app, "POST", &format!("/api/sessions/{}/reset", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["reveal"]["phase"], "idle");

        let (status, closed) = call(&app, "POST", &format!("/api/sessions/{}/close", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(closed["reveal"]["phase"], "closed");
    }

    #[tokio::test]
    async fn test_http_email_gate() {
        let app = test_app(settings(EmailGate::BeforePlay), instant_configs());
        let (_, created) = call(&app, "POST", "/api/sessions", Some(json!({ "game": "spin-wheel" }))).await;
        let id = created["session_id"].as_str().unwrap().to_string();
        assert_eq!(created["reveal"]["email_gate"], true);

        let (status, _) = call(&app, "POST", &format!("/api/sessions/{}/play", id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/email", id), Some(json!({ "email": "bad" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], shared::constants::INVALID_EMAIL_ERROR);

        let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/email", id), Some(json!({ "email": "a@b.co" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reveal"]["phase"], "idle");

        let (status, played) = call(&app, "POST", &format!("/api/sessions/{}/play", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(played["session"]["reveal"]["phase"], "revealed");
        assert_eq!(played["session"]["reveal"]["captured_email"], "a@b.co");
    }

    #[tokio::test]
    async fn test_http_unknown_session_and_empty_table() {
        let mut configs = instant_configs();
        configs.plinko.prizes = PrizeTable::default();
        let app = test_app(settings(EmailGate::None), configs);

        let (status, _) = call(&app, "GET", &format!("/api/sessions/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, created) = call(&app, "POST", "/api/sessions", Some(json!({ "game": "plinko" }))).await;
        let id = created["session_id"].as_str().unwrap().to_string();
        let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/play", id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], shared::constants::EMPTY_PRIZE_TABLE_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = axum::response::IntoResponse::into_response(AppError::SessionNotFound);
        assert_eq!(body_json(response).await["error"], "Session not found");
    }
}

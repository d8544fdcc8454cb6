//! Post-draw reveal sequence shared by every prize game.
//!
//! `Idle → Gated → Animating → Revealed → Closed`, with `Revealed → Idle` on
//! replay. Time is always passed in as milliseconds so the machine can be
//! driven by the host's clock or by tests.

use crate::prize::DrawResult;
use crate::validation::validate_email;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Idle,
    Gated,
    Animating,
    Revealed,
    Closed,
}

/// Where the email capture sits in the flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
pub enum EmailGate {
    #[strum(serialize = "none")]
    None,
    #[strum(serialize = "before")]
    BeforePlay,
    #[default]
    #[strum(serialize = "after")]
    AfterPlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSettings {
    pub gate: EmailGate,
    pub reveal_delay_ms: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            gate: EmailGate::default(),
            reveal_delay_ms: crate::constants::DEFAULT_REVEAL_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealError {
    InvalidEmail,
    NotGated,
    NotAnimating,
    EmailRequired,
    AlreadyAnimating,
    NotIdle(Phase),
}

impl fmt::Display for RevealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "{}", crate::constants::INVALID_EMAIL_ERROR),
            Self::NotGated => write!(f, "No email is being requested"),
            Self::NotAnimating => write!(f, "No animation is running"),
            Self::EmailRequired => write!(f, "{}", crate::constants::EMAIL_REQUIRED_ERROR),
            Self::AlreadyAnimating => write!(f, "{}", crate::constants::ALREADY_PLAYING_ERROR),
            Self::NotIdle(phase) => write!(f, "Cannot start a play while {}", phase),
        }
    }
}

impl std::error::Error for RevealError {}

/// Things the owner reacts to: stats on reveal, overlay cleanup on gate,
/// the confetti cue once the delay has passed.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    EnteredGate,
    EnteredRevealed(DrawResult),
    Celebrate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealView {
    pub phase: Phase,
    pub email_gate: bool,
    pub show_prize: bool,
    pub confetti: bool,
    pub prize: Option<DrawResult>,
    pub captured_email: Option<String>,
    pub animation_ends_at: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RevealSession {
    settings: RevealSettings,
    phase: Phase,
    pending_prize: Option<DrawResult>,
    current_prize: Option<DrawResult>,
    captured_email: Option<String>,
    show_prize: bool,
    confetti: bool,
    animation_ends_at: Option<u64>,
    revealed_at: Option<u64>,
}

impl RevealSession {
    pub fn new(settings: RevealSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            pending_prize: None,
            current_prize: None,
            captured_email: None,
            show_prize: false,
            confetti: false,
            animation_ends_at: None,
            revealed_at: None,
        }
    }

    pub fn settings(&self) -> RevealSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_prize(&self) -> Option<&DrawResult> {
        self.pending_prize.as_ref()
    }

    pub fn prize(&self) -> Option<&DrawResult> {
        self.current_prize.as_ref()
    }

    pub fn captured_email(&self) -> Option<&str> {
        self.captured_email.as_deref()
    }

    pub fn show_prize(&self) -> bool {
        self.show_prize
    }

    pub fn confetti(&self) -> bool {
        self.confetti
    }

    pub fn animation_ends_at(&self) -> Option<u64> {
        self.animation_ends_at
    }

    fn clear_play(&mut self) {
        self.pending_prize = None;
        self.current_prize = None;
        self.show_prize = false;
        self.confetti = false;
        self.animation_ends_at = None;
        self.revealed_at = None;
    }

    fn resting_phase(&self) -> Phase {
        if self.settings.gate == EmailGate::BeforePlay && self.captured_email.is_none() {
            Phase::Gated
        } else {
            Phase::Idle
        }
    }

    /// Starts a fresh session whatever state the previous one ended in.
    pub fn open(&mut self) {
        self.clear_play();
        self.captured_email = None;
        self.phase = self.resting_phase();
        log::debug!("reveal session opened in {}", self.phase);
    }

    pub fn submit_email(&mut self, email: &str, now: u64) -> Result<Vec<RevealEvent>, RevealError> {
        if self.phase != Phase::Gated {
            return Err(RevealError::NotGated);
        }
        let email = email.trim();
        validate_email(email).map_err(|_| RevealError::InvalidEmail)?;
        self.captured_email = Some(email.to_string());

        if self.pending_prize.is_some() {
            let mut events = self.enter_revealed(now);
            events.extend(self.celebrate_if_due(now));
            Ok(events)
        } else {
            self.phase = Phase::Idle;
            Ok(Vec::new())
        }
    }

    /// Abandons the gate; a draw waiting behind it is discarded.
    pub fn cancel(&mut self) -> Result<(), RevealError> {
        if self.phase != Phase::Gated {
            return Err(RevealError::NotGated);
        }
        self.clear_play();
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Whether `begin_play` would accept a play right now.
    pub fn check_can_play(&self) -> Result<(), RevealError> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Animating => Err(RevealError::AlreadyAnimating),
            Phase::Gated => Err(RevealError::EmailRequired),
            other => Err(RevealError::NotIdle(other)),
        }
    }

    pub fn begin_play(&mut self, draw: DrawResult, now: u64, duration_ms: u64) -> Result<(), RevealError> {
        self.check_can_play()?;
        self.clear_play();
        self.pending_prize = Some(draw);
        self.animation_ends_at = Some(now.saturating_add(duration_ms));
        self.phase = Phase::Animating;
        Ok(())
    }

    /// Advances the animation timer and the delayed celebration.
    pub fn tick(&mut self, now: u64) -> Vec<RevealEvent> {
        let mut events = Vec::new();
        if self.phase == Phase::Animating {
            if let Some(ends_at) = self.animation_ends_at {
                if now >= ends_at {
                    events.extend(self.conclude_animation(now));
                }
            }
        }
        events.extend(self.celebrate_if_due(now));
        events
    }

    /// For animations that end on their own physics rather than a timer.
    pub fn complete_animation(&mut self, now: u64) -> Result<Vec<RevealEvent>, RevealError> {
        if self.phase != Phase::Animating {
            return Err(RevealError::NotAnimating);
        }
        let mut events = self.conclude_animation(now);
        events.extend(self.celebrate_if_due(now));
        Ok(events)
    }

    pub fn close(&mut self) {
        self.clear_play();
        self.captured_email = None;
        self.phase = Phase::Closed;
    }

    /// Replay: abandons anything in flight and returns to the resting phase.
    /// A captured email is kept for the same visitor.
    pub fn reset(&mut self) {
        self.clear_play();
        self.phase = self.resting_phase();
    }

    pub fn view(&self) -> RevealView {
        RevealView {
            phase: self.phase,
            email_gate: self.phase == Phase::Gated,
            show_prize: self.show_prize,
            confetti: self.confetti,
            prize: if self.show_prize { self.current_prize.clone() } else { None },
            captured_email: self.captured_email.clone(),
            animation_ends_at: self.animation_ends_at,
        }
    }

    fn conclude_animation(&mut self, now: u64) -> Vec<RevealEvent> {
        self.animation_ends_at = None;
        if self.settings.gate == EmailGate::AfterPlay && self.captured_email.is_none() {
            self.phase = Phase::Gated;
            self.confetti = false;
            self.show_prize = false;
            vec![RevealEvent::EnteredGate]
        } else {
            self.enter_revealed(now)
        }
    }

    fn enter_revealed(&mut self, now: u64) -> Vec<RevealEvent> {
        self.current_prize = self.pending_prize.take();
        self.phase = Phase::Revealed;
        self.revealed_at = Some(now);
        match &self.current_prize {
            Some(draw) => vec![RevealEvent::EnteredRevealed(draw.clone())],
            None => Vec::new(),
        }
    }

    fn celebrate_if_due(&mut self, now: u64) -> Vec<RevealEvent> {
        if self.phase != Phase::Revealed || self.show_prize {
            return Vec::new();
        }
        match self.revealed_at {
            Some(at) if now >= at.saturating_add(self.settings.reveal_delay_ms) => {
                self.show_prize = true;
                self.confetti = true;
                vec![RevealEvent::Celebrate]
            }
            _ => Vec::new(),
        }
    }
}

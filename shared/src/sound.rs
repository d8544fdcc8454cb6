//! Sound cues. Synthesis happens in the renderer; the games only decide
//! which cue to emit, through an injected [`AudioService`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SoundId {
    Click,
    Success,
    Prize,
    Win,
    Error,
    Pop,
    Ding,
    Crack,
    Sparkle,
    Confetti,
    WheelSpin,
    WheelTick,
    WheelStop,
    LeverPull,
    SlotSpin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LoopSound {
    WheelSpin,
    SlotSpinning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAction {
    Flip,
    Match,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EggAction {
    Crack,
    Reveal,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelAction {
    Spin,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchAction {
    Scratch,
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftAction {
    Select,
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlinkoAction {
    Drop,
    Land,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    LeverPull,
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Select,
    Correct,
    Incorrect,
    Complete,
}

/// A (game, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSound {
    Memory(MemoryAction),
    Mystery(EggAction),
    Wheel(WheelAction),
    Scratch(ScratchAction),
    Gift(GiftAction),
    Plinko(PlinkoAction),
    Slot(SlotAction),
    Quiz(QuizAction),
}

impl GameSound {
    pub fn sound_id(self) -> SoundId {
        match self {
            GameSound::Memory(MemoryAction::Flip) => SoundId::Click,
            GameSound::Memory(MemoryAction::Match) => SoundId::Success,
            GameSound::Memory(MemoryAction::Complete) => SoundId::Win,
            GameSound::Mystery(EggAction::Crack) => SoundId::Crack,
            GameSound::Mystery(EggAction::Reveal) => SoundId::Prize,
            GameSound::Mystery(EggAction::Rare) => SoundId::Confetti,
            GameSound::Mystery(EggAction::Legendary) => SoundId::Win,
            GameSound::Wheel(WheelAction::Spin) => SoundId::Pop,
            GameSound::Wheel(WheelAction::Stop) => SoundId::Ding,
            GameSound::Scratch(ScratchAction::Scratch) => SoundId::Pop,
            GameSound::Scratch(ScratchAction::Reveal) => SoundId::Prize,
            GameSound::Gift(GiftAction::Select) => SoundId::Click,
            GameSound::Gift(GiftAction::Reveal) => SoundId::Prize,
            GameSound::Plinko(PlinkoAction::Drop) => SoundId::Pop,
            GameSound::Plinko(PlinkoAction::Land) => SoundId::Ding,
            GameSound::Slot(SlotAction::LeverPull) => SoundId::LeverPull,
            GameSound::Slot(SlotAction::Win) => SoundId::Win,
            GameSound::Quiz(QuizAction::Select) => SoundId::Click,
            GameSound::Quiz(QuizAction::Correct) => SoundId::Success,
            GameSound::Quiz(QuizAction::Incorrect) => SoundId::Error,
            GameSound::Quiz(QuizAction::Complete) => SoundId::Win,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum SoundCue {
    Play { sound: SoundId },
    StartLoop { channel: String, sound: LoopSound },
    StopLoop { channel: String },
}

pub trait AudioService {
    fn play(&mut self, sound: SoundId);
    /// Starting a loop on a busy channel replaces whatever was playing there.
    fn start_loop(&mut self, channel: &str, sound: LoopSound);
    fn stop_loop(&mut self, channel: &str);
    fn stop_all(&mut self);
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;

    fn play_game(&mut self, sound: GameSound) {
        self.play(sound.sound_id());
    }
}

/// Records cues for the renderer and tracks one active loop per channel.
#[derive(Debug, Clone)]
pub struct SoundBoard {
    enabled: bool,
    cues: Vec<SoundCue>,
    active_loops: HashMap<String, LoopSound>,
}

impl Default for SoundBoard {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SoundBoard {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cues: Vec::new(),
            active_loops: HashMap::new(),
        }
    }

    pub fn active_loop(&self, channel: &str) -> Option<LoopSound> {
        self.active_loops.get(channel).copied()
    }

    pub fn cues(&self) -> &[SoundCue] {
        &self.cues
    }

    /// Hands the pending cues to the caller.
    pub fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}

impl AudioService for SoundBoard {
    fn play(&mut self, sound: SoundId) {
        if self.enabled {
            self.cues.push(SoundCue::Play { sound });
        }
    }

    fn start_loop(&mut self, channel: &str, sound: LoopSound) {
        if !self.enabled {
            return;
        }
        if self.active_loops.contains_key(channel) {
            self.stop_loop(channel);
        }
        self.active_loops.insert(channel.to_string(), sound);
        self.cues.push(SoundCue::StartLoop {
            channel: channel.to_string(),
            sound,
        });
    }

    fn stop_loop(&mut self, channel: &str) {
        if self.active_loops.remove(channel).is_some() {
            self.cues.push(SoundCue::StopLoop {
                channel: channel.to_string(),
            });
        }
    }

    fn stop_all(&mut self) {
        let mut channels: Vec<String> = self.active_loops.keys().cloned().collect();
        channels.sort();
        for channel in channels {
            self.stop_loop(&channel);
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop_all();
        }
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_sounds_route_to_ids() {
        assert_eq!(GameSound::Wheel(WheelAction::Stop).sound_id(), SoundId::Ding);
        assert_eq!(GameSound::Mystery(EggAction::Rare).sound_id(), SoundId::Confetti);
        assert_eq!(GameSound::Quiz(QuizAction::Incorrect).sound_id(), SoundId::Error);
        assert_eq!(SoundId::WheelTick.to_string(), "wheel-tick");
    }

    #[test]
    fn test_loop_channel_is_last_writer_wins() {
        let mut board = SoundBoard::default();
        board.start_loop("spin", LoopSound::WheelSpin);
        board.start_loop("spin", LoopSound::SlotSpinning);
        assert_eq!(board.active_loop("spin"), Some(LoopSound::SlotSpinning));
        assert_eq!(
            board.take_cues(),
            vec![
                SoundCue::StartLoop { channel: "spin".into(), sound: LoopSound::WheelSpin },
                SoundCue::StopLoop { channel: "spin".into() },
                SoundCue::StartLoop { channel: "spin".into(), sound: LoopSound::SlotSpinning },
            ]
        );
    }

    #[test]
    fn test_disabled_board_is_silent() {
        let mut board = SoundBoard::new(false);
        board.play_game(GameSound::Gift(GiftAction::Select));
        board.start_loop("spin", LoopSound::WheelSpin);
        assert!(board.cues().is_empty());
        assert_eq!(board.active_loop("spin"), None);
    }
}

//! Scavenger hunt: a fixed list of steps, each unlocking a reward, with
//! progress kept in a key-value store between visits.

use crate::constants::HUNT_PROGRESS_KEY;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Offer,
    Coupon,
    Message,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HuntReward {
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HuntStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub clue: String,
    pub action: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<HuntReward>,
}

fn step(id: &str, title: &str, description: &str, clue: &str, action: &str, reward: HuntReward) -> HuntStep {
    HuntStep {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        clue: clue.to_string(),
        action: action.to_string(),
        completed: false,
        reward: Some(reward),
    }
}

fn reward(kind: RewardKind, title: &str, description: &str, value: &str) -> HuntReward {
    HuntReward {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        value: Some(value.to_string()),
    }
}

pub fn default_steps() -> Vec<HuntStep> {
    vec![
        step(
            "find-lowest-rate",
            "Find the Best Rate",
            "Locate the lowest interest rate plan on the website",
            "Look for the plan that saves you the most money",
            "Click on the account with the lowest APR",
            reward(RewardKind::Offer, "Rate Match Guarantee", "We'll match any competitor's rate!", "0.5% APR reduction"),
        ),
        step(
            "gold-savings",
            "Golden Opportunity",
            "Locate the gold savings account information",
            "Find the premium savings option with golden benefits",
            "Navigate to the premium savings section",
            reward(RewardKind::Coupon, "Gold Account Bonus", "Get $50 bonus when you open a gold account", "SAVE50"),
        ),
        step(
            "credit-score-tips",
            "Credit Score Wisdom",
            "Answer a clue about credit score improvement tips",
            "What's the most important factor in your credit score?",
            "Select the correct answer about credit scores",
            reward(
                RewardKind::Message,
                "Credit Score Expert",
                "You're now eligible for our credit monitoring service",
                "Free credit report",
            ),
        ),
        step(
            "hidden-offers",
            "Hidden Treasures",
            "Reveal hidden offers by visiting 3 pages",
            "Explore different sections to unlock special deals",
            "Visit 3 different pages on the website",
            reward(RewardKind::Offer, "Explorer's Reward", "Exclusive access to limited-time offers", "20% off fees"),
        ),
        step(
            "branch-locator",
            "Branch Discovery",
            "Find the nearest branch location",
            "Use our locator to find a branch near you",
            "Search for a branch in your area",
            reward(RewardKind::Coupon, "Branch Visit Bonus", "Get a free coffee when you visit any branch", "COFFEE2024"),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntError {
    UnknownStep(String),
    AlreadyCompleted(String),
}

impl fmt::Display for HuntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStep(id) => write!(f, "There is no hunt step '{}'", id),
            Self::AlreadyCompleted(id) => write!(f, "Step '{}' is already complete", id),
        }
    }
}

impl std::error::Error for HuntError {}

/// Stored form. Older saves hold only the bare step list.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredProgress {
    Full { steps: Vec<HuntStep>, streak: u32 },
    StepsOnly(Vec<HuntStep>),
}

/// Storage key for a player; the bare key belongs to the anonymous visitor.
pub fn progress_key(player: Option<&str>) -> String {
    match player {
        Some(player) if !player.is_empty() => format!("{}:{}", HUNT_PROGRESS_KEY, player),
        _ => HUNT_PROGRESS_KEY.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepCompletion {
    pub step_id: String,
    pub reward: Option<HuntReward>,
    pub streak: u32,
    pub hunt_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScavengerHunt {
    #[serde(skip)]
    key: String,
    pub steps: Vec<HuntStep>,
    pub streak: u32,
}

impl ScavengerHunt {
    /// Saved progress when there is a readable save, the default steps otherwise.
    pub fn load(store: &dyn KeyValueStore, player: Option<&str>) -> Self {
        let key = progress_key(player);
        let (steps, streak) = match store.get(&key) {
            None => (default_steps(), 0),
            Some(raw) => match serde_json::from_str::<StoredProgress>(&raw) {
                Ok(StoredProgress::Full { steps, streak }) => (steps, streak),
                Ok(StoredProgress::StepsOnly(steps)) => (steps, 0),
                Err(e) => {
                    log::warn!("Discarding unreadable hunt progress under {}: {}", key, e);
                    (default_steps(), 0)
                }
            },
        };
        Self { key, steps, streak }
    }

    fn save(&self, store: &mut dyn KeyValueStore) {
        let stored = serde_json::json!({ "steps": self.steps, "streak": self.streak });
        store.set(&self.key, stored.to_string());
    }

    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.completed)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.steps.len() as f64 * 100.0
    }

    pub fn rewards(&self) -> Vec<&HuntReward> {
        self.steps
            .iter()
            .filter(|s| s.completed)
            .filter_map(|s| s.reward.as_ref())
            .collect()
    }

    pub fn complete_step(&mut self, store: &mut dyn KeyValueStore, step_id: &str) -> Result<StepCompletion, HuntError> {
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or_else(|| HuntError::UnknownStep(step_id.to_string()))?;
        if step.completed {
            return Err(HuntError::AlreadyCompleted(step_id.to_string()));
        }
        step.completed = true;
        let reward = step.reward.clone();
        self.streak += 1;
        self.save(store);

        Ok(StepCompletion {
            step_id: step_id.to_string(),
            reward,
            streak: self.streak,
            hunt_completed: self.is_complete(),
        })
    }

    pub fn reset(&mut self, store: &mut dyn KeyValueStore) {
        store.remove(&self.key);
        self.steps = default_steps();
        self.streak = 0;
    }
}

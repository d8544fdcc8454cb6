//! Typed configuration documents for each prize game, their built-in
//! defaults, and the shallow merge applied to fetched documents.

use crate::prize::{Prize, PrizeTable, Rarity};
use crate::sampler::TierBands;
use crate::shared_slot_game::{default_symbols, SlotSymbol, StripCounts};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// The games served with a prize table and a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameKind {
    SpinWheel,
    PickAGift,
    ScratchCard,
    Plinko,
    SlotMachine,
    MysteryEgg,
}

impl GameKind {
    /// File name of the game's document under the config base.
    pub fn document_name(self) -> String {
        format!("{}.json", self)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    NotAnObject,
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "configuration document is not a JSON object"),
            Self::Json(e) => write!(f, "configuration document has the wrong shape: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::NotAnObject => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Overlays the top-level fields of `fetched` onto the serialised
/// `defaults`, then reads the result back as `T`. Nested objects are
/// replaced whole, not merged.
pub fn merge_over_defaults<T>(defaults: &T, fetched: serde_json::Value) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let serde_json::Value::Object(fetched) = fetched else {
        return Err(ConfigError::NotAnObject);
    };
    let mut merged = match serde_json::to_value(defaults)? {
        serde_json::Value::Object(map) => map,
        _ => return Err(ConfigError::NotAnObject),
    };
    for (key, value) in fetched {
        merged.insert(key, value);
    }
    Ok(serde_json::from_value(serde_json::Value::Object(merged))?)
}

/// Shared surface of every game document.
pub trait GameConfig: Serialize + DeserializeOwned + Clone + Default + Send + Sync {
    const KIND: GameKind;

    fn prize_table(&self) -> PrizeTable;

    /// How long the play animation runs before the reveal.
    fn animation_duration_ms(&self) -> u64;
}

// ---- spin wheel ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WheelDefaults {
    pub wheel_size: u32,
    pub animation_duration: u64,
    pub min_revolutions: u32,
    pub max_revolutions: u32,
    pub title: String,
    pub button_text: String,
    pub spinning_text: String,
}

impl Default for WheelDefaults {
    fn default() -> Self {
        Self {
            wheel_size: 400,
            animation_duration: 4000,
            min_revolutions: 5,
            max_revolutions: 8,
            title: "Spin the Wheel!".to_string(),
            button_text: "SPIN".to_string(),
            spinning_text: "Spinning...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinWheelConfig {
    pub segments: PrizeTable,
    #[serde(default)]
    pub defaults: WheelDefaults,
}

impl Default for SpinWheelConfig {
    fn default() -> Self {
        let segment = |text: &str, color: &str, value: &str| Prize::new(text).with_color(color).with_value(value);
        Self {
            segments: table(vec![
                segment("10% Off", "#FFC300", "DISCOUNT10"),
                segment("Free Shipping", "#FF5733", "FREESHIP"),
                segment("Buy One Get One", "#C70039", "BOGO"),
                segment("20% Off", "#900C3F", "DISCOUNT20"),
                segment("No Luck", "#581845", "NOLUCK"),
                segment("Gift Card", "#2E86C1", "GIFTCARD"),
            ]),
            defaults: WheelDefaults::default(),
        }
    }
}

impl GameConfig for SpinWheelConfig {
    const KIND: GameKind = GameKind::SpinWheel;

    fn prize_table(&self) -> PrizeTable {
        self.segments.clone()
    }

    fn animation_duration_ms(&self) -> u64 {
        self.defaults.animation_duration
    }
}

// ---- pick a gift ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GiftDefaults {
    pub title: String,
    pub subtitle: String,
    pub auto_open: bool,
    pub show_close_button: bool,
    pub animation_duration: u64,
    pub box_count: usize,
    pub variant: String,
    pub size: String,
}

impl Default for GiftDefaults {
    fn default() -> Self {
        Self {
            title: "Choose a Gift!".to_string(),
            subtitle: "Pick one of the gift boxes to reveal your prize".to_string(),
            auto_open: false,
            show_close_button: true,
            animation_duration: crate::constants::GIFT_REVEAL_MS,
            box_count: crate::constants::GIFT_BOX_COUNT,
            variant: "default".to_string(),
            size: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickAGiftConfig {
    pub prizes: PrizeTable,
    #[serde(default)]
    pub defaults: GiftDefaults,
}

impl Default for PickAGiftConfig {
    fn default() -> Self {
        let gift = |text: &str, value: &str, color: &str, icon: &str, p: f64| {
            Prize::new(text).with_value(value).with_color(color).with_icon(icon).with_weight(p)
        };
        Self {
            prizes: table(vec![
                gift("30% OFF", "Use code: GIFT30", "#e74c3c", "🎯", 0.15),
                gift("Free Shipping", "On orders over $25", "#3498db", "🚚", 0.20),
                gift("$15 Gift Card", "Valid for 60 days", "#27ae60", "💳", 0.10),
                gift("Buy 1 Get 1 Free", "Select items only", "#f39c12", "🎁", 0.08),
                gift("Try Again!", "Better luck next time", "#95a5a6", "🔄", 0.25),
                gift("20% OFF", "Use code: PICK20", "#9b59b6", "🍀", 0.12),
                gift("Free Sample", "Choose any product", "#8e44ad", "🎪", 0.05),
                gift("VIP Access", "Exclusive member benefits", "#d35400", "👑", 0.05),
            ]),
            defaults: GiftDefaults::default(),
        }
    }
}

impl GameConfig for PickAGiftConfig {
    const KIND: GameKind = GameKind::PickAGift;

    fn prize_table(&self) -> PrizeTable {
        self.prizes.clone()
    }

    fn animation_duration_ms(&self) -> u64 {
        self.defaults.animation_duration
    }
}

// ---- scratch card ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScratchDefaults {
    pub card_width: u32,
    pub card_height: u32,
    pub scratch_color: String,
    pub scratch_pattern: String,
    /// Percent of the surface that must be cleared.
    pub reveal_threshold: f64,
    pub brush_radius: f64,
    pub title: String,
    pub reset_button_text: String,
    pub instructions: String,
    pub variant: String,
    pub size: String,
}

impl Default for ScratchDefaults {
    fn default() -> Self {
        Self {
            card_width: 400,
            card_height: 250,
            scratch_color: "#c0c0c0".to_string(),
            scratch_pattern: "Scratch to reveal your prize! 🎁".to_string(),
            reveal_threshold: 60.0,
            brush_radius: 20.0,
            title: "Scratch Card Game".to_string(),
            reset_button_text: "Play Again".to_string(),
            instructions: "Use your mouse or finger to scratch the surface!".to_string(),
            variant: "default".to_string(),
            size: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScratchCardConfig {
    pub prizes: PrizeTable,
    #[serde(default)]
    pub defaults: ScratchDefaults,
}

impl Default for ScratchCardConfig {
    fn default() -> Self {
        let card = |text: &str, value: &str, color: &str, icon: &str| {
            Prize::new(text).with_value(value).with_color(color).with_icon(icon)
        };
        Self {
            prizes: table(vec![
                card("50% OFF", "Use code: SCRATCH50", "#e74c3c", "🎯"),
                card("Free Shipping", "On orders over $30", "#3498db", "🚚"),
                card("$25 Gift Card", "Valid for 90 days", "#27ae60", "💳"),
                card("Buy 2 Get 1 Free", "Select items only", "#f39c12", "🎁"),
                card("Try Again!", "Better luck next time", "#95a5a6", "🔄"),
                card("30% OFF", "Use code: SCRATCH30", "#9b59b6", "🍀"),
                card("Free Sample", "Choose any product", "#8e44ad", "🎪"),
                card("VIP Access", "Exclusive member benefits", "#d35400", "👑"),
            ]),
            defaults: ScratchDefaults::default(),
        }
    }
}

impl GameConfig for ScratchCardConfig {
    const KIND: GameKind = GameKind::ScratchCard;

    fn prize_table(&self) -> PrizeTable {
        self.prizes.clone()
    }

    // Scratching has no timer; the card concludes on its threshold.
    fn animation_duration_ms(&self) -> u64 {
        u64::MAX
    }
}

// ---- plinko ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlinkoDefaults {
    pub board_width: f64,
    pub board_height: f64,
    pub pin_rows: u32,
    pub ball_size: f64,
    pub pin_size: f64,
    pub animation_duration: u64,
    pub title: String,
    pub button_text: String,
    pub dropping_text: String,
    pub instructions: String,
    pub variant: String,
    pub size: String,
}

impl Default for PlinkoDefaults {
    fn default() -> Self {
        Self {
            board_width: 600.0,
            board_height: 800.0,
            pin_rows: 12,
            ball_size: 8.0,
            pin_size: 6.0,
            animation_duration: 3000,
            title: "Plinko Game".to_string(),
            button_text: "DROP BALL".to_string(),
            dropping_text: "Dropping...".to_string(),
            instructions: "Drop the ball and watch it bounce through the pins to win prizes!".to_string(),
            variant: "default".to_string(),
            size: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlinkoConfig {
    pub prizes: PrizeTable,
    #[serde(default)]
    pub defaults: PlinkoDefaults,
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        let slot = |text: &str, value: &str, color: &str, icon: &str, m: f64| {
            Prize::new(text).with_value(value).with_color(color).with_icon(icon).with_multiplier(m)
        };
        Self {
            prizes: table(vec![
                slot("0x", "Try Again!", "#7f8c8d", "🔄", 0.0),
                slot("0.2x", "Small Loss", "#34495e", "📉", 0.2),
                slot("0.5x", "Minor Loss", "#5d6d7e", "📊", 0.5),
                slot("0.7x", "Break Even", "#95a5a6", "⚖️", 0.7),
                slot("1x", "Even", "#85c1e9", "🎯", 1.0),
                slot("1.1x", "Small Win", "#82e0aa", "🍀", 1.1),
                slot("1.2x", "Minor Win", "#f7dc6f", "⭐", 1.2),
                slot("1.3x", "Good Win", "#f8c471", "💎", 1.3),
                slot("1.6x", "Great Win", "#e67e22", "🔥", 1.6),
                slot("2.1x", "Big Win", "#e74c3c", "🎰", 2.1),
                slot("3.2x", "Huge Win", "#8e44ad", "👑", 3.2),
                slot("5.3x", "Mega Win", "#2ecc71", "🚀", 5.3),
                slot("14x", "Epic Win", "#f39c12", "💫", 14.0),
                slot("49x", "Legendary Win", "#e67e22", "🌟", 49.0),
                slot("353x", "Mythical Win", "#e74c3c", "🏆", 353.0),
            ]),
            defaults: PlinkoDefaults::default(),
        }
    }
}

impl GameConfig for PlinkoConfig {
    const KIND: GameKind = GameKind::Plinko;

    fn prize_table(&self) -> PrizeTable {
        self.prizes.clone()
    }

    fn animation_duration_ms(&self) -> u64 {
        self.defaults.animation_duration
    }
}

// ---- slot machine ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotDefaults {
    pub spin_duration: u64,
    pub strip_counts: StripCounts,
    pub title: String,
    pub button_text: String,
}

impl Default for SlotDefaults {
    fn default() -> Self {
        Self {
            spin_duration: 1800,
            strip_counts: StripCounts::default(),
            title: "Lucky Slots".to_string(),
            button_text: "PULL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotMachineConfig {
    pub symbols: Vec<SlotSymbol>,
    #[serde(default)]
    pub defaults: SlotDefaults,
}

impl Default for SlotMachineConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            defaults: SlotDefaults::default(),
        }
    }
}

impl GameConfig for SlotMachineConfig {
    const KIND: GameKind = GameKind::SlotMachine;

    /// One entry per symbol in symbol order, then the losing outcome last.
    fn prize_table(&self) -> PrizeTable {
        let mut prizes: Vec<Prize> = self.symbols.iter().map(SlotSymbol::to_prize).collect();
        prizes.push(Prize::new("Try Again!").with_value("0"));
        table(prizes)
    }

    fn animation_duration_ms(&self) -> u64 {
        self.defaults.spin_duration
    }
}

// ---- mystery egg ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EggDefaults {
    pub egg_count: usize,
    pub crack_duration: u64,
    pub bands: TierBands,
    pub title: String,
}

impl Default for EggDefaults {
    fn default() -> Self {
        Self {
            egg_count: crate::constants::EGG_COUNT,
            crack_duration: crate::constants::EGG_CRACK_MS,
            bands: TierBands::default(),
            title: "Mystery Prize Eggs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysteryEggConfig {
    pub prizes: PrizeTable,
    #[serde(default)]
    pub defaults: EggDefaults,
}

impl Default for MysteryEggConfig {
    fn default() -> Self {
        const POINTS: &str = "#f1c40f";
        const COUPON: &str = "#3498db";
        const GIFT: &str = "#e67e22";
        const BONUS: &str = "#9b59b6";
        let egg = |name: &str, value: &str, icon: &str, color: &str, rarity: Rarity| {
            Prize::new(name).with_value(value).with_icon(icon).with_color(color).with_rarity(rarity)
        };
        Self {
            prizes: table(vec![
                egg("50 Points", "50", "⭐", POINTS, Rarity::Common),
                egg("100 Points", "100", "⭐", POINTS, Rarity::Common),
                egg("10% Off", "10%", "🎫", COUPON, Rarity::Common),
                egg("Free Coffee", "Coffee", "☕", GIFT, Rarity::Common),
                egg("Free Snack", "Snack", "🍪", GIFT, Rarity::Common),
                egg("250 Points", "250", "⭐", POINTS, Rarity::Rare),
                egg("25% Off", "25%", "🎫", COUPON, Rarity::Rare),
                egg("Free Lunch", "Lunch", "🍕", GIFT, Rarity::Rare),
                egg("Double Points", "2x", "⚡", BONUS, Rarity::Rare),
                egg("500 Points", "500", "⭐", POINTS, Rarity::Epic),
                egg("50% Off", "50%", "🎫", COUPON, Rarity::Epic),
                egg("Free Dinner", "Dinner", "🍽️", GIFT, Rarity::Epic),
                egg("Triple Points", "3x", "⚡", BONUS, Rarity::Epic),
                egg("1000 Points", "1000", "⭐", POINTS, Rarity::Legendary),
                egg("100% Off", "100%", "🎫", COUPON, Rarity::Legendary),
                egg("Free Vacation", "Vacation", "🏖️", GIFT, Rarity::Legendary),
                egg("Mega Bonus", "10x", "⚡", BONUS, Rarity::Legendary),
            ]),
            defaults: EggDefaults::default(),
        }
    }
}

impl GameConfig for MysteryEggConfig {
    const KIND: GameKind = GameKind::MysteryEgg;

    fn prize_table(&self) -> PrizeTable {
        self.prizes.clone()
    }

    fn animation_duration_ms(&self) -> u64 {
        self.defaults.crack_duration
    }
}

// Built-in tables carry no weights that could fail validation.
fn table(prizes: Vec<Prize>) -> PrizeTable {
    PrizeTable::new(prizes).unwrap_or_default()
}

// ---- embed attributes ----

const EMBED_SEGMENT_COLOR: &str = "#FFC300";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedPrize {
    pub text: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// The wheel's data-attribute set as written by a CMS page. Every
/// attribute is optional and a malformed one falls back to its default.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelEmbedAttributes {
    pub prizes: Vec<EmbedPrize>,
    pub colors: Vec<String>,
    /// Redeem codes keyed by segment value.
    pub codes: HashMap<String, String>,
    pub defaults: WheelDefaults,
    pub sound_enabled: bool,
}

impl WheelEmbedAttributes {
    pub fn parse(attributes: &HashMap<String, String>) -> Self {
        let fallback = WheelDefaults::default();
        let text = |key: &str, default: String| {
            attributes
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or(default)
        };
        let number = |key: &str, default: u64| {
            attributes
                .get(key)
                .and_then(|v| parse_leading_int(v))
                .filter(|n| *n != 0)
                .unwrap_or(default)
        };

        let defaults = WheelDefaults {
            wheel_size: number("wheelSize", fallback.wheel_size as u64) as u32,
            animation_duration: number("animationDuration", fallback.animation_duration),
            min_revolutions: number("minRevolutions", fallback.min_revolutions as u64) as u32,
            max_revolutions: number("maxRevolutions", fallback.max_revolutions as u64) as u32,
            title: text("title", fallback.title.clone()),
            button_text: text("buttonText", fallback.button_text.clone()),
            spinning_text: text("spinningText", fallback.spinning_text.clone()),
        };

        Self {
            prizes: parse_json_attribute(attributes, "prizes"),
            colors: parse_json_attribute(attributes, "colors"),
            codes: parse_json_attribute(attributes, "codes"),
            defaults,
            sound_enabled: attributes.get("soundEnabled").map(|v| v == "true").unwrap_or(false),
        }
    }

    /// Builds the wheel document. Without any embedded prizes the built-in
    /// segments are kept.
    pub fn into_config(self) -> SpinWheelConfig {
        let segments = if self.prizes.is_empty() {
            SpinWheelConfig::default().segments
        } else {
            let prizes = self
                .prizes
                .into_iter()
                .enumerate()
                .map(|(i, p)| {
                    let color = self
                        .colors
                        .get(i)
                        .cloned()
                        .or(p.color)
                        .unwrap_or_else(|| EMBED_SEGMENT_COLOR.to_string());
                    let mut prize = Prize::new(p.text).with_color(color);
                    prize.detail_value = p.value;
                    prize
                })
                .collect();
            table(prizes)
        };
        SpinWheelConfig {
            segments,
            defaults: self.defaults,
        }
    }

    pub fn redeem_code(&self, value: &str) -> Option<&str> {
        self.codes.get(value).map(String::as_str)
    }
}

fn parse_json_attribute<T: DeserializeOwned + Default>(attributes: &HashMap<String, String>, key: &str) -> T {
    let Some(raw) = attributes.get(key).filter(|v| !v.is_empty()) else {
        return T::default();
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to parse embed attribute {}: {}", key, e);
            T::default()
        }
    }
}

// Leading decimal digits after optional whitespace, like `parseInt`.
fn parse_leading_int(raw: &str) -> Option<u64> {
    let digits: String = raw.trim_start().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_replaces_top_level_fields() {
        let defaults = SpinWheelConfig::default();
        let merged = merge_over_defaults(
            &defaults,
            json!({ "segments": [{ "text": "Only Prize", "color": "#000000" }] }),
        )
        .unwrap();
        assert_eq!(merged.segments.len(), 1);
        assert_eq!(merged.defaults, defaults.defaults);
    }

    #[test]
    fn test_partial_defaults_object_fills_missing_fields() {
        let merged = merge_over_defaults(&PlinkoConfig::default(), json!({ "defaults": { "pinRows": 8 } })).unwrap();
        assert_eq!(merged.defaults.pin_rows, 8);
        assert_eq!(merged.defaults.board_width, 600.0);
        assert_eq!(merged.prizes.len(), 15);
    }

    #[test]
    fn test_merge_rejects_non_object_and_bad_shape() {
        let defaults = PickAGiftConfig::default();
        assert!(matches!(merge_over_defaults(&defaults, json!([1, 2])), Err(ConfigError::NotAnObject)));
        assert!(matches!(
            merge_over_defaults(&defaults, json!({ "prizes": [{ "text": "x", "probability": -1 }] })),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_default_tables_match_documents() {
        assert_eq!(SpinWheelConfig::default().segments.len(), 6);
        assert_eq!(PickAGiftConfig::default().prizes.len(), 8);
        assert!(PickAGiftConfig::default().prizes.is_weighted());
        assert!(!ScratchCardConfig::default().prizes.is_weighted());
        assert_eq!(MysteryEggConfig::default().prizes.indices_of(Rarity::Legendary).len(), 4);
        assert_eq!(SlotMachineConfig::default().prize_table().len(), 6);
    }

    #[test]
    fn test_game_kind_document_names() {
        assert_eq!(GameKind::PickAGift.document_name(), "pick-a-gift.json");
        assert_eq!("slot-machine".parse::<GameKind>().unwrap(), GameKind::SlotMachine);
    }

    #[test]
    fn test_embed_attributes_fall_back_per_attribute() {
        let attributes: HashMap<String, String> = [
            ("prizes", r#"[{"text":"Mug","value":"MUG"},{"text":"Hat"}]"#),
            ("colors", "not json"),
            ("codes", r#"{"MUG":"MUG-2024"}"#),
            ("wheelSize", "500px"),
            ("animationDuration", "abc"),
            ("minRevolutions", "0"),
            ("soundEnabled", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let embed = WheelEmbedAttributes::parse(&attributes);
        assert!(embed.colors.is_empty());
        assert_eq!(embed.redeem_code("MUG"), Some("MUG-2024"));
        assert!(embed.sound_enabled);

        let config = embed.into_config();
        assert_eq!(config.defaults.wheel_size, 500);
        assert_eq!(config.defaults.animation_duration, 4000);
        assert_eq!(config.defaults.min_revolutions, 5);
        assert_eq!(config.defaults.title, "Spin the Wheel!");
        assert_eq!(config.segments.len(), 2);
        assert_eq!(config.segments.get(1).unwrap().display_color, "#FFC300");
        assert_eq!(config.segments.get(0).unwrap().detail_value.as_deref(), Some("MUG"));
    }

    #[test]
    fn test_empty_embed_keeps_builtin_segments() {
        let config = WheelEmbedAttributes::parse(&HashMap::new()).into_config();
        assert_eq!(config, SpinWheelConfig::default());
    }
}

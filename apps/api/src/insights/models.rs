use serde::{Deserialize, Serialize};

use crate::llm_client::sanitize::{Envelope, JsonShape};

pub const UNAVAILABLE_DETAILS: &str = "Unable to load detailed information. Please try again.";
pub const MISSING_DETAILS: &str = "Detailed information not available.";
pub const FALLBACK_LABEL: &str = "N/A";
pub const FALLBACK_EMOJI: &str = "❓";
pub const CHAT_FALLBACK: &str =
    "Sorry, I could not answer that right now. Please try again in a moment.";

/// Where a piece of dashboard content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Generated,
    /// Generation or parsing failed; the sentinel value was substituted.
    Fallback,
    /// No completed profile (or week 0), so nothing was requested.
    NeedsSetup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pt,
}

impl Language {
    pub fn instruction(self) -> &'static str {
        match self {
            Language::En => "Respond in ENGLISH. All texts must be in English.",
            Language::Pt => {
                "Responda em PORTUGUÊS BRASILEIRO. Todos os textos devem estar em português."
            }
        }
    }
}

/// The three weekly dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightKind {
    BabySize,
    OrganDevelopment,
    BabyAbilities,
}

impl HighlightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightKind::BabySize => "baby-size",
            HighlightKind::OrganDevelopment => "organ-development",
            HighlightKind::BabyAbilities => "baby-abilities",
        }
    }
}

/// Free-text explanations behind the dashboard stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailTopic {
    WeeksAlong,
    DaysToGo,
    WeeksLeft,
}

impl DetailTopic {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailTopic::WeeksAlong => "weeks-along",
            DetailTopic::DaysToGo => "days-to-go",
            DetailTopic::WeeksLeft => "weeks-left",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model reply envelopes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct BabySizeReply {
    pub item: String,
    pub emoji: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganDevelopmentReply {
    pub organ: String,
    pub emoji: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BabyAbilityReply {
    pub ability: String,
    pub emoji: String,
    pub details: Option<String>,
}

impl Envelope for BabySizeReply {
    const SHAPE: JsonShape = JsonShape::Object;
}

impl Envelope for OrganDevelopmentReply {
    const SHAPE: JsonShape = JsonShape::Object;
}

impl Envelope for BabyAbilityReply {
    const SHAPE: JsonShape = JsonShape::Object;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub name: String,
    pub description: String,
    pub is_normal: bool,
    /// "very common" | "common" | "less common" | "rare", kept verbatim.
    pub normality_level: String,
    #[serde(default)]
    pub remedies: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub summary: Option<String>,
    pub full: Option<String>,
}

impl Envelope for ChatReply {
    const SHAPE: JsonShape = JsonShape::Object;
}

// ────────────────────────────────────────────────────────────────────────────
// Always-renderable outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub kind: HighlightKind,
    pub label: String,
    pub emoji: String,
    pub details: String,
    pub source: ContentSource,
}

impl Highlight {
    pub fn fallback(kind: HighlightKind, source: ContentSource) -> Self {
        Highlight {
            kind,
            label: FALLBACK_LABEL.to_string(),
            emoji: FALLBACK_EMOJI.to_string(),
            details: UNAVAILABLE_DETAILS.to_string(),
            source,
        }
    }

    fn generated(kind: HighlightKind, label: String, emoji: String, details: Option<String>) -> Self {
        Highlight {
            kind,
            label,
            emoji,
            details: details
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| MISSING_DETAILS.to_string()),
            source: ContentSource::Generated,
        }
    }
}

impl From<BabySizeReply> for Highlight {
    fn from(r: BabySizeReply) -> Self {
        Highlight::generated(HighlightKind::BabySize, r.item, r.emoji, r.details)
    }
}

impl From<OrganDevelopmentReply> for Highlight {
    fn from(r: OrganDevelopmentReply) -> Self {
        Highlight::generated(HighlightKind::OrganDevelopment, r.organ, r.emoji, r.details)
    }
}

impl From<BabyAbilityReply> for Highlight {
    fn from(r: BabyAbilityReply) -> Self {
        Highlight::generated(HighlightKind::BabyAbilities, r.ability, r.emoji, r.details)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyHighlights {
    pub week: u32,
    pub baby_size: Highlight,
    pub organ_development: Highlight,
    pub baby_abilities: Highlight,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymptomList {
    pub week: u32,
    pub symptoms: Vec<Symptom>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactList {
    pub week: u32,
    pub facts: Vec<String>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailText {
    pub topic: DetailTopic,
    pub text: String,
    pub source: ContentSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub summary: String,
    pub full: Option<String>,
    pub source: ContentSource,
}

impl ChatAnswer {
    pub fn fallback() -> Self {
        ChatAnswer {
            summary: CHAT_FALLBACK.to_string(),
            full: None,
            source: ContentSource::Fallback,
        }
    }

    /// Summary falls back to the full answer, then to the raw reply text.
    pub fn from_reply(reply: ChatReply, raw: &str) -> Self {
        let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());
        let full = non_empty(&reply.full);
        let summary = non_empty(&reply.summary)
            .or_else(|| full.clone())
            .unwrap_or_else(|| raw.trim().to_string());
        ChatAnswer {
            summary,
            full,
            source: ContentSource::Generated,
        }
    }
}

//! Insight generation: prompt -> provider -> sanitizer -> renderable value.
//!
//! Every function here returns something the dashboard can render. Provider
//! failures and unparseable replies are logged and replaced by the fallback
//! for that card; nothing is retried.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::insights::models::{
    BabyAbilityReply, BabySizeReply, ChatAnswer, ChatReply, ContentSource, DetailText,
    DetailTopic, FactList, Highlight, HighlightKind, Language, OrganDevelopmentReply, Symptom,
    SymptomList, WeeklyHighlights, UNAVAILABLE_DETAILS,
};
use crate::insights::prompts::{
    build_chat_prompt, build_detail_prompt, build_facts_prompt, build_highlight_prompt,
    build_symptoms_prompt,
};
use crate::llm_client::sanitize::{excerpt, parse_model_output, Envelope};
use crate::llm_client::{LlmClients, Provider};
use crate::profile::gestation::GestationStats;
use crate::profile::models::{Profile, ProfileData};

pub const DEFAULT_FACT_COUNT: usize = 5;
pub const MAX_FACT_COUNT: usize = 10;

/// Characters of a rejected reply kept in the warning log.
const LOG_EXCERPT_CHARS: usize = 200;

/// A completed profile together with its gestation numbers for `today`.
#[derive(Debug, Clone)]
pub struct PregnancyContext {
    pub data: ProfileData,
    pub stats: GestationStats,
}

impl PregnancyContext {
    /// `None` until setup is complete and a last period date is known.
    pub fn from_profile(profile: Option<Profile>, today: NaiveDate) -> Option<Self> {
        let profile = profile?.completed()?;
        let last_period = profile.data.last_period?;
        Some(PregnancyContext {
            stats: GestationStats::compute(last_period, today),
            data: profile.data,
        })
    }

    pub fn week(&self) -> u32 {
        self.stats.weeks_pregnant
    }

    /// Week 0 has nothing to say yet.
    fn active(ctx: Option<&Self>) -> Option<&Self> {
        ctx.filter(|c| c.week() > 0)
    }
}

/// Issues one generation call. Failures are logged and collapse to `None`.
async fn generate_text(
    llm: &LlmClients,
    provider: Provider,
    call_site: &str,
    prompt: &str,
) -> Option<String> {
    match llm.generate(provider, prompt).await {
        Ok(generation) => Some(generation.text),
        Err(e) => {
            warn!("{call_site}: {provider} generation failed: {e}");
            None
        }
    }
}

/// Runs `raw` through the sanitizer. Rejections are logged with an excerpt of the reply.
fn parse_or_warn<T: Envelope>(call_site: &str, raw: &str) -> Option<T> {
    match parse_model_output::<T>(raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(
                "{call_site}: model output rejected ({e}); raw: {}",
                excerpt(raw, LOG_EXCERPT_CHARS)
            );
            None
        }
    }
}

async fn generate_parsed<T: Envelope>(
    llm: &LlmClients,
    provider: Provider,
    call_site: &str,
    prompt: &str,
) -> Option<T> {
    let raw = generate_text(llm, provider, call_site, prompt).await?;
    parse_or_warn(call_site, &raw)
}

// ────────────────────────────────────────────────────────────────────────────
// Weekly highlights
// ────────────────────────────────────────────────────────────────────────────

pub async fn weekly_highlight(
    llm: &LlmClients,
    provider: Provider,
    kind: HighlightKind,
    ctx: Option<&PregnancyContext>,
) -> Highlight {
    let Some(ctx) = PregnancyContext::active(ctx) else {
        return Highlight::fallback(kind, ContentSource::NeedsSetup);
    };
    let prompt = build_highlight_prompt(kind, ctx.week(), &ctx.data);
    let call_site = kind.as_str();

    let card = match kind {
        HighlightKind::BabySize => generate_parsed::<BabySizeReply>(llm, provider, call_site, &prompt)
            .await
            .map(Highlight::from),
        HighlightKind::OrganDevelopment => {
            generate_parsed::<OrganDevelopmentReply>(llm, provider, call_site, &prompt)
                .await
                .map(Highlight::from)
        }
        HighlightKind::BabyAbilities => {
            generate_parsed::<BabyAbilityReply>(llm, provider, call_site, &prompt)
                .await
                .map(Highlight::from)
        }
    };
    card.unwrap_or_else(|| Highlight::fallback(kind, ContentSource::Fallback))
}

/// The three cards are independent and requested concurrently.
pub async fn weekly_highlights(
    llm: &LlmClients,
    provider: Provider,
    ctx: Option<&PregnancyContext>,
) -> WeeklyHighlights {
    let (baby_size, organ_development, baby_abilities) = tokio::join!(
        weekly_highlight(llm, provider, HighlightKind::BabySize, ctx),
        weekly_highlight(llm, provider, HighlightKind::OrganDevelopment, ctx),
        weekly_highlight(llm, provider, HighlightKind::BabyAbilities, ctx),
    );
    WeeklyHighlights {
        week: ctx.map_or(0, PregnancyContext::week),
        baby_size,
        organ_development,
        baby_abilities,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Symptoms and facts
// ────────────────────────────────────────────────────────────────────────────

pub async fn symptoms(
    llm: &LlmClients,
    provider: Provider,
    language: Language,
    ctx: Option<&PregnancyContext>,
) -> SymptomList {
    let week = ctx.map_or(0, PregnancyContext::week);
    let Some(ctx) = PregnancyContext::active(ctx) else {
        return SymptomList {
            week,
            symptoms: Vec::new(),
            source: ContentSource::NeedsSetup,
        };
    };

    let prompt = build_symptoms_prompt(week, &ctx.data, language);
    match generate_parsed::<Vec<Symptom>>(llm, provider, "symptoms", &prompt).await {
        Some(symptoms) => SymptomList {
            week,
            symptoms,
            source: ContentSource::Generated,
        },
        None => SymptomList {
            week,
            symptoms: Vec::new(),
            source: ContentSource::Fallback,
        },
    }
}

pub async fn facts(
    llm: &LlmClients,
    provider: Provider,
    language: Language,
    count: usize,
    ctx: Option<&PregnancyContext>,
) -> FactList {
    let week = ctx.map_or(0, PregnancyContext::week);
    let Some(ctx) = PregnancyContext::active(ctx) else {
        return FactList {
            week,
            facts: Vec::new(),
            source: ContentSource::NeedsSetup,
        };
    };

    let count = count.clamp(1, MAX_FACT_COUNT);
    let prompt = build_facts_prompt(week, &ctx.data, language, count);
    let facts: Vec<String> = generate_parsed::<Vec<String>>(llm, provider, "facts", &prompt)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    if facts.is_empty() {
        return FactList {
            week,
            facts,
            source: ContentSource::Fallback,
        };
    }
    if facts.len() != count {
        debug!("facts: asked for {count}, model returned {}", facts.len());
    }
    FactList {
        week,
        facts,
        source: ContentSource::Generated,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stat details
// ────────────────────────────────────────────────────────────────────────────

fn stat_value(topic: DetailTopic, stats: &GestationStats) -> u32 {
    match topic {
        DetailTopic::WeeksAlong => stats.weeks_pregnant,
        DetailTopic::DaysToGo => stats.days_to_go,
        DetailTopic::WeeksLeft => stats.weeks_left,
    }
}

/// Plain-text explanation of one dashboard stat. A zero stat is not explained.
pub async fn stat_detail(
    llm: &LlmClients,
    provider: Provider,
    topic: DetailTopic,
    ctx: Option<&PregnancyContext>,
) -> DetailText {
    let unavailable = |source| DetailText {
        topic,
        text: UNAVAILABLE_DETAILS.to_string(),
        source,
    };
    let Some(ctx) = ctx.filter(|c| stat_value(topic, &c.stats) > 0) else {
        return unavailable(ContentSource::NeedsSetup);
    };

    let prompt = build_detail_prompt(topic, &ctx.stats, &ctx.data);
    let text = generate_text(llm, provider, topic.as_str(), &prompt)
        .await
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match text {
        Some(text) => DetailText {
            topic,
            text,
            source: ContentSource::Generated,
        },
        None => unavailable(ContentSource::Fallback),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chat
// ────────────────────────────────────────────────────────────────────────────

/// Answers a free-form question. Works without a profile; the prompt says so.
pub async fn chat(
    llm: &LlmClients,
    provider: Provider,
    question: &str,
    ctx: Option<&PregnancyContext>,
) -> ChatAnswer {
    let prompt = build_chat_prompt(question, ctx.map(|c| (&c.data, c.week())));
    let Some(raw) = generate_text(llm, provider, "chat", &prompt).await else {
        return ChatAnswer::fallback();
    };
    match parse_or_warn::<ChatReply>("chat", &raw) {
        Some(reply) => ChatAnswer::from_reply(reply, &raw),
        None => ChatAnswer::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::insights::models::{FALLBACK_EMOJI, FALLBACK_LABEL, MISSING_DETAILS};
    use crate::llm_client::testing::ScriptedBackend;
    use crate::profile::completeness::is_complete;
    use crate::profile::models::{ActivityLevel, ConceptionType, WeightCategory};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context(last_period: NaiveDate, today: NaiveDate) -> PregnancyContext {
        let data = ProfileData {
            last_period: Some(last_period),
            conception_type: Some(ConceptionType::Natural),
            age: Some(29),
            weight_category: Some(WeightCategory::Normal),
            activity_level: Some(ActivityLevel::Light),
            ..Default::default()
        };
        assert!(is_complete(&data));
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            data,
            profile_completed: true,
            created_at: now,
            updated_at: now,
        };
        PregnancyContext::from_profile(Some(profile), today).unwrap()
    }

    fn week_twenty() -> PregnancyContext {
        context(date(2025, 1, 1), date(2025, 5, 21))
    }

    fn groq(replies: &[&str]) -> (LlmClients, std::sync::Arc<ScriptedBackend>) {
        let backend = ScriptedBackend::replying(replies);
        let llm = LlmClients::default().with_backend(Provider::Groq, backend.clone());
        (llm, backend)
    }

    #[test]
    fn test_incomplete_profile_has_no_context() {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            data: ProfileData {
                last_period: Some(date(2025, 1, 1)),
                ..Default::default()
            },
            profile_completed: false,
            created_at: now,
            updated_at: now,
        };
        assert!(PregnancyContext::from_profile(Some(profile), date(2025, 3, 1)).is_none());
        assert!(PregnancyContext::from_profile(None, date(2025, 3, 1)).is_none());
    }

    #[tokio::test]
    async fn test_fenced_baby_size_reply_is_rendered() {
        let (llm, _) = groq(&[
            "```json\n{\"item\": \"mango\", \"emoji\": \"🥭\", \"details\": \"Your baby is now about 16 cm long.\"}\n```",
        ]);
        let ctx = week_twenty();
        let card = weekly_highlight(&llm, Provider::Groq, HighlightKind::BabySize, Some(&ctx)).await;
        assert_eq!(card.label, "mango");
        assert_eq!(card.emoji, "🥭");
        assert_eq!(card.source, ContentSource::Generated);
    }

    #[tokio::test]
    async fn test_refusal_falls_back_to_sentinel() {
        let (llm, _) = groq(&["I'm sorry, I can't help with that."]);
        let ctx = week_twenty();
        let card =
            weekly_highlight(&llm, Provider::Groq, HighlightKind::OrganDevelopment, Some(&ctx)).await;
        assert_eq!(card.label, FALLBACK_LABEL);
        assert_eq!(card.emoji, FALLBACK_EMOJI);
        assert_eq!(card.details, UNAVAILABLE_DETAILS);
        assert_eq!(card.source, ContentSource::Fallback);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_falls_back() {
        let llm = LlmClients::default();
        let ctx = week_twenty();
        let card = weekly_highlight(&llm, Provider::Claude, HighlightKind::BabySize, Some(&ctx)).await;
        assert_eq!(card.source, ContentSource::Fallback);
    }

    #[tokio::test]
    async fn test_week_zero_skips_generation() {
        let (llm, backend) = groq(&[]);
        let ctx = context(date(2025, 1, 1), date(2025, 1, 4));
        assert_eq!(ctx.week(), 0);
        let list = symptoms(&llm, Provider::Groq, Language::En, Some(&ctx)).await;
        assert_eq!(list.source, ContentSource::NeedsSetup);
        assert!(backend.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_weekly_highlights_each_card_independent() {
        let backend = ScriptedBackend::replying(&[
            r#"{"item": "banana", "emoji": "🍌", "details": "About 25 cm."}"#,
            "not json at all",
            r#"{"ability": "Hearing Sounds", "emoji": "👂"}"#,
        ]);
        let llm = LlmClients::default().with_backend(Provider::Groq, backend.clone());
        let ctx = week_twenty();

        let weekly = weekly_highlights(&llm, Provider::Groq, Some(&ctx)).await;
        assert_eq!(weekly.week, 20);
        assert_eq!(backend.prompts.lock().await.len(), 3);

        assert_eq!(weekly.baby_size.label, "banana");
        assert_eq!(weekly.baby_size.details, "About 25 cm.");
        assert_eq!(weekly.baby_size.source, ContentSource::Generated);

        assert_eq!(weekly.organ_development.label, FALLBACK_LABEL);
        assert_eq!(weekly.organ_development.emoji, FALLBACK_EMOJI);
        assert_eq!(weekly.organ_development.source, ContentSource::Fallback);

        assert_eq!(weekly.baby_abilities.label, "Hearing Sounds");
        assert_eq!(weekly.baby_abilities.details, MISSING_DETAILS);
        assert_eq!(weekly.baby_abilities.source, ContentSource::Generated);
    }

    #[tokio::test]
    async fn test_symptoms_with_smart_quotes_and_newlines() {
        let (llm, backend) = groq(&[
            "Here you go:\n[{\"name\": \"Baby’s Kick\", \"description\": \"Light\nflutters.\", \"isNormal\": true, \"normalityLevel\": \"very common\", \"remedies\": [\"Rest…\"]}]",
        ]);
        let ctx = week_twenty();
        let list = symptoms(&llm, Provider::Groq, Language::Pt, Some(&ctx)).await;
        assert_eq!(list.source, ContentSource::Generated);
        assert_eq!(list.symptoms[0].name, "Baby's Kick");
        assert_eq!(list.symptoms[0].description, "Light flutters.");
        assert_eq!(list.symptoms[0].remedies, vec!["Rest...".to_string()]);
        assert!(backend.prompts.lock().await[0].starts_with("Responda em PORTUGUÊS"));
    }

    #[tokio::test]
    async fn test_empty_symptom_array_is_fallback() {
        let (llm, _) = groq(&["[]"]);
        let ctx = week_twenty();
        let list = symptoms(&llm, Provider::Groq, Language::En, Some(&ctx)).await;
        assert_eq!(list.source, ContentSource::Fallback);
        assert!(list.symptoms.is_empty());
    }

    #[tokio::test]
    async fn test_facts_count_is_clamped_in_prompt() {
        let (llm, backend) = groq(&[r#"["Drink water.", "  ", "Rest often."]"#]);
        let ctx = week_twenty();
        let list = facts(&llm, Provider::Groq, Language::En, 50, Some(&ctx)).await;
        assert_eq!(list.facts, vec!["Drink water.", "Rest often."]);
        assert_eq!(list.source, ContentSource::Generated);
        assert!(backend.prompts.lock().await[0].contains("exactly 10 strings"));
    }

    #[tokio::test]
    async fn test_detail_text_is_trimmed() {
        let (llm, _) = groq(&["\n  Week 20 is the halfway point.  \n"]);
        let ctx = week_twenty();
        let detail = stat_detail(&llm, Provider::Groq, DetailTopic::WeeksAlong, Some(&ctx)).await;
        assert_eq!(detail.text, "Week 20 is the halfway point.");
        assert_eq!(detail.source, ContentSource::Generated);
    }

    #[tokio::test]
    async fn test_detail_skipped_when_past_due() {
        let (llm, backend) = groq(&[]);
        let ctx = context(date(2025, 1, 1), date(2025, 11, 1));
        let detail = stat_detail(&llm, Provider::Groq, DetailTopic::DaysToGo, Some(&ctx)).await;
        assert_eq!(detail.text, UNAVAILABLE_DETAILS);
        assert_eq!(detail.source, ContentSource::NeedsSetup);
        assert!(backend.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_detail_fallback() {
        let backend = ScriptedBackend::failing(500);
        let llm = LlmClients::default().with_backend(Provider::Groq, backend);
        let ctx = week_twenty();
        let detail = stat_detail(&llm, Provider::Groq, DetailTopic::WeeksLeft, Some(&ctx)).await;
        assert_eq!(detail.source, ContentSource::Fallback);
    }

    #[tokio::test]
    async fn test_chat_without_profile() {
        let (llm, backend) = groq(&[r#"{"summary": "Yes, in moderation.", "full": "Up to 200 mg a day."}"#]);
        let answer = chat(&llm, Provider::Groq, "Can I drink coffee?", None).await;
        assert_eq!(answer.summary, "Yes, in moderation.");
        assert_eq!(answer.full.as_deref(), Some("Up to 200 mg a day."));
        assert!(backend.prompts.lock().await[0].contains("No profile information available."));
    }

    #[tokio::test]
    async fn test_chat_unparseable_reply_apologizes() {
        let (llm, _) = groq(&["Sure! Coffee is fine."]);
        let answer = chat(&llm, Provider::Groq, "Coffee?", None).await;
        assert_eq!(answer, ChatAnswer::fallback());
    }

    #[tokio::test]
    async fn test_missing_details_placeholder_survives_service() {
        let (llm, _) = groq(&[r#"{"organ": "Lungs", "emoji": "🫁"}"#]);
        let ctx = week_twenty();
        let card =
            weekly_highlight(&llm, Provider::Groq, HighlightKind::OrganDevelopment, Some(&ctx)).await;
        assert_eq!(card.details, MISSING_DETAILS);
    }
}

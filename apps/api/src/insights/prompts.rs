// Prompt templates for dashboard insights.
// Each template carries `{placeholders}` that `fill` substitutes in a single pass.
// Reuses cross-cutting fragments from llm_client::prompts.

use chrono::NaiveDate;

use crate::insights::models::{DetailTopic, HighlightKind, Language};
use crate::llm_client::prompts::{
    JSON_ARRAY_ONLY, JSON_OBJECT_ONLY, JSON_SAFETY_RULES, PLAIN_TEXT_ONLY,
};
use crate::profile::gestation::GestationStats;
use crate::profile::models::ProfileData;

/// Profile fields that can be rendered into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    CurrentWeek,
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    PreExistingConditions,
    CurrentComplications,
    Medications,
    ConceptionType,
    ActivityLevel,
    WeightCategory,
    DietaryRestrictions,
    FoodAllergies,
    BloodType,
    WorkPhysicalDemand,
    HasExerciseRestrictions,
    ExerciseRestrictionsDetails,
    PreviousPregnancyComplications,
    SubstanceUseHistory,
}

const NOT_SPECIFIED: &str = "Not specified";
const NONE: &str = "None";

impl ProfileField {
    fn label(self) -> &'static str {
        match self {
            ProfileField::CurrentWeek => "Current week",
            ProfileField::PregnancyType => "Pregnancy type",
            ProfileField::NumberOfBabies => "Number of babies",
            ProfileField::MotherAge => "Mother's age",
            ProfileField::PreviousPregnancies => "Previous pregnancies",
            ProfileField::PreExistingConditions => "Pre-existing conditions",
            ProfileField::CurrentComplications => "Current complications",
            ProfileField::Medications => "Medications",
            ProfileField::ConceptionType => "Conception type",
            ProfileField::ActivityLevel => "Activity level",
            ProfileField::WeightCategory => "Weight category",
            ProfileField::DietaryRestrictions => "Dietary restrictions",
            ProfileField::FoodAllergies => "Food allergies",
            ProfileField::BloodType => "Blood type",
            ProfileField::WorkPhysicalDemand => "Work physical demand",
            ProfileField::HasExerciseRestrictions => "Has exercise restrictions",
            ProfileField::ExerciseRestrictionsDetails => "Exercise restrictions details",
            ProfileField::PreviousPregnancyComplications => "Previous pregnancy complications",
            ProfileField::SubstanceUseHistory => "Substance use history",
        }
    }

    /// Absent values render as a fixed placeholder, never as an empty string.
    fn value(self, data: &ProfileData, week: u32) -> String {
        match self {
            ProfileField::CurrentWeek => week.to_string(),
            ProfileField::PregnancyType => data
                .pregnancy_type
                .map_or("single", |t| t.label())
                .to_string(),
            ProfileField::NumberOfBabies => non_zero(data.number_of_babies)
                .unwrap_or(1)
                .to_string(),
            ProfileField::MotherAge => non_zero(data.age)
                .map_or_else(|| NOT_SPECIFIED.to_string(), |a| a.to_string()),
            ProfileField::PreviousPregnancies => {
                data.previous_pregnancies.unwrap_or(0).to_string()
            }
            ProfileField::PreExistingConditions => {
                join_labels(data.pre_existing_conditions.iter().map(|c| c.label()))
            }
            ProfileField::CurrentComplications => text_or_none(&data.current_complications),
            ProfileField::Medications => text_or_none(&data.medications),
            ProfileField::ConceptionType => label_or_unspecified(data.conception_type.map(|c| c.label())),
            ProfileField::ActivityLevel => label_or_unspecified(data.activity_level.map(|a| a.label())),
            ProfileField::WeightCategory => label_or_unspecified(data.weight_category.map(|w| w.label())),
            ProfileField::DietaryRestrictions => {
                join_labels(data.dietary_restrictions.iter().map(|d| d.label()))
            }
            ProfileField::FoodAllergies => text_or_none(&data.food_allergies),
            ProfileField::BloodType => label_or_unspecified(data.blood_type.map(|b| b.label())),
            ProfileField::WorkPhysicalDemand => {
                label_or_unspecified(data.work_physical_demand.map(|w| w.label()))
            }
            ProfileField::HasExerciseRestrictions => {
                let answer = if data.has_exercise_restrictions { "Yes" } else { "No" };
                answer.to_string()
            }
            ProfileField::ExerciseRestrictionsDetails => {
                text_or_none(&data.exercise_restrictions_details)
            }
            ProfileField::PreviousPregnancyComplications => {
                join_labels(data.previous_pregnancy_complications.iter().map(|c| c.label()))
            }
            ProfileField::SubstanceUseHistory => {
                join_labels(data.substance_use_history.iter().map(|s| s.label()))
            }
        }
    }
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v != 0)
}

fn text_or_none(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NONE)
        .to_string()
}

fn label_or_unspecified(label: Option<&'static str>) -> String {
    label.unwrap_or(NOT_SPECIFIED).to_string()
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let joined = labels.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        NONE.to_string()
    } else {
        joined
    }
}

/// Renders `header` followed by one `- Label: value` line per field.
pub fn render_profile_block(
    header: &str,
    data: &ProfileData,
    week: u32,
    fields: &[ProfileField],
) -> String {
    let mut block = format!("{header}:\n");
    for field in fields {
        block.push_str(&format!("- {}: {}\n", field.label(), field.value(data, week)));
    }
    block
}

fn profile_info(data: &ProfileData, week: u32, fields: &[ProfileField]) -> String {
    render_profile_block("Profile Information", data, week, fields)
}

/// Substitutes `{name}` placeholders in one left-to-right pass.
///
/// Inserted values are never rescanned, so profile text or a question that
/// happens to contain `{week}` reaches the model verbatim. Braces that do not
/// name a known placeholder (the JSON examples) are copied through.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail[1..].find('}').and_then(|close| {
            let name = &tail[1..1 + close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close + 2))
        });
        match value {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Due dates read as e.g. "October 8, 2025".
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Field sets
// ────────────────────────────────────────────────────────────────────────────

use ProfileField::*;

const BASE_FIELDS: &[ProfileField] = &[PregnancyType, NumberOfBabies, MotherAge, PreviousPregnancies];

const BABY_SIZE_FIELDS: &[ProfileField] = &[
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    PreExistingConditions,
    CurrentComplications,
];

const ORGAN_FIELDS: &[ProfileField] = &[
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    PreExistingConditions,
    CurrentComplications,
    Medications,
];

const WEEKS_ALONG_FIELDS: &[ProfileField] = &[
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    ConceptionType,
    ActivityLevel,
];

const DAYS_TO_GO_FIELDS: &[ProfileField] = &[
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    WorkPhysicalDemand,
    HasExerciseRestrictions,
];

const SYMPTOM_FIELDS: &[ProfileField] = &[
    CurrentWeek,
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    PreExistingConditions,
    CurrentComplications,
    Medications,
    ActivityLevel,
    WeightCategory,
    DietaryRestrictions,
    WorkPhysicalDemand,
    HasExerciseRestrictions,
    PreviousPregnancyComplications,
];

const FACT_FIELDS: &[ProfileField] = &[
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    PreExistingConditions,
    CurrentComplications,
    Medications,
    ActivityLevel,
    DietaryRestrictions,
    WorkPhysicalDemand,
];

const CHAT_FIELDS: &[ProfileField] = &[
    ProfileField::CurrentWeek,
    PregnancyType,
    NumberOfBabies,
    MotherAge,
    PreviousPregnancies,
    PreExistingConditions,
    CurrentComplications,
    Medications,
    ActivityLevel,
    WeightCategory,
    DietaryRestrictions,
    FoodAllergies,
    BloodType,
    WorkPhysicalDemand,
    HasExerciseRestrictions,
    ExerciseRestrictionsDetails,
    PreviousPregnancyComplications,
    SubstanceUseHistory,
    ConceptionType,
];

// ────────────────────────────────────────────────────────────────────────────
// Weekly highlight cards
// ────────────────────────────────────────────────────────────────────────────

/// Baby-size card. Placeholders: `{week}`, `{profile}`, `{json_only}`.
pub const BABY_SIZE_TEMPLATE: &str = r#"For a pregnancy at week {week} of gestation, provide information about the baby's size.

{profile}
Respond with ONLY a JSON object in this exact format:
{
  "item": "comparison object/food",
  "emoji": "appropriate emoji",
  "details": "Detailed information for parents (150-200 words). Include: current size and weight, what's happening this week, physical development milestones, what parents should know, and any relevant advice based on the profile information. Make it warm, encouraging, and informative."
}

Example: {"item": "blueberry", "emoji": "🫐", "details": "Your baby is now..."}

{json_only}"#;

/// Organ-development card. Placeholders: `{week}`, `{profile}`, `{json_only}`.
pub const ORGAN_DEVELOPMENT_TEMPLATE: &str = r#"For a pregnancy at week {week} of gestation, provide information about the major organ or body system that is developing.

{profile}
Respond with ONLY a JSON object in this exact format:
{
  "organ": "organ/system name (1-2 words)",
  "emoji": "appropriate emoji",
  "details": "Detailed information for parents (150-200 words). Include: which organ/system is developing, what's happening this week, why this development is important, what parents can do to support healthy development, and any relevant advice based on the profile information. Make it warm, encouraging, and educational."
}

Example: {"organ": "Heart", "emoji": "🫀", "details": "This week, your baby's heart..."}

{json_only}"#;

/// Baby-abilities card. Placeholders: `{week}`, `{profile}`, `{json_only}`.
pub const BABY_ABILITIES_TEMPLATE: &str = r#"For a pregnancy at week {week} of gestation, provide information about what the baby can do now.

{profile}
Respond with ONLY a JSON object in this exact format:
{
  "ability": "main ability/capability (2-3 words)",
  "emoji": "appropriate emoji",
  "details": "Detailed information for parents (150-200 words). Include: current sensory abilities (hearing, sight, touch, taste), movements and reflexes, response to external stimuli, brain development related to abilities, what parents can do to interact with baby, and any relevant advice based on the profile information. Make it warm, encouraging, and informative."
}

Example: {"ability": "Hearing Sounds", "emoji": "👂", "details": "This week, your baby can..."}

{json_only}"#;

pub fn build_highlight_prompt(kind: HighlightKind, week: u32, data: &ProfileData) -> String {
    let (template, fields) = match kind {
        HighlightKind::BabySize => (BABY_SIZE_TEMPLATE, BABY_SIZE_FIELDS),
        HighlightKind::OrganDevelopment => (ORGAN_DEVELOPMENT_TEMPLATE, ORGAN_FIELDS),
        HighlightKind::BabyAbilities => (BABY_ABILITIES_TEMPLATE, BASE_FIELDS),
    };
    fill(
        template,
        &[
            ("week", week.to_string().as_str()),
            ("profile", profile_info(data, week, fields).as_str()),
            ("json_only", JSON_OBJECT_ONLY),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Stat details
// ────────────────────────────────────────────────────────────────────────────

/// Placeholders: `{week}`, `{due_date}`, `{profile}`, `{text_only}`.
pub const WEEKS_ALONG_TEMPLATE: &str = r#"Provide detailed information for parents who are at week {week} of pregnancy, with an estimated due date of {due_date}.

{profile}
Provide warm, encouraging, and informative content (150-200 words) that includes:
- Overview of what week {week} means in the pregnancy journey
- Key milestones at this stage
- What's typical for this week
- Tips for staying healthy and comfortable
- What to expect in the coming weeks
- Any relevant advice based on the profile information

Make it personal and supportive. {text_only}"#;

/// Placeholders: `{days}`, `{due_date}`, `{profile}`, `{text_only}`.
pub const DAYS_TO_GO_TEMPLATE: &str = r#"Provide detailed information for parents who have {days} days remaining until their due date ({due_date}).

{profile}
Provide warm, encouraging, and informative content (150-200 words) that includes:
- What this countdown means
- How to prepare for the final stretch
- Important tasks and preparations to complete
- Self-care tips for the remaining time
- What to pack for the hospital
- Signs of labor to watch for
- Any relevant advice based on the profile information

Make it practical and reassuring. {text_only}"#;

/// Placeholders: `{weeks_left}`, `{due_date}`, `{profile}`, `{text_only}`.
pub const WEEKS_LEFT_TEMPLATE: &str = r#"Provide detailed information for parents who have {weeks_left} weeks remaining until their due date ({due_date}).

{profile}
Provide warm, encouraging, and informative content (150-200 words) that includes:
- What to expect in the remaining {weeks_left} weeks
- Weekly milestones ahead
- Preparing for delivery and postpartum
- Final medical appointments and tests
- Emotional preparation for parenthood
- Support system and planning
- Any relevant advice based on the profile information

Make it supportive and forward-looking. {text_only}"#;

pub fn build_detail_prompt(topic: DetailTopic, stats: &GestationStats, data: &ProfileData) -> String {
    let (template, fields) = match topic {
        DetailTopic::WeeksAlong => (WEEKS_ALONG_TEMPLATE, WEEKS_ALONG_FIELDS),
        DetailTopic::DaysToGo => (DAYS_TO_GO_TEMPLATE, DAYS_TO_GO_FIELDS),
        DetailTopic::WeeksLeft => (WEEKS_LEFT_TEMPLATE, BABY_SIZE_FIELDS),
    };
    fill(
        template,
        &[
            ("week", stats.weeks_pregnant.to_string().as_str()),
            ("days", stats.days_to_go.to_string().as_str()),
            ("weeks_left", stats.weeks_left.to_string().as_str()),
            ("due_date", format_due_date(stats.due_date).as_str()),
            ("profile", profile_info(data, stats.weeks_pregnant, fields).as_str()),
            ("text_only", PLAIN_TEXT_ONLY),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Symptoms and facts
// ────────────────────────────────────────────────────────────────────────────

/// Placeholders: `{language}`, `{week}`, `{profile}`, `{json_rules}`.
pub const SYMPTOMS_TEMPLATE: &str = r#"{language}

Based on the following pregnancy information for a woman at week {week} of pregnancy, identify the 5-7 most likely symptoms she may be experiencing right now.

{profile}
CRITICAL: Respond with ONLY valid JSON. No explanations, no markdown, no code blocks. Pure JSON array only.

{json_rules}

Each symptom object structure:
{"name":"string","description":"string","isNormal":boolean,"normalityLevel":"string","remedies":["string","string","string"]}

Example (note the simple language):
[{"name":"Morning Sickness","description":"Nausea and vomiting that occurs in the first trimester. It is caused by hormonal changes in the body.","isNormal":true,"normalityLevel":"very common","remedies":["Eat small frequent meals throughout the day.","Try drinking ginger tea to settle the stomach.","Keep crackers nearby to eat before getting up.","Stay hydrated with small sips of water.","Avoid strong smells and greasy foods."]}]

Return 5-7 symptoms as a JSON array. Consider week {week} and profile details."#;

pub fn build_symptoms_prompt(week: u32, data: &ProfileData, language: Language) -> String {
    fill(
        SYMPTOMS_TEMPLATE,
        &[
            ("language", language.instruction()),
            ("week", week.to_string().as_str()),
            ("profile", profile_info(data, week, SYMPTOM_FIELDS).as_str()),
            ("json_rules", JSON_SAFETY_RULES),
        ],
    )
}

/// Placeholders: `{language}`, `{week}`, `{count}`, `{profile}`, `{json_only}`.
pub const FACTS_TEMPLATE: &str = r#"{language}

Based on the following pregnancy information for a woman at week {week} of pregnancy, provide the {count} most relevant and important facts that she should know right now.

{profile}
Respond with ONLY a JSON array of exactly {count} strings. Each string should be a complete, standalone fact that is relevant, actionable, and helpful for this specific pregnant woman at this specific week of pregnancy. Consider her unique profile when generating these facts.

Format: ["fact 1", "fact 2", "fact 3", ...]

Example: ["Your baby's brain is developing rapidly this week - eating omega-3 rich foods like salmon can support this growth.", "At 24 weeks, your baby can hear your voice - try reading or singing to strengthen your bond.", ...]

{json_only} Each fact should be 1-2 sentences, warm, encouraging, and personalized based on the profile information."#;

pub fn build_facts_prompt(week: u32, data: &ProfileData, language: Language, count: usize) -> String {
    fill(
        FACTS_TEMPLATE,
        &[
            ("language", language.instruction()),
            ("week", week.to_string().as_str()),
            ("count", count.to_string().as_str()),
            ("profile", profile_info(data, week, FACT_FIELDS).as_str()),
            ("json_only", JSON_ARRAY_ONLY),
        ],
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Chat
// ────────────────────────────────────────────────────────────────────────────

pub const NO_PROFILE_CONTEXT: &str = "No profile information available.";

/// Placeholders: `{profile}`, `{question}`.
pub const CHAT_TEMPLATE: &str = r#"You are a knowledgeable, warm, and supportive pregnancy assistant. Answer the following question from a pregnant woman based on her profile information.

{profile}

User Question: {question}

CRITICAL: Detect the language of the user's question and respond in THE SAME LANGUAGE. If the question is in Portuguese, answer in Portuguese. If in English, answer in English. If in Spanish, answer in Spanish, etc.

Provide TWO versions of your response in the SAME LANGUAGE as the question:
1. A brief summary (1-2 sentences) - quick answer to the question
2. A detailed response (2-4 paragraphs) - comprehensive information with context, tips, and personalized advice

Be warm and supportive. If the question is about medical concerns, remind the user to consult with their healthcare provider in the detailed response.

IMPORTANT: Respond with ONLY a JSON object in this format:
{"summary":"Brief 1-2 sentence answer here IN THE USER'S LANGUAGE","full":"Detailed 2-4 paragraph response here IN THE USER'S LANGUAGE"}

No other text, no markdown, just the JSON object. Remember to use the SAME LANGUAGE as the user's question."#;

/// `profile` is `None` when the user has not finished setup.
pub fn build_chat_prompt(question: &str, profile: Option<(&ProfileData, u32)>) -> String {
    let context = match profile {
        Some((data, week)) => render_profile_block("User Profile Context", data, week, CHAT_FIELDS),
        None => NO_PROFILE_CONTEXT.to_string(),
    };
    fill(
        CHAT_TEMPLATE,
        &[("profile", context.as_str()), ("question", question.trim())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{
        ActivityLevel, DietaryRestriction, PreExistingCondition, PregnancyType, SubstanceUse,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_profile() -> ProfileData {
        ProfileData {
            pregnancy_type: Some(PregnancyType::Multiple),
            number_of_babies: Some(2),
            age: Some(34),
            pre_existing_conditions: vec![
                PreExistingCondition::Diabetes,
                PreExistingCondition::Hypertension,
            ],
            activity_level: Some(ActivityLevel::Moderate),
            dietary_restrictions: vec![DietaryRestriction::Vegetarian],
            ..Default::default()
        }
    }

    #[test]
    fn test_same_inputs_same_prompt() {
        let data = sample_profile();
        assert_eq!(
            build_symptoms_prompt(20, &data, Language::En),
            build_symptoms_prompt(20, &data, Language::En)
        );
    }

    #[test]
    fn test_empty_profile_uses_placeholders() {
        let block = profile_info(&ProfileData::default(), 8, SYMPTOM_FIELDS);
        assert!(block.contains("- Pregnancy type: single\n"));
        assert!(block.contains("- Number of babies: 1\n"));
        assert!(block.contains("- Mother's age: Not specified\n"));
        assert!(block.contains("- Previous pregnancies: 0\n"));
        assert!(block.contains("- Pre-existing conditions: None\n"));
        assert!(block.contains("- Medications: None\n"));
        assert!(block.contains("- Activity level: Not specified\n"));
        assert!(block.contains("- Has exercise restrictions: No\n"));
        assert!(!block.contains(": \n"));
    }

    #[test]
    fn test_profile_values_rendered_with_labels() {
        let block = profile_info(&sample_profile(), 20, SYMPTOM_FIELDS);
        assert!(block.contains("- Current week: 20\n"));
        assert!(block.contains("- Pregnancy type: multiple\n"));
        assert!(block.contains("- Pre-existing conditions: Diabetes, Hypertension\n"));
        assert!(block.contains("- Activity level: Moderate (3-5 days/week)\n"));
    }

    #[test]
    fn test_highlight_prompt_fills_every_placeholder() {
        for kind in [
            HighlightKind::BabySize,
            HighlightKind::OrganDevelopment,
            HighlightKind::BabyAbilities,
        ] {
            let prompt = build_highlight_prompt(kind, 24, &sample_profile());
            assert!(prompt.starts_with("For a pregnancy at week 24 of gestation"));
            assert!(!prompt.contains("{week}"));
            assert!(!prompt.contains("{profile}"));
            assert!(prompt.ends_with(JSON_OBJECT_ONLY));
        }
    }

    #[test]
    fn test_abilities_prompt_uses_short_field_set() {
        let prompt = build_highlight_prompt(HighlightKind::BabyAbilities, 24, &sample_profile());
        assert!(prompt.contains("- Previous pregnancies: 0"));
        assert!(!prompt.contains("Pre-existing conditions"));
    }

    #[test]
    fn test_detail_prompt_formats_due_date() {
        let stats = GestationStats::compute(date(2025, 1, 1), date(2025, 4, 1));
        let prompt = build_detail_prompt(DetailTopic::DaysToGo, &stats, &ProfileData::default());
        assert!(prompt.contains("190 days remaining until their due date (October 8, 2025)"));
        assert!(prompt.ends_with(PLAIN_TEXT_ONLY));
    }

    #[test]
    fn test_symptoms_prompt_language_instruction() {
        let prompt = build_symptoms_prompt(12, &ProfileData::default(), Language::Pt);
        assert!(prompt.starts_with("Responda em PORTUGUÊS BRASILEIRO."));
        assert!(prompt.contains(JSON_SAFETY_RULES));
    }

    #[test]
    fn test_facts_prompt_count() {
        let prompt = build_facts_prompt(30, &ProfileData::default(), Language::En, 3);
        assert!(prompt.contains("provide the 3 most relevant"));
        assert!(prompt.contains("JSON array of exactly 3 strings"));
    }

    #[test]
    fn test_chat_prompt_without_profile() {
        let prompt = build_chat_prompt("  Can I drink coffee?  ", None);
        assert!(prompt.contains(NO_PROFILE_CONTEXT));
        assert!(prompt.contains("User Question: Can I drink coffee?\n"));
    }

    #[test]
    fn test_chat_prompt_question_is_not_reinterpolated() {
        let prompt = build_chat_prompt("what is {profile}?", Some((&sample_profile(), 20)));
        assert!(prompt.contains("User Question: what is {profile}?"));
        assert!(prompt.contains("User Profile Context:\n- Current week: 20\n"));
    }

    #[test]
    fn test_fill_leaves_unknown_braces_alone() {
        let out = fill(r#"{"a": {n}} {missing} {"#, &[("n", "1")]);
        assert_eq!(out, r#"{"a": 1} {missing} {"#);
    }

    #[test]
    fn test_profile_text_is_not_reexpanded() {
        let data = ProfileData {
            medications: Some("{json_rules} and {week}".to_string()),
            ..Default::default()
        };
        let prompt = build_symptoms_prompt(20, &data, Language::En);
        assert!(prompt.contains("- Medications: {json_rules} and {week}\n"));
        assert_eq!(prompt.matches(JSON_SAFETY_RULES).count(), 1);
    }

    #[test]
    fn test_chat_profile_with_question_placeholder_stays_literal() {
        let data = ProfileData {
            food_allergies: Some("{question}".to_string()),
            ..Default::default()
        };
        let prompt = build_chat_prompt("Is fish safe?", Some((&data, 20)));
        assert!(prompt.contains("- Food allergies: {question}\n"));
        assert_eq!(prompt.matches("Is fish safe?").count(), 1);
    }

    #[test]
    fn test_chat_prompt_includes_substance_use_history() {
        let data = ProfileData {
            substance_use_history: vec![SubstanceUse::Smoking, SubstanceUse::Alcohol],
            ..Default::default()
        };
        let prompt = build_chat_prompt("Is fish safe?", Some((&data, 20)));
        assert!(prompt.contains("- Substance use history: Smoking, Alcohol\n"));

        let empty = build_chat_prompt("Is fish safe?", Some((&ProfileData::default(), 20)));
        assert!(empty.contains("- Substance use history: None\n"));
    }
}

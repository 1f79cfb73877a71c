// Shared prompt fragments.
// Use-case templates live in insights/prompts.rs; this file holds the
// cross-cutting output-format instructions they append.

/// Rules that keep model output parseable as strict JSON.
pub const JSON_SAFETY_RULES: &str = "\
IMPORTANT JSON RULES:
- Use straight double quotes (\") for all strings, never use apostrophes or smart quotes
- Avoid contractions (use \"it is\" not \"it's\", \"do not\" not \"don't\")
- Avoid possessives when possible (use \"of the baby\" not \"baby's\")
- Keep sentences simple and direct
- No special characters or emojis";

/// Closing line for prompts that expect a single JSON object.
pub const JSON_OBJECT_ONLY: &str = "Do not include any other text outside the JSON object.";

/// Closing line for prompts that expect a JSON array.
pub const JSON_ARRAY_ONLY: &str = "Do not include any other text outside the JSON array.";

/// Closing line for prompts that expect prose.
pub const PLAIN_TEXT_ONLY: &str = "Respond with ONLY the detailed text, no JSON.";

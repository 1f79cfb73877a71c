//! Response sanitizer: best-effort structured extraction from free-form model text.
//!
//! Models are asked for pure JSON but often wrap it in code fences, add prose
//! around it, use typographic quotes, or leave raw newlines inside strings.
//! `parse_model_output` cleans the text in a fixed order and parses it into an
//! `Envelope`. Failures are typed so callers can log them before substituting
//! their fallback value; they are never meant to reach the HTTP layer.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// The outer JSON shape a call site expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            JsonShape::Object => value.is_object(),
            JsonShape::Array => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            JsonShape::Object => "object",
            JsonShape::Array => "array",
        }
    }
}

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("model output is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("expected a JSON {expected}, got {found}")]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("model output is missing required fields: {0}")]
    MissingFields(#[source] serde_json::Error),

    #[error("model output failed validation: {0}")]
    Invalid(String),
}

/// A structured value the model is asked to produce.
pub trait Envelope: DeserializeOwned {
    const SHAPE: JsonShape;

    /// Extra checks beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Arrays must be non-empty to count as a usable answer.
impl<T: DeserializeOwned> Envelope for Vec<T> {
    const SHAPE: JsonShape = JsonShape::Array;

    fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            Err("array is empty".to_string())
        } else {
            Ok(())
        }
    }
}

/// Runs the cleanup steps and returns the text that will be handed to the JSON parser.
pub fn clean_model_output(raw: &str, shape: JsonShape) -> String {
    let unfenced = strip_code_fences(raw.trim());
    let sliced = slice_to_delimiters(&unfenced, shape);
    normalize_typography(sliced)
}

/// Cleans `raw` and parses it into `T`, enforcing `T::SHAPE` and `T::validate`.
pub fn parse_model_output<T: Envelope>(raw: &str) -> Result<T, SanitizeError> {
    let cleaned = clean_model_output(raw, T::SHAPE);
    let value: Value = serde_json::from_str(&cleaned).map_err(SanitizeError::Syntax)?;

    if !T::SHAPE.matches(&value) {
        return Err(SanitizeError::WrongShape {
            expected: T::SHAPE.name(),
            found: value_kind(&value),
        });
    }

    let parsed: T = serde_json::from_value(value).map_err(SanitizeError::MissingFields)?;
    parsed.validate().map_err(SanitizeError::Invalid)?;
    Ok(parsed)
}

/// First `max_chars` characters of `raw`, for log lines.
pub fn excerpt(raw: &str, max_chars: usize) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

/// Removes every ```` ``` ```` and ```` ```json ```` marker plus the whitespace after it.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        rest = rest.strip_prefix("json").unwrap_or(rest);
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out
}

/// Narrows `text` to the span from the first opening to the last closing delimiter.
/// Text without a usable span is returned unchanged.
fn slice_to_delimiters(text: &str, shape: JsonShape) -> &str {
    let (open, close) = shape.delimiters();
    match (text.find(open), text.rfind(close)) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Replaces typographic glyphs and raw line breaks, then collapses whitespace runs.
fn normalize_typography(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        let replacement = match c {
            '\u{201C}' | '\u{201D}' => "\"",
            '\u{2018}' | '\u{2019}' => "'",
            '\u{2026}' => "...",
            '\n' | '\r' => " ",
            _ => "",
        };
        let is_space = replacement == " " || (replacement.is_empty() && c.is_whitespace());
        if is_space {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if replacement.is_empty() {
            out.push(c);
        } else {
            out.push_str(replacement);
        }
    }
    out
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct SizeCard {
        item: String,
        emoji: String,
    }

    impl Envelope for SizeCard {
        const SHAPE: JsonShape = JsonShape::Object;
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Named {
        name: String,
        emoji: String,
    }

    impl Envelope for Named {
        const SHAPE: JsonShape = JsonShape::Object;
    }

    #[test]
    fn test_extracts_fenced_object_surrounded_by_prose() {
        let raw = "Sure! ```json\n{\"item\":\"mango\",\"emoji\":\"🥭\"}\n``` Hope that helps.";
        let card: SizeCard = parse_model_output(raw).unwrap();
        assert_eq!(
            card,
            SizeCard {
                item: "mango".to_string(),
                emoji: "🥭".to_string()
            }
        );
    }

    #[test]
    fn test_plain_fence_without_language_tag() {
        let raw = "```\n{\"item\": \"lime\", \"emoji\": \"🍋\"}\n```";
        let card: SizeCard = parse_model_output(raw).unwrap();
        assert_eq!(card.item, "lime");
    }

    #[test]
    fn test_smart_quotes_become_straight_quotes() {
        let raw = "{\"name\":\"Baby\u{2019}s Kick\",\"emoji\":\"👣\"}";
        let named: Named = parse_model_output(raw).unwrap();
        assert_eq!(named.name, "Baby's Kick");
    }

    #[test]
    fn test_smart_double_quotes_delimit_keys() {
        let raw = "{\u{201C}name\u{201D}: \u{201C}Heartburn\u{201D}, \"emoji\": \"🔥\"}";
        let named: Named = parse_model_output(raw).unwrap();
        assert_eq!(named.name, "Heartburn");
    }

    #[test]
    fn test_raw_newlines_inside_strings_are_collapsed() {
        let raw = "{\"item\": \"avocado\",\n\"emoji\": \"🥑\",\n\"details\": \"Your baby is growing.\nThe ears are\r\n   moving into place.\"}";
        let value: Value = serde_json::from_str(&clean_model_output(raw, JsonShape::Object)).unwrap();
        assert_eq!(
            value["details"],
            "Your baby is growing. The ears are moving into place."
        );
    }

    #[test]
    fn test_ellipsis_is_expanded() {
        let cleaned = clean_model_output("{\"item\": \"wait\u{2026}\"}", JsonShape::Object);
        assert_eq!(cleaned, "{\"item\": \"wait...\"}");
    }

    #[test]
    fn test_refusal_without_delimiters_is_a_syntax_error() {
        let raw = "I'm sorry, I can't provide medical advice.";
        let err = parse_model_output::<SizeCard>(raw).unwrap_err();
        assert!(matches!(err, SanitizeError::Syntax(_)));
    }

    #[test]
    fn test_missing_required_key_fails() {
        let err = parse_model_output::<SizeCard>(r#"{"item": "pea"}"#).unwrap_err();
        assert!(matches!(err, SanitizeError::MissingFields(_)));
    }

    #[test]
    fn test_array_expected_but_object_found() {
        let err = parse_model_output::<Vec<Named>>(r#"{"name": "x", "emoji": "y"}"#).unwrap_err();
        // no '[' present, so the object passes through and fails the shape check
        assert!(matches!(
            err,
            SanitizeError::WrongShape {
                expected: "array",
                found: "object"
            }
        ));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        let err = parse_model_output::<Vec<Named>>("Here you go: []").unwrap_err();
        assert!(matches!(err, SanitizeError::Invalid(_)));
    }

    #[test]
    fn test_array_slice_ignores_trailing_prose() {
        let raw = "Symptoms below:\n```json\n[{\"name\": \"Fatigue\", \"emoji\": \"😴\"}]\n```\nTake care!";
        let items: Vec<Named> = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Fatigue");
    }

    #[test]
    fn test_closing_before_opening_passes_text_through() {
        let text = "} oops {";
        assert_eq!(slice_to_delimiters(text, JsonShape::Object), text);
    }

    #[test]
    fn test_strip_code_fences_removes_every_marker() {
        assert_eq!(strip_code_fences("a```json  b```c"), "abc");
        assert_eq!(strip_code_fences("no fences"), "no fences");
    }

    #[test]
    fn test_whitespace_runs_collapse_to_single_space() {
        assert_eq!(normalize_typography("a \t\t b\n\n\nc"), "a b c");
    }

    #[test]
    fn test_reparsing_serialized_output_is_stable() {
        let raw = "Sure!\n```json\n{\u{201C}name\u{201D}: \"Baby\u{2019}s\nKick\", \"emoji\": \"👣\"}\n```";
        let first: Named = parse_model_output(raw).unwrap();
        let reserialized = serde_json::to_string(&first).unwrap();
        let second: Named = parse_model_output(&reserialized).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("🥭🥭🥭", 2), "🥭🥭…");
        assert_eq!(excerpt("short", 10), "short");
    }
}

use crate::error::LegmarkError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

const MARYLAND_BILLS_JSON: &str = include_str!("../../../../questions/maryland-bills.json");

/// Built-in question sets.
pub const PRESETS: &[&str] = &["maryland"];

/// Expected JSON type of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Text,
    Boolean,
    Integer,
    Number,
}

impl AnswerKind {
    fn json_type(&self) -> &'static str {
        match self {
            AnswerKind::Text => "string",
            AnswerKind::Boolean => "boolean",
            AnswerKind::Integer => "integer",
            AnswerKind::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub key: String,
    pub prompt: String,
    pub kind: AnswerKind,
}

/// Versioned, ordered list of questions asked about every bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Completes "markdown generated from the text of ..." in the system prompt.
    #[serde(default = "default_context")]
    pub context: String,
    pub questions: Vec<Question>,
}

fn default_context() -> String {
    "a legislative bill".into()
}

/// Load a built-in question set by name.
pub fn load_preset(name: &str) -> Result<QuestionSet, LegmarkError> {
    match name {
        "maryland" => parse_question_set_str(MARYLAND_BILLS_JSON),
        _ => Err(LegmarkError::QuestionSetInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

/// Load a question set from a JSON file.
pub fn load_question_set(path: &Path) -> Result<QuestionSet, LegmarkError> {
    let content = std::fs::read_to_string(path).map_err(|e| LegmarkError::QuestionSetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let set: QuestionSet =
        serde_json::from_str(&content).map_err(|e| LegmarkError::QuestionSetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_question_set(&set)?;
    Ok(set)
}

/// Parse a question set from a JSON string (no file path context).
pub fn parse_question_set_str(json: &str) -> Result<QuestionSet, LegmarkError> {
    let set: QuestionSet = serde_json::from_str(json)?;
    validate_question_set(&set)?;
    Ok(set)
}

/// Validate that a question set is well-formed.
pub fn validate_question_set(set: &QuestionSet) -> Result<(), LegmarkError> {
    if set.questions.is_empty() {
        return Err(LegmarkError::QuestionSetInvalid(
            "questions must not be empty".into(),
        ));
    }

    let mut seen = BTreeSet::new();
    for q in &set.questions {
        if q.key.is_empty() || !q.key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(LegmarkError::QuestionSetInvalid(format!(
                "question key '{}' must be non-empty and contain only letters, digits and '_'",
                q.key
            )));
        }
        if q.prompt.trim().is_empty() {
            return Err(LegmarkError::QuestionSetInvalid(format!(
                "question '{}' has an empty prompt",
                q.key
            )));
        }
        if !seen.insert(q.key.as_str()) {
            return Err(LegmarkError::QuestionSetInvalid(format!(
                "duplicate question key '{}'",
                q.key
            )));
        }
    }

    Ok(())
}

/// System prompt listing every question as `- key: prompt`.
pub fn system_prompt(set: &QuestionSet) -> String {
    let listing = set
        .questions
        .iter()
        .map(|q| format!("- {}: {}", q.key, q.prompt))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are reading markdown generated from the text of {}. \
         Please note that the strikethrough syntax (~~) means a word or section should be ignored. \
         Your goal is to read the markdown carefully, and then answer the following questions:\n\
         {}\n\
         Please respond with only valid JSON in the specified format.",
        set.context, listing
    )
}

/// JSON schema of the expected answer object, for structured-output APIs.
pub fn answer_schema(set: &QuestionSet) -> Value {
    let properties: Map<String, Value> = set
        .questions
        .iter()
        .map(|q| (q.key.clone(), json!({ "type": q.kind.json_type() })))
        .collect();
    let required: Vec<&str> = set.questions.iter().map(|q| q.key.as_str()).collect();
    json!({
        "title": "AnswersToQuestions",
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// A validated answer, serialized as the bare JSON value. Write-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Boolean(bool),
    Integer(i64),
    Number(Decimal),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub key: String,
    pub value: AnswerValue,
}

/// Typed answers, in question order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Answers {
    pub answers: Vec<Answer>,
}

impl Answers {
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.iter().find(|a| a.key == key).map(|a| &a.value)
    }
}

/// Decode a model response and check it against the question set.
///
/// Every question must be answered with a value of its kind. Numbers are kept
/// exact; integral floats are accepted for integer questions and numeric
/// strings for number questions. Extra keys are ignored.
pub fn parse_answers(set: &QuestionSet, raw: &str) -> Result<Answers, LegmarkError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let Value::Object(object) = value else {
        return Err(LegmarkError::AnswerInvalid(
            "response is not a JSON object".into(),
        ));
    };

    let mut answers = Vec::with_capacity(set.questions.len());
    for q in &set.questions {
        let raw_value = object
            .get(&q.key)
            .ok_or_else(|| LegmarkError::AnswerInvalid(format!("missing answer for '{}'", q.key)))?;
        let value = coerce(q, raw_value)?;
        answers.push(Answer {
            key: q.key.clone(),
            value,
        });
    }

    Ok(Answers { answers })
}

fn coerce(q: &Question, value: &Value) -> Result<AnswerValue, LegmarkError> {
    let coerced = match (q.kind, value) {
        (AnswerKind::Text, Value::String(s)) => Some(AnswerValue::Text(s.clone())),
        (AnswerKind::Boolean, Value::Bool(b)) => Some(AnswerValue::Boolean(*b)),
        (AnswerKind::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Some(AnswerValue::Boolean(true)),
            "false" => Some(AnswerValue::Boolean(false)),
            _ => None,
        },
        (AnswerKind::Integer, Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(AnswerValue::Integer),
        (AnswerKind::Number, Value::Number(n)) => parse_decimal(&n.to_string()).map(AnswerValue::Number),
        (AnswerKind::Number, Value::String(s)) => {
            parse_decimal(&s.replace([',', '$'], "")).map(AnswerValue::Number)
        }
        _ => None,
    };

    coerced.ok_or_else(|| {
        LegmarkError::AnswerInvalid(format!(
            "answer for '{}' is not a valid {}: {}",
            q.key,
            q.kind.json_type(),
            value
        ))
    })
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Strip a surrounding ``` or ```json fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn small_set() -> QuestionSet {
        parse_question_set_str(
            r#"{
                "name": "test",
                "version": "1",
                "questions": [
                    {"key": "summary", "prompt": "Summarise.", "kind": "text"},
                    {"key": "programmatic", "prompt": "Program?", "kind": "boolean"},
                    {"key": "start_year", "prompt": "Start?", "kind": "integer"},
                    {"key": "funding", "prompt": "Funding?", "kind": "number"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_load_maryland_preset() {
        let set = load_preset("maryland").unwrap();
        assert_eq!(set.questions.len(), 11);
        assert_eq!(set.questions[0].key, "bill_summary");
        assert_eq!(set.questions[4].kind, AnswerKind::Number);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("delaware").is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = parse_question_set_str(
            r#"{"name": "x", "version": "1", "questions": [
                {"key": "a", "prompt": "p", "kind": "text"},
                {"key": "a", "prompt": "q", "kind": "text"}
            ]}"#,
        );
        assert!(matches!(result, Err(LegmarkError::QuestionSetInvalid(_))));
    }

    #[test]
    fn test_bad_key_rejected() {
        let result = parse_question_set_str(
            r#"{"name": "x", "version": "1", "questions": [
                {"key": "has space", "prompt": "p", "kind": "text"}
            ]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_system_prompt_lists_questions_in_order() {
        let prompt = system_prompt(&small_set());
        assert!(prompt.starts_with("You are reading markdown generated from the text of a legislative bill."));
        assert!(prompt.contains("strikethrough syntax (~~)"));
        let summary = prompt.find("- summary: Summarise.").unwrap();
        let funding = prompt.find("- funding: Funding?").unwrap();
        assert!(summary < funding);
        assert!(prompt.ends_with("Please respond with only valid JSON in the specified format."));
    }

    #[test]
    fn test_maryland_prompt_context() {
        let prompt = system_prompt(&load_preset("maryland").unwrap());
        assert!(prompt.contains("a bill passed by the Maryland General Assembly"));
    }

    #[test]
    fn test_answer_schema() {
        let schema = answer_schema(&small_set());
        assert_eq!(schema["properties"]["programmatic"]["type"], "boolean");
        assert_eq!(schema["properties"]["start_year"]["type"], "integer");
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_parse_answers_typed() {
        let answers = parse_answers(
            &small_set(),
            r#"{"summary": "Creates a grant.", "programmatic": true, "start_year": 2026.0, "funding": 1500000.50, "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(answers.answers.len(), 4);
        assert_eq!(
            answers.get("summary"),
            Some(&AnswerValue::Text("Creates a grant.".into()))
        );
        assert_eq!(answers.get("programmatic"), Some(&AnswerValue::Boolean(true)));
        assert_eq!(answers.get("start_year"), Some(&AnswerValue::Integer(2026)));
        assert_eq!(answers.get("funding"), Some(&AnswerValue::Number(dec!(1500000.5))));
        assert!(answers.get("extra").is_none());
    }

    #[test]
    fn test_parse_answers_lenient_strings_and_fence() {
        let answers = parse_answers(
            &small_set(),
            "```json\n{\"summary\": \"s\", \"programmatic\": \"False\", \"start_year\": 2025, \"funding\": \"$1,000,000\"}\n```",
        )
        .unwrap();
        assert_eq!(answers.get("programmatic"), Some(&AnswerValue::Boolean(false)));
        assert_eq!(answers.get("funding"), Some(&AnswerValue::Number(dec!(1000000))));
    }

    #[test]
    fn test_numeric_text_answer_stays_text() {
        let answers = parse_answers(
            &small_set(),
            r#"{"summary": "2025", "programmatic": false, "start_year": 2025, "funding": 0}"#,
        )
        .unwrap();
        assert_eq!(answers.get("summary"), Some(&AnswerValue::Text("2025".into())));
        let json = serde_json::to_value(&answers).unwrap();
        assert_eq!(json["answers"][0]["value"], "2025");
        assert_eq!(json["answers"][2]["value"], 2025);
    }

    #[test]
    fn test_parse_answers_missing_or_wrong_type() {
        let set = small_set();
        let missing = parse_answers(&set, r#"{"summary": "s"}"#);
        assert!(matches!(missing, Err(LegmarkError::AnswerInvalid(_))));

        let wrong = parse_answers(
            &set,
            r#"{"summary": "s", "programmatic": true, "start_year": 2025.5, "funding": 1}"#,
        );
        assert!(matches!(wrong, Err(LegmarkError::AnswerInvalid(_))));

        assert!(matches!(
            parse_answers(&set, "[1, 2]"),
            Err(LegmarkError::AnswerInvalid(_))
        ));
        assert!(matches!(
            parse_answers(&set, "not json"),
            Err(LegmarkError::Json(_))
        ));
    }
}

use super::questions::{parse_answers, system_prompt, Answers, QuestionSet};
use super::retry::RetryPolicy;
use super::CollaboratorError;
use std::path::{Path, PathBuf};

/// A model that answers a system prompt about a markdown document.
pub trait QuestionAnswerer: Send + Sync {
    /// Return the raw JSON answer text.
    fn answer(&self, system_prompt: &str, document: &str) -> Result<String, CollaboratorError>;
}

/// Ask every question in `set` about `document`.
///
/// Responses that fail validation count as malformed and are retried like
/// transport errors. Returns `None` once the policy gives up.
pub fn ask(
    answerer: &dyn QuestionAnswerer,
    set: &QuestionSet,
    document: &str,
    policy: &RetryPolicy,
) -> Option<Answers> {
    let prompt = system_prompt(set);
    policy.run(|| {
        let raw = answerer.answer(&prompt, document)?;
        parse_answers(set, &raw).map_err(|e| CollaboratorError::Malformed(e.to_string()))
    })
}

/// Markdown to read for a bill: `<BILL>_amended.md` when present, else `<BILL>.md`.
pub fn select_bill_markdown(md_dir: &Path, bill_number: &str) -> Option<PathBuf> {
    let amended = md_dir.join(format!("{bill_number}_amended.md"));
    if amended.is_file() {
        return Some(amended);
    }
    let plain = md_dir.join(format!("{bill_number}.md"));
    plain.is_file().then_some(plain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::questions::{parse_question_set_str, AnswerValue};
    use std::sync::Mutex;
    use std::time::Duration;

    struct Scripted {
        responses: Mutex<Vec<Result<String, CollaboratorError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<String, CollaboratorError>>) -> Self {
            responses.reverse();
            Scripted {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl QuestionAnswerer for Scripted {
        fn answer(&self, system_prompt: &str, _document: &str) -> Result<String, CollaboratorError> {
            self.prompts.lock().unwrap().push(system_prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(CollaboratorError::Fatal("script exhausted".into())))
        }
    }

    fn set() -> QuestionSet {
        parse_question_set_str(
            r#"{"name": "t", "version": "1", "questions": [
                {"key": "appropriation", "prompt": "Is there funding?", "kind": "boolean"}
            ]}"#,
        )
        .unwrap()
    }

    fn quick() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
            factor: 2.0,
        }
    }

    #[test]
    fn test_ask_retries_invalid_json() {
        let answerer = Scripted::new(vec![
            Ok("I think yes".into()),
            Ok(r#"{"appropriation": true}"#.into()),
        ]);
        let answers = ask(&answerer, &set(), "# Bill", &quick()).unwrap();
        assert_eq!(answers.get("appropriation"), Some(&AnswerValue::Boolean(true)));
        let prompts = answerer.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("- appropriation: Is there funding?"));
    }

    #[test]
    fn test_ask_gives_up_on_fatal() {
        let answerer = Scripted::new(vec![Err(CollaboratorError::Fatal("401".into()))]);
        assert!(ask(&answerer, &set(), "# Bill", &quick()).is_none());
        assert_eq!(answerer.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_select_prefers_amended() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("HB0001.md"), "bill").unwrap();
        assert_eq!(
            select_bill_markdown(dir.path(), "HB0001"),
            Some(dir.path().join("HB0001.md"))
        );

        std::fs::write(dir.path().join("HB0001_amended.md"), "amended").unwrap();
        assert_eq!(
            select_bill_markdown(dir.path(), "HB0001"),
            Some(dir.path().join("HB0001_amended.md"))
        );

        assert_eq!(select_bill_markdown(dir.path(), "SB0009"), None);
    }
}

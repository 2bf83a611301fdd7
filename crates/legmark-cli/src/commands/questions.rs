use legmark_core::error::LegmarkError;
use legmark_core::services::questions::{self, AnswerValue};
use std::path::Path;

use crate::output;

pub fn list() -> Result<(), LegmarkError> {
    println!("Available question sets:\n");
    for name in questions::PRESETS {
        let set = questions::load_preset(name)?;
        println!("  {:<10} {} (v{}, {} questions)", name, set.name, set.version, set.questions.len());
        if let Some(ref desc) = set.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), LegmarkError> {
    let set = questions::load_preset(preset)?;
    println!("{} (version {})\n", set.name, set.version);
    if let Some(ref desc) = set.description {
        println!("{}\n", desc);
    }

    let max_key = set.questions.iter().map(|q| q.key.len()).max().unwrap_or(10);
    for q in &set.questions {
        let kind = serde_json::to_value(q.kind)?;
        println!(
            "  {:<width$}  {:<8}  {}",
            q.key,
            kind.as_str().unwrap_or(""),
            q.prompt,
            width = max_key
        );
    }
    println!();
    Ok(())
}

pub fn schema(preset: &str) -> Result<(), LegmarkError> {
    let set = questions::load_preset(preset)?;
    output::json::print(&questions::answer_schema(&set))
}

pub fn prompt(preset: &str) -> Result<(), LegmarkError> {
    let set = questions::load_preset(preset)?;
    println!("{}", questions::system_prompt(&set));
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), LegmarkError> {
    let set = questions::load_question_set(file)?;
    println!("Question set '{}' (v{}) is valid.", set.name, set.version);
    println!("  Questions: {}", set.questions.len());
    Ok(())
}

pub fn check(answer_file: &Path, preset: &str) -> Result<(), LegmarkError> {
    let set = questions::load_preset(preset)?;
    let raw = std::fs::read_to_string(answer_file)?;
    let answers = questions::parse_answers(&set, &raw)?;

    println!("Answers match '{}' (v{}):\n", set.name, set.version);
    let max_key = answers.answers.iter().map(|a| a.key.len()).max().unwrap_or(10);
    for a in &answers.answers {
        let value = match &a.value {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Boolean(b) => b.to_string(),
            AnswerValue::Integer(i) => i.to_string(),
            AnswerValue::Number(d) => d.to_string(),
        };
        println!("  {:<width$}  {}", a.key, value, width = max_key);
    }
    Ok(())
}

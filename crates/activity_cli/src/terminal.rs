//! Line-oriented `InputCollector` over stdin/stdout.
//!
//! Each prompt field is asked on its own line. An empty answer keeps the
//! pre-filled value; a lone `.` cancels the dialog.

use activity_core::{
    ConfirmRequest, FieldKind, FieldValue, FieldValues, InputCollector, PromptOutcome,
    PromptRequest,
};
use async_trait::async_trait;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

const CANCEL_INPUT: &str = ".";

pub struct TerminalCollector {
    input: Mutex<BufReader<Stdin>>,
    assume_yes: bool,
}

impl TerminalCollector {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            input: Mutex::new(BufReader::new(stdin())),
            assume_yes,
        }
    }

    /// Prints `label` and reads one line without its line ending; `None` on
    /// end of input.
    async fn ask(&self, label: &str) -> Option<String> {
        let mut out = stdout();
        out.write_all(label.as_bytes()).await.ok()?;
        out.flush().await.ok()?;

        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await.ok()?;
        if read == 0 {
            return None;
        }
        Some(strip_line_ending(&line).to_string())
    }
}

#[async_trait]
impl InputCollector for TerminalCollector {
    async fn prompt(&self, request: PromptRequest) -> PromptOutcome {
        let Some(action) = request.submit_label().map(str::to_string) else {
            return PromptOutcome::Cancelled;
        };
        println!("{} (enter {CANCEL_INPUT} to cancel)", request.header);

        let mut values = FieldValues::new();
        for field in &request.fields {
            let current = field.value.as_ref().map(FieldValue::as_text);
            let label = match (&field.placeholder, &current) {
                (Some(hint), Some(value)) => format!("{hint} [{value}]: "),
                (Some(hint), None) => format!("{hint}: "),
                (None, Some(value)) => format!("{} [{value}]: ", field.name),
                (None, None) => format!("{}: ", field.name),
            };

            let Some(answer) = self.ask(&label).await else {
                return PromptOutcome::Cancelled;
            };
            if answer.trim() == CANCEL_INPUT {
                return PromptOutcome::Cancelled;
            }
            let answer = field_answer(field.kind, answer);

            let value = match (answer.is_empty(), &field.value) {
                (true, Some(prefilled)) => prefilled.clone(),
                _ => typed_value(field.kind, answer),
            };
            values.insert(field.name.clone(), value);
        }

        PromptOutcome::Submitted { action, values }
    }

    async fn confirm(&self, request: ConfirmRequest) -> bool {
        println!("{}", request.header);
        if self.assume_yes {
            println!("{} {}", request.message, request.confirm_label);
            return true;
        }
        let label = format!(
            "{} [{}/{}]: ",
            request.message, request.confirm_label, request.cancel_label
        );
        match self.ask(&label).await {
            Some(answer) => is_affirmative(&answer, &request.confirm_label),
            None => false,
        }
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}

/// Text answers are kept as typed; numbers and dates ignore padding.
fn field_answer(kind: FieldKind, answer: String) -> String {
    match kind {
        FieldKind::Text => answer,
        FieldKind::Number | FieldKind::Date => answer.trim().to_string(),
    }
}

fn typed_value(kind: FieldKind, answer: String) -> FieldValue {
    match kind {
        FieldKind::Number => match answer.parse::<f64>() {
            Ok(number) => FieldValue::Number(number),
            Err(_) => FieldValue::Text(answer),
        },
        FieldKind::Text | FieldKind::Date => FieldValue::Text(answer),
    }
}

fn is_affirmative(answer: &str, confirm_label: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || answer.eq_ignore_ascii_case(confirm_label)
}

#[cfg(test)]
mod tests {
    use super::{field_answer, is_affirmative, strip_line_ending, typed_value};
    use activity_core::{FieldKind, FieldValue};

    #[test]
    fn numeric_answers_become_numbers() {
        assert_eq!(
            typed_value(FieldKind::Number, "12.5".to_string()),
            FieldValue::Number(12.5)
        );
        assert_eq!(
            typed_value(FieldKind::Number, "12,5".to_string()),
            FieldValue::Text("12,5".to_string())
        );
        assert_eq!(
            typed_value(FieldKind::Date, "2024-01-01".to_string()),
            FieldValue::Text("2024-01-01".to_string())
        );
    }

    #[test]
    fn confirmation_accepts_yes_or_the_action_label() {
        assert!(is_affirmative("Y", "Delete"));
        assert!(is_affirmative("delete", "Delete"));
        assert!(!is_affirmative("", "Delete"));
        assert!(!is_affirmative("no", "Delete"));
    }

    #[test]
    fn text_answers_keep_surrounding_spaces() {
        assert_eq!(strip_line_ending(" Trail run \r\n"), " Trail run ");
        assert_eq!(strip_line_ending("Yoga\n"), "Yoga");
        assert_eq!(strip_line_ending("Yoga"), "Yoga");
        assert_eq!(
            field_answer(FieldKind::Text, " Trail run ".to_string()),
            " Trail run "
        );
        assert_eq!(
            field_answer(FieldKind::Number, " 30 ".to_string()),
            "30"
        );
        assert_eq!(
            field_answer(FieldKind::Date, " 2024-01-01\t".to_string()),
            "2024-01-01"
        );
    }
}

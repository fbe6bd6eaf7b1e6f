//! Attempt feedback: pluralized count messages in a fixed order.

use crate::util::{fill_template, format_score};

pub const CORRECTLY_PLACED_SINGULAR: &str = "Correctly placed {count} item.";
pub const CORRECTLY_PLACED_PLURAL: &str = "Correctly placed {count} items.";
pub const MISPLACED_SINGULAR: &str = "Misplaced {count} item.";
pub const MISPLACED_PLURAL: &str = "Misplaced {count} items.";
pub const NOT_PLACED_SINGULAR: &str = "Not placed {count} required item.";
pub const NOT_PLACED_PLURAL: &str = "Not placed {count} required items.";
pub const MISPLACED_ITEMS_RETURNED: &str = "Misplaced items were returned to item bank.";
pub const FINAL_ATTEMPT: &str = "Final attempt was used, final score is {score}";

/// Singular form for exactly one, plural otherwise (zero included).
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    let tpl = if count == 1 { singular } else { plural };
    fill_template(tpl, &[("count", &count.to_string())])
}

/// Inputs for one attempt's feedback.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptSummary<'a> {
    pub correct: usize,
    pub misplaced: usize,
    pub missing: usize,
    /// Whether the learner may submit again after this attempt.
    pub attempts_remain: bool,
    /// Problem-level `finish` text, shown when nothing is misplaced or missing.
    pub finish: &'a str,
    /// Grade at submission time, before misplaced items are returned.
    pub grade: f64,
}

/// Messages in display order.
pub fn compose(summary: &AttemptSummary<'_>) -> Vec<String> {
    let mut msgs = vec![
        pluralize(summary.correct, CORRECTLY_PLACED_SINGULAR, CORRECTLY_PLACED_PLURAL),
        pluralize(summary.misplaced, MISPLACED_SINGULAR, MISPLACED_PLURAL),
        pluralize(summary.missing, NOT_PLACED_SINGULAR, NOT_PLACED_PLURAL),
    ];
    if summary.misplaced > 0 && summary.attempts_remain {
        msgs.push(MISPLACED_ITEMS_RETURNED.to_string());
    }
    if summary.misplaced == 0 && summary.missing == 0 {
        msgs.push(summary.finish.to_string());
    }
    if !summary.attempts_remain {
        msgs.push(fill_template(FINAL_ATTEMPT, &[("score", &format_score(summary.grade))]));
    }
    msgs
}

/// Wrap every message in its own paragraph.
pub fn to_html(messages: &[String]) -> String {
    messages.iter().map(|m| format!("<p>{m}</p>")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> AttemptSummary<'static> {
        AttemptSummary {
            correct: 0,
            misplaced: 0,
            missing: 0,
            attempts_remain: true,
            finish: "All done!",
            grade: 0.0,
        }
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, MISPLACED_SINGULAR, MISPLACED_PLURAL), "Misplaced 1 item.");
        assert_eq!(pluralize(0, MISPLACED_SINGULAR, MISPLACED_PLURAL), "Misplaced 0 items.");
        assert_eq!(pluralize(2, NOT_PLACED_SINGULAR, NOT_PLACED_PLURAL), "Not placed 2 required items.");
    }

    #[test]
    fn test_all_correct_appends_finish() {
        let msgs = compose(&AttemptSummary { correct: 2, grade: 1.0, ..summary() });
        assert_eq!(
            msgs,
            vec![
                "Correctly placed 2 items.".to_string(),
                "Misplaced 0 items.".to_string(),
                "Not placed 0 required items.".to_string(),
                "All done!".to_string(),
            ]
        );
    }

    #[test]
    fn test_misplaced_with_attempts_left() {
        let msgs = compose(&AttemptSummary { misplaced: 1, missing: 1, ..summary() });
        assert_eq!(msgs[1], "Misplaced 1 item.");
        assert_eq!(msgs[2], "Not placed 1 required item.");
        assert_eq!(msgs[3], MISPLACED_ITEMS_RETURNED);
        assert_eq!(msgs.len(), 4);
    }

    #[test]
    fn test_final_attempt_reports_score_and_skips_bank_message() {
        let msgs = compose(&AttemptSummary {
            correct: 1,
            misplaced: 1,
            attempts_remain: false,
            grade: 0.5,
            ..summary()
        });
        assert!(!msgs.iter().any(|m| m == MISPLACED_ITEMS_RETURNED));
        assert_eq!(msgs.last().unwrap(), "Final attempt was used, final score is 0.5");
    }

    #[test]
    fn test_to_html() {
        let html = to_html(&["a".to_string(), "b".to_string()]);
        assert_eq!(html, "<p>a</p><p>b</p>");
    }
}

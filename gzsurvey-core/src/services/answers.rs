// File: gzsurvey-core/src/services/answers.rs

use serde_json::Value;
use tracing::debug;
use gzsurvey_common::models::{AnswerValue, Answers};

/// Question ids the survey form is allowed to store.
pub const QUESTION_IDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "visit_date",
    "visit_type",
    "party_size",
    "heard_about_us",
    "overall_rating",
    "food_quality",
    "service_quality",
    "ambiance",
    "cleanliness",
    "value_for_money",
    "wait_time",
    "recommend_likelihood",
    "return_likelihood",
    "favorite_dishes",
    "improvement_areas",
    "comments",
    "marketing_opt_in",
];

pub const MAX_TEXT_CHARS: usize = 2000;
pub const MAX_LIST_ITEMS: usize = 20;
pub const MAX_LIST_ITEM_CHARS: usize = 100;

pub fn is_known_question(id: &str) -> bool {
    QUESTION_IDS.contains(&id)
}

/// Reduces a client payload to whitelisted answers.
///
/// Unknown keys, nulls, objects and non-string list items are dropped
/// silently. Text is truncated to [`MAX_TEXT_CHARS`]; lists keep at most
/// [`MAX_LIST_ITEMS`] items of at most [`MAX_LIST_ITEM_CHARS`] each.
pub fn sanitize_answers(payload: &Value) -> Answers {
    let mut answers = Answers::new();
    let Some(map) = payload.as_object() else {
        return answers;
    };

    for (key, value) in map {
        if !is_known_question(key) {
            debug!("Dropping unknown survey field '{}'", key);
            continue;
        }
        if let Some(v) = sanitize_value(value) {
            answers.insert(key.clone(), v);
        }
    }
    answers
}

fn sanitize_value(value: &Value) -> Option<AnswerValue> {
    match value {
        Value::Bool(b) => Some(AnswerValue::Bool(*b)),
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(AnswerValue::Number),
        Value::String(s) => Some(AnswerValue::Text(truncate_chars(s, MAX_TEXT_CHARS))),
        Value::Array(items) => {
            let list = items
                .iter()
                .filter_map(Value::as_str)
                .take(MAX_LIST_ITEMS)
                .map(|s| truncate_chars(s, MAX_LIST_ITEM_CHARS))
                .collect();
            Some(AnswerValue::List(list))
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

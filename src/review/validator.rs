//! 候选题目校验
//!
//! 纯函数：同样的输入永远得到同样的违规列表，不修改传入的候选值。
//! 所有违规都会被收集，不会在第一条失败时短路。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::CreateRules;
use crate::models::level::Level;
use crate::models::question::QuestionRecord;
use crate::review::originals::Originals;
use crate::review::result::{ChangedFields, ReviewResult};

/// 新建模式必须出现的字段
const CREATE_REQUIRED_KEYS: [&str; 6] = [
    "question",
    "answers",
    "explanation",
    "level",
    "category",
    "exam_code",
];

/// 更新模式必须出现的字段（不可变字段会自动补回）
const UPDATE_REQUIRED_KEYS: [&str; 3] = ["question", "answers", "explanation"];

/// 更新模式下不可修改的字段
const IMMUTABLE_FIELDS: [&str; 3] = ["category", "exam_code", "level"];

static ICON_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(✔|✅|\*|->|✓)").unwrap_or_else(|e| panic!("{}", e)));

static CORRECT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*correct[:\-\s]").unwrap_or_else(|e| panic!("{}", e)));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z]+").unwrap_or_else(|e| panic!("{}", e)));

/// 答案文本是否以正确性标记开头（✔ ✅ * -> ✓ 或 "Correct:"）
pub fn has_forbidden_marker(text: &str) -> bool {
    ICON_PREFIX.is_match(text) || CORRECT_PREFIX.is_match(text)
}

/// 解析文本是否包含 HTML 标签
pub fn has_html_tag(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// 新建模式校验
pub fn validate_new(candidate: &Value, rules: &CreateRules) -> Vec<String> {
    let Some(obj) = candidate.as_object() else {
        return vec!["candidate must be an object".to_string()];
    };

    let mut errors = Vec::new();

    for key in CREATE_REQUIRED_KEYS {
        if !obj.contains_key(key) {
            errors.push(format!("Missing key {}", key));
        }
    }

    if non_empty_str(obj.get("question")).is_none() {
        errors.push("question must be non-empty string".to_string());
    }

    match obj.get("answers").and_then(Value::as_array) {
        Some(answers) => {
            if answers.len() < 2 {
                errors.push("answers must be array length>=2".to_string());
            }
            if answers.len() < rules.min_answers() || answers.len() > rules.max_answers() {
                errors.push(format!(
                    "needs between {} and {} answers (found {})",
                    rules.min_answers(),
                    rules.max_answers(),
                    answers.len()
                ));
            }

            for (i, answer) in answers.iter().enumerate() {
                let text = answer.get("text").and_then(Value::as_str);
                if text.map_or(true, |t| t.trim().is_empty()) {
                    errors.push(format!("answer[{}] text empty", i));
                }
                if !answer.get("isCorrect").is_some_and(Value::is_boolean) {
                    errors.push(format!("answer[{}] isCorrect not boolean", i));
                }
                if text.is_some_and(has_forbidden_marker) {
                    errors.push(format!("answer[{}] contains forbidden icon/prefix", i));
                }
            }

            let correct = answers
                .iter()
                .filter(|a| a.get("isCorrect").and_then(Value::as_bool) == Some(true))
                .count();
            if correct != rules.required_correct() {
                errors.push(format!(
                    "needs exactly {} correct answers (found {})",
                    rules.required_correct(),
                    correct
                ));
            }
            if !answers.is_empty() && correct >= answers.len() {
                errors.push("cannot have all answers correct".to_string());
            }
        }
        None => errors.push("answers must be array length>=2".to_string()),
    }

    check_explanation(obj, &mut errors, "explanation must contain HTML tags");

    let level_ok = obj
        .get("level")
        .and_then(Value::as_str)
        .and_then(Level::find)
        .is_some();
    if !level_ok {
        errors.push("level invalid".to_string());
    }

    if obj.get("category").and_then(Value::as_str) != Some(rules.category()) {
        errors.push("category mismatch".to_string());
    }
    if obj.get("exam_code").and_then(Value::as_str) != Some(rules.exam_code()) {
        errors.push("exam_code mismatch".to_string());
    }

    errors
}

fn check_explanation(obj: &Map<String, Value>, errors: &mut Vec<String>, tag_message: &str) {
    let explanation = obj.get("explanation").and_then(Value::as_str);
    if explanation.map_or(true, |e| e.trim().is_empty()) {
        errors.push("explanation empty".to_string());
    }
    if explanation.is_some_and(|e| !has_html_tag(e)) {
        errors.push(tag_message.to_string());
    }
}

/// 不可变字段对齐：候选缺失时从原题补回，存在且不同则记为违规
fn reconcile_immutable(
    obj: &mut Map<String, Value>,
    field: &str,
    original: Value,
    errors: &mut Vec<String>,
) {
    match obj.get(field) {
        None => {
            obj.insert(field.to_string(), original);
        }
        Some(value) if *value != original => errors.push(format!("{} changed", field)),
        Some(_) => {}
    }
}

fn immutable_value(original: &QuestionRecord, field: &str) -> Value {
    match field {
        "category" => original
            .category
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
        "exam_code" => Value::String(original.exam_code.clone()),
        "level" => Value::String(original.level.clone()),
        _ => Value::Null,
    }
}

/// 更新模式校验
///
/// 返回的结果里 `candidate` 已补回 id 和不可变字段，`changes` 记录与原题的差异
pub fn validate_update(candidate: &Value, position: usize, originals: &Originals) -> ReviewResult {
    let id = originals.resolve_id(candidate, position);
    let original = id.and_then(|id| originals.get(id));

    let mut result = ReviewResult::checked(position, candidate.clone(), Vec::new());
    result.id = id;
    result.original = original.cloned();

    let Some(original) = original else {
        result.valid = false;
        result.errors.push("id not in selection".to_string());
        return result;
    };

    let Some(source) = candidate.as_object() else {
        result.valid = false;
        result.errors.push("candidate must be an object".to_string());
        return result;
    };

    let mut obj = source.clone();
    let mut errors = Vec::new();

    obj.insert("id".to_string(), Value::from(original.id));
    for field in IMMUTABLE_FIELDS {
        reconcile_immutable(&mut obj, field, immutable_value(original, field), &mut errors);
    }

    for key in UPDATE_REQUIRED_KEYS {
        if !obj.contains_key(key) {
            errors.push(format!("missing key {}", key));
        }
    }

    let answers = obj.get("answers").and_then(Value::as_array);
    match answers {
        Some(answers) => {
            if answers.len() != original.answers.len() {
                errors.push("answer count changed".to_string());
            }
            for (i, (answer, orig)) in answers.iter().zip(&original.answers).enumerate() {
                if answer.get("isCorrect").and_then(Value::as_bool) != Some(orig.is_correct) {
                    errors.push(format!("answers[{}].isCorrect changed", i));
                }
                let text = answer.get("text").and_then(Value::as_str);
                if text.map_or(true, |t| t.trim().is_empty()) {
                    errors.push(format!("answers[{}].text empty", i));
                }
                if text.is_some_and(has_forbidden_marker) {
                    errors.push(format!("answers[{}].text has forbidden icon", i));
                }
            }
        }
        None => errors.push("answers not array".to_string()),
    }

    if non_empty_str(obj.get("question")).is_none() {
        errors.push("question empty".to_string());
    }
    check_explanation(&obj, &mut errors, "explanation needs HTML tags");

    result.changes = ChangedFields {
        question: obj.get("question").and_then(Value::as_str) != Some(original.question.as_str()),
        explanation: obj.get("explanation").and_then(Value::as_str)
            != Some(original.explanation.as_str()),
        answer_text: answers
            .map(|answers| {
                answers
                    .iter()
                    .enumerate()
                    .map(|(i, a)| {
                        a.get("text").and_then(Value::as_str)
                            != original.answers.get(i).map(|o| o.text.as_str())
                    })
                    .collect()
            })
            .unwrap_or_default(),
    };

    result.valid = errors.is_empty();
    result.errors = errors;
    result.candidate = Some(Value::Object(obj));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Answer;
    use serde_json::json;

    fn rules(required: usize) -> CreateRules {
        CreateRules::new(required, 2, 8, "Networking", "N10").unwrap()
    }

    fn new_candidate(flags: &[bool]) -> Value {
        let answers: Vec<Value> = flags
            .iter()
            .enumerate()
            .map(|(i, c)| json!({"text": format!("Option {}", i), "isCorrect": c}))
            .collect();
        json!({
            "question": "Which layer does a switch operate at?",
            "answers": answers,
            "explanation": "<p>Layer 2</p>",
            "level": "Beginner",
            "category": "Networking",
            "exam_code": "N10"
        })
    }

    fn original(id: i64) -> QuestionRecord {
        QuestionRecord {
            id,
            question: "Old question".into(),
            answers: vec![Answer::new("Old", true), Answer::new("Other", false)],
            explanation: "<p>old</p>".into(),
            level: "Intermediate".into(),
            category: Some("Networking".into()),
            exam_code: "N10".into(),
            inactive: false,
            created_at: None,
            updated_at: Some("2024-01-01T00:00:00Z".into()),
        }
    }

    #[test]
    fn test_valid_create_candidate() {
        let candidate: Value = serde_json::from_str(
            r#"{"question":"Q1","answers":[{"text":"A","isCorrect":true},{"text":"B","isCorrect":false}],"explanation":"<p>because</p>","level":"Beginner","category":"Networking","exam_code":"N10"}"#,
        )
        .unwrap();
        assert!(validate_new(&candidate, &rules(1)).is_empty());
    }

    #[test]
    fn test_correct_count_boundary() {
        let rules = CreateRules::new(1, 2, 8, "Networking", "N10").unwrap();

        let none = validate_new(&new_candidate(&[false, false, false, false]), &rules);
        assert!(none.contains(&"needs exactly 1 correct answers (found 0)".to_string()));

        let one = validate_new(&new_candidate(&[false, true, false, false]), &rules);
        assert!(one.is_empty(), "{:?}", one);

        let all = validate_new(&new_candidate(&[true, true, true, true]), &rules);
        assert!(all.contains(&"cannot have all answers correct".to_string()));
        assert!(all.contains(&"needs exactly 1 correct answers (found 4)".to_string()));
    }

    #[test]
    fn test_forbidden_markers() {
        for text in ["✔ Yes", "  ✅ Yes", "*Yes", "-> Yes", "✓Yes", "Correct: yes", "correct - yes", "CORRECT yes"] {
            assert!(has_forbidden_marker(text), "should reject {:?}", text);
        }
        for text in ["Yes", "Correctly configured VLAN", "A -> B mapping", "5 * 3"] {
            assert!(!has_forbidden_marker(text), "should accept {:?}", text);
        }

        let mut candidate = new_candidate(&[true, false]);
        candidate["answers"][0]["text"] = json!("✅ Option 0");
        let errors = validate_new(&candidate, &rules(1));
        assert_eq!(errors, vec!["answer[0] contains forbidden icon/prefix".to_string()]);
    }

    #[test]
    fn test_collects_all_violations() {
        let candidate = json!({
            "question": "  ",
            "answers": [{"text": "", "isCorrect": "yes"}],
            "explanation": "plain text",
            "level": "Expert",
            "category": "Security",
        });
        let errors = validate_new(&candidate, &rules(1));

        for expected in [
            "Missing key exam_code",
            "question must be non-empty string",
            "answers must be array length>=2",
            "needs between 2 and 8 answers (found 1)",
            "answer[0] text empty",
            "answer[0] isCorrect not boolean",
            "needs exactly 1 correct answers (found 0)",
            "explanation must contain HTML tags",
            "level invalid",
            "category mismatch",
            "exam_code mismatch",
        ] {
            assert!(errors.contains(&expected.to_string()), "missing {:?} in {:?}", expected, errors);
        }
    }

    #[test]
    fn test_answer_count_range() {
        let rules = CreateRules::new(1, 4, 5, "Networking", "N10").unwrap();
        let errors = validate_new(&new_candidate(&[true, false, false]), &rules);
        assert_eq!(errors, vec!["needs between 4 and 5 answers (found 3)".to_string()]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let candidate = json!({"question": "", "answers": "nope"});
        let rules = rules(2);
        assert_eq!(validate_new(&candidate, &rules), validate_new(&candidate, &rules));

        let originals = Originals::from_selection(vec![original(10)]);
        let update = json!({"question": "Q", "answers": [{"text": "x", "isCorrect": false}]});
        assert_eq!(
            validate_update(&update, 0, &originals),
            validate_update(&update, 0, &originals)
        );
    }

    #[test]
    fn test_update_diff_and_reattach() {
        let originals = Originals::from_selection(vec![original(10)]);
        let candidate = json!({
            "question": "Old question",
            "answers": [{"text": "New", "isCorrect": true}, {"text": "Other", "isCorrect": false}],
            "explanation": "<p>old</p>"
        });

        let result = validate_update(&candidate, 0, &originals);
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(result.id, Some(10));
        assert_eq!(result.changes.answer_text, vec![true, false]);
        assert!(!result.changes.question);
        assert!(!result.changes.explanation);

        let reconciled = result.candidate.unwrap();
        assert_eq!(reconciled["category"], json!("Networking"));
        assert_eq!(reconciled["exam_code"], json!("N10"));
        assert_eq!(reconciled["level"], json!("Intermediate"));
        assert_eq!(reconciled["id"], json!(10));
        // 调用方的输入保持不变
        assert!(candidate.get("category").is_none());
    }

    #[test]
    fn test_update_rejects_correctness_change() {
        let originals = Originals::from_selection(vec![original(10)]);
        let candidate = json!({
            "question": "Q",
            "answers": [{"text": "Old", "isCorrect": false}, {"text": "Other", "isCorrect": true}],
            "explanation": "<p>x</p>",
            "level": "Intermediate"
        });

        let result = validate_update(&candidate, 0, &originals);
        assert!(!result.valid);
        assert!(result.errors.contains(&"answers[0].isCorrect changed".to_string()));
        assert!(result.errors.contains(&"answers[1].isCorrect changed".to_string()));
    }

    #[test]
    fn test_update_rejects_marked_answer_text() {
        let originals = Originals::from_selection(vec![original(10)]);
        let candidate = json!({
            "question": "Old question",
            "answers": [{"text": "Correct: x", "isCorrect": true}, {"text": "✓ x", "isCorrect": false}],
            "explanation": "<p>old</p>"
        });

        let result = validate_update(&candidate, 0, &originals);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "answers[0].text has forbidden icon".to_string(),
                "answers[1].text has forbidden icon".to_string(),
            ]
        );
    }

    #[test]
    fn test_update_rejects_immutable_changes_and_count() {
        let originals = Originals::from_selection(vec![original(10)]);
        let candidate = json!({
            "question": "Q",
            "answers": [{"text": "Old", "isCorrect": true}],
            "explanation": "<p>x</p>",
            "level": "Advanced",
            "category": "Security",
            "exam_code": "N10"
        });

        let result = validate_update(&candidate, 0, &originals);
        assert_eq!(
            result.errors,
            vec![
                "category changed".to_string(),
                "level changed".to_string(),
                "answer count changed".to_string(),
            ]
        );
    }

    #[test]
    fn test_update_unknown_id_stops_checks() {
        let originals = Originals::from_selection(vec![original(10)]);
        let result = validate_update(&json!({"id": 99, "question": ""}), 0, &originals);
        assert_eq!(result.errors, vec!["id not in selection".to_string()]);
        assert_eq!(result.id, Some(99));
        assert!(result.original.is_none());

        let beyond = validate_update(&json!({"question": "Q"}), 3, &originals);
        assert_eq!(beyond.errors, vec!["id not in selection".to_string()]);
        assert_eq!(beyond.id, None);
    }

    #[test]
    fn test_update_explicit_id_wins_over_position() {
        let originals = Originals::from_selection(vec![original(10), original(20)]);
        let candidate = json!({
            "id": 20,
            "question": "Old question",
            "answers": [{"text": "Old", "isCorrect": true}, {"text": "Other", "isCorrect": false}],
            "explanation": "<p>old</p>"
        });
        let result = validate_update(&candidate, 0, &originals);
        assert!(result.valid);
        assert_eq!(result.id, Some(20));
    }
}

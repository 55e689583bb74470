use serde::{Deserialize, Serialize};

/// 单个答案选项
///
/// 正确性只通过 `is_correct` 表达，文本中不允许出现 ✔ / * 之类的标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

impl Answer {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// 数据库 questions 表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub question: String,
    pub answers: Vec<Answer>,
    pub explanation: String,
    pub level: String,
    #[serde(default)]
    pub category: Option<String>,
    pub exam_code: String,
    #[serde(default)]
    pub inactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// 新建题目的写入载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answers: Vec<Answer>,
    pub explanation: String,
    pub level: String,
    pub category: String,
    pub exam_code: String,
    pub inactive: bool,
    pub created_at: String,
}

impl QuestionRecord {
    /// 正确答案数量
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}

impl std::fmt::Display for QuestionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = if self.question.chars().count() > 60 {
            self.question.chars().take(60).collect::<String>() + "..."
        } else {
            self.question.clone()
        };
        write!(f, "#{} [{}] {}", self.id, self.exam_code, preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_uses_camel_case_flag() {
        let json = serde_json::to_value(Answer::new("A", true)).unwrap();
        assert_eq!(json, serde_json::json!({"text": "A", "isCorrect": true}));
    }

    #[test]
    fn test_record_accepts_null_category_and_missing_timestamps() {
        let record: QuestionRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "question": "Q",
            "answers": [{"text": "A", "isCorrect": true}, {"text": "B", "isCorrect": false}],
            "explanation": "<p>x</p>",
            "level": "Beginner",
            "category": null,
            "exam_code": "N10",
            "inactive": false
        }))
        .unwrap();

        assert_eq!(record.category, None);
        assert_eq!(record.updated_at, None);
        assert_eq!(record.correct_count(), 1);
    }
}

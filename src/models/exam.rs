use serde::{Deserialize, Serialize};

/// exam_pages 表的精简视图，只保留审核流程需要的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSummary {
    pub exam_code: String,
    #[serde(default)]
    pub exam_name: String,
    #[serde(default)]
    pub vendor: Option<String>,
    pub is_active: bool,
}

impl ExamSummary {
    /// 新建题目时的 inactive 标记跟随考试的启用状态
    pub fn new_question_inactive(&self) -> bool {
        !self.is_active
    }
}

impl std::fmt::Display for ExamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.vendor {
            Some(vendor) => write!(f, "{} {} - {}", vendor, self.exam_code, self.exam_name),
            None => write!(f, "{} - {}", self.exam_code, self.exam_name),
        }
    }
}

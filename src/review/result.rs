use serde::Serialize;
use serde_json::Value;

use crate::models::question::QuestionRecord;

/// 与原题相比发生变化的字段（仅用于展示差异，不影响有效性）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangedFields {
    pub question: bool,
    pub explanation: bool,
    /// 按位置记录答案文本是否变化
    pub answer_text: Vec<bool>,
}

impl ChangedFields {
    pub fn any(&self) -> bool {
        self.question || self.explanation || self.answer_text.iter().any(|c| *c)
    }
}

/// 单个候选题目的校验结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewResult {
    /// 在本次解析结果中的位置（本次会话内的身份标识）
    pub position: usize,
    /// 更新模式下解析出的题目 ID
    pub id: Option<i64>,
    pub valid: bool,
    pub errors: Vec<String>,
    /// 候选题目（更新模式下已补回不可变字段）
    pub candidate: Option<Value>,
    pub original: Option<QuestionRecord>,
    pub changes: ChangedFields,
    pub saved: bool,
    pub save_error: Option<String>,
    pub discarded: bool,
    /// 解析失败 / 数量不符时生成的合成结果，永远不能保存
    pub synthetic: bool,
}

impl ReviewResult {
    /// 普通候选题目的结果
    pub fn checked(position: usize, candidate: Value, errors: Vec<String>) -> Self {
        Self {
            position,
            id: None,
            valid: errors.is_empty(),
            errors,
            candidate: Some(candidate),
            original: None,
            changes: ChangedFields::default(),
            saved: false,
            save_error: None,
            discarded: false,
            synthetic: false,
        }
    }

    /// 合成的错误结果
    pub fn synthetic(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            id: None,
            valid: false,
            errors: vec![message.into()],
            candidate: None,
            original: None,
            changes: ChangedFields::default(),
            saved: false,
            save_error: None,
            discarded: false,
            synthetic: true,
        }
    }

    /// 是否可以保存（有效、未保存、未丢弃、非合成）
    pub fn is_savable(&self) -> bool {
        self.valid && !self.saved && !self.discarded && !self.synthetic
    }
}

/// 批量保存的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub attempted: usize,
    pub saved: usize,
    pub failed: usize,
}

impl std::fmt::Display for SaveSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "尝试 {} 条, 成功 {}, 失败 {}",
            self.attempted, self.saved, self.failed
        )
    }
}

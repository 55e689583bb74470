//! 批量解析
//!
//! 原始文本 → 清洗 → JSON 解码 → 候选题目数组（保持原始顺序）

use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::review::sanitize::sanitize;

/// 一次解析的结果
#[derive(Debug, Clone, PartialEq)]
pub struct BatchParse {
    /// 清洗规则是否改动过文本
    pub sanitized: bool,
    /// 候选题目，或唯一的解析错误（不会返回部分结果）
    pub outcome: Result<Vec<Value>, ParseError>,
}

/// 解析粘贴进来的文本
///
/// 空白输入返回 `None`，调用方应当什么都不做
pub fn parse_batch(raw: &str) -> Option<BatchParse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = sanitize(trimmed);
    if cleaned.changed {
        debug!("输入文本已清洗，生效规则: {:?}", cleaned.applied);
    }

    Some(BatchParse {
        sanitized: cleaned.changed,
        outcome: parse_candidates(&cleaned.text),
    })
}

/// 解码 JSON 并取出候选数组
///
/// 接受两种根结构：裸数组，或带 `questions` 数组的对象
fn parse_candidates(text: &str) -> Result<Vec<Value>, ParseError> {
    let data: Value = serde_json::from_str(text).map_err(|e| ParseError::Json {
        message: e.to_string(),
    })?;

    match data {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ParseError::RootShape),
        },
        _ => Err(ParseError::RootShape),
    }
}

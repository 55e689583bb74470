//! 审核会话共享的结果列表
//!
//! 由当前会话独占，单线程按事件顺序修改

use crate::error::{AppResult, BusinessError};
use crate::review::parser::BatchParse;
use crate::review::result::ReviewResult;

#[derive(Debug, Default)]
pub struct SessionState {
    results: Vec<ReviewResult>,
    sanitized: bool,
}

impl SessionState {
    pub fn results(&self) -> &[ReviewResult] {
        &self.results
    }

    pub fn sanitized(&self) -> bool {
        self.sanitized
    }

    /// 用一次新的解析替换全部结果
    ///
    /// 解析失败时只留下一条合成错误结果；成功时由 `check` 逐条校验
    pub fn replace<F>(&mut self, parsed: BatchParse, check: F)
    where
        F: FnOnce(Vec<serde_json::Value>) -> Vec<ReviewResult>,
    {
        self.sanitized = parsed.sanitized;
        self.results = match parsed.outcome {
            Ok(candidates) => check(candidates),
            Err(e) => vec![ReviewResult::synthetic(0, e.to_string())],
        };
    }

    pub fn get(&self, position: usize) -> AppResult<&ReviewResult> {
        let len = self.results.len();
        self.results
            .get(position)
            .ok_or_else(|| BusinessError::PositionOutOfRange { position, len }.into())
    }

    pub fn get_mut(&mut self, position: usize) -> AppResult<&mut ReviewResult> {
        let len = self.results.len();
        self.results
            .get_mut(position)
            .ok_or_else(|| BusinessError::PositionOutOfRange { position, len }.into())
    }

    /// 标记丢弃，已保存的结果不能丢弃
    pub fn discard(&mut self, position: usize) -> AppResult<bool> {
        let result = self.get_mut(position)?;
        if result.saved || result.discarded {
            return Ok(false);
        }
        result.discarded = true;
        Ok(true)
    }

    /// 当前可保存结果的位置快照（按列表顺序）
    pub fn savable_positions(&self) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_savable())
            .map(|(i, _)| i)
            .collect()
    }
}

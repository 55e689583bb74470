//! 无效题目报告 - 业务能力层
//!
//! 只负责把未通过校验的结果写进报告文件，不关心流程

use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::debug;

use crate::config::ReviewMode;
use crate::error::{AppError, AppResult};
use crate::review::result::ReviewResult;

/// 报告写入服务
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.report_file_path
    }

    /// 覆盖写入报告头
    pub fn init(&self, mode: ReviewMode, exam_code: &str) -> AppResult<()> {
        let header = format!(
            "{}\n无效题目报告 - {} - {} - {}\n{}\n\n",
            "=".repeat(60),
            mode,
            exam_code,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.report_file_path, header)
            .map_err(|e| AppError::file_write_failed(&self.report_file_path, e))
    }

    /// 追加所有无效结果，返回写入条数
    pub fn write_rejected(&self, results: &[ReviewResult]) -> AppResult<usize> {
        let rejected: Vec<&ReviewResult> = results.iter().filter(|r| !r.valid).collect();
        if rejected.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)
            .map_err(|e| AppError::file_write_failed(&self.report_file_path, e))?;

        for result in &rejected {
            debug!("写入报告: 位置 {} | 违规 {} 条", result.position, result.errors.len());
            file.write_all(format_entry(result).as_bytes())
                .map_err(|e| AppError::file_write_failed(&self.report_file_path, e))?;
        }

        Ok(rejected.len())
    }
}

fn format_entry(result: &ReviewResult) -> String {
    let id = result
        .id
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "-".to_string());
    let mut entry = format!("位置 {} | 题目 {}\n", result.position, id);
    for error in &result.errors {
        entry.push_str(&format!("  - {}\n", error));
    }
    entry
}

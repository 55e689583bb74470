/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ReviewSettings;
use crate::review::result::{ReviewResult, SaveSummary};

/// 初始化日志
///
/// RUST_LOG 优先，否则按 verbose 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(settings: &ReviewSettings) {
    info!("{}", "=".repeat(60));
    info!("🚀 题目审核启动 - 模式: {}", settings.mode);
    info!("📚 考试: {} | 分类: {}", settings.exam_code, settings.category);
    info!("{}", "=".repeat(60));
}

/// 记录解析结果
pub fn log_parse_summary(results: &[ReviewResult], sanitized: bool) {
    let valid = results.iter().filter(|r| r.valid).count();
    info!("\n{}", "─".repeat(60));
    info!("📋 解析完成: 共 {} 条, 有效 {}, 无效 {}", results.len(), valid, results.len() - valid);
    if sanitized {
        info!("🧹 输入文本经过自动清洗（仅提示）");
    }
    for result in results.iter().filter(|r| !r.valid) {
        info!("  ✗ 位置 {}: {}", result.position, truncate_text(&result.errors.join("; "), 120));
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summary: Option<&SaveSummary>, rejected: usize, report_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 审核完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match summary {
        Some(summary) => {
            info!("✅ 已保存: {}/{}", summary.saved, summary.attempted);
            info!("❌ 保存失败: {}", summary.failed);
        }
        None => info!("💡 未开启自动保存 (AUTO_SAVE=true 可直接保存有效题目)"),
    }
    info!("⚠️ 无效题目: {}", rejected);
    info!("{}", "=".repeat(60));
    if rejected > 0 {
        info!("\n无效题目报告已保存至: {}", report_path);
    }
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("✔✔✔✔", 2), "✔✔...");
    }
}

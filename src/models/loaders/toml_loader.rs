use crate::config::ReviewSettings;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载审核会话设置
pub async fn load_review_settings(path: &Path) -> Result<ReviewSettings> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取设置文件: {}", path.display()))?;

    let settings: ReviewSettings = toml::from_str(&content)
        .with_context(|| format!("无法解析设置文件: {}", path.display()))?;

    tracing::info!(
        "已加载审核设置: 模式 {} | 考试 {} | 选中 {} 道题目",
        settings.mode,
        settings.exam_code,
        settings.selected_ids.len()
    );

    Ok(settings)
}

/// 读取粘贴的模型输出
pub async fn load_input_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取输入文件: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewMode;

    #[tokio::test]
    async fn test_load_review_settings() {
        let path = std::env::temp_dir().join(format!("review-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
mode = "create"
exam_code = "N10"
category = "Networking"
required_correct = 2
min_answers = 4
max_answers = 6
"#,
        )
        .unwrap();

        let settings = load_review_settings(&path).await.unwrap();
        assert_eq!(settings.mode, ReviewMode::Create);
        assert_eq!(settings.required_correct, 2);
        assert!(settings.create_rules().is_ok());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_missing_file_has_context() {
        let err = load_review_settings(Path::new("/nonexistent/review.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("无法读取设置文件"));
    }
}

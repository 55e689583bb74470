use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- 数据库 API 配置 ---
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// 审核会话设置文件 (TOML)
    pub review_settings_path: String,
    /// 粘贴的模型输出文件
    pub input_file: String,
    /// 校验完成后是否直接保存全部有效题目
    pub auto_save: bool,
    /// 无效题目报告文件
    pub reject_report_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            review_settings_path: "review.toml".to_string(),
            input_file: "questions.json".to_string(),
            auto_save: false,
            reject_report_file: "rejected.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or(default.supabase_url),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or(default.supabase_anon_key),
            review_settings_path: std::env::var("REVIEW_SETTINGS").unwrap_or(default.review_settings_path),
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            auto_save: std::env::var("AUTO_SAVE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.auto_save),
            reject_report_file: std::env::var("REJECT_REPORT_FILE").unwrap_or(default.reject_report_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}

/// 审核模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// 批量新建题目
    Create,
    /// 批量修订已有题目
    Update,
}

impl std::fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewMode::Create => write!(f, "create"),
            ReviewMode::Update => write!(f, "update"),
        }
    }
}

/// 操作员在表单里填写的审核会话设置（从 TOML 加载）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSettings {
    pub mode: ReviewMode,
    pub exam_code: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_required_correct")]
    pub required_correct: usize,
    #[serde(default = "default_min_answers")]
    pub min_answers: usize,
    #[serde(default = "default_max_answers")]
    pub max_answers: usize,
    /// 更新模式下选中的题目 ID，顺序即选择顺序
    #[serde(default)]
    pub selected_ids: Vec<i64>,
}

fn default_required_correct() -> usize {
    1
}

fn default_min_answers() -> usize {
    4
}

fn default_max_answers() -> usize {
    8
}

impl ReviewSettings {
    /// 转换为新建模式的校验规则
    pub fn create_rules(&self) -> Result<CreateRules, ConfigError> {
        CreateRules::new(
            self.required_correct,
            self.min_answers,
            self.max_answers,
            self.category.clone(),
            self.exam_code.clone(),
        )
    }
}

/// 每道题允许的最多答案数
pub const ANSWER_CAP: usize = 12;

/// 新建模式的校验参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRules {
    required_correct: usize,
    min_answers: usize,
    max_answers: usize,
    category: String,
    exam_code: String,
}

impl CreateRules {
    pub fn new(
        required_correct: usize,
        min_answers: usize,
        max_answers: usize,
        category: impl Into<String>,
        exam_code: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if required_correct < 1 {
            return Err(ConfigError::RequiredCorrectTooSmall(required_correct));
        }
        if min_answers < 2 {
            return Err(ConfigError::MinAnswersTooSmall(min_answers));
        }
        if max_answers < min_answers {
            return Err(ConfigError::AnswerRangeInverted {
                min: min_answers,
                max: max_answers,
            });
        }
        if max_answers > ANSWER_CAP {
            return Err(ConfigError::MaxAnswersTooLarge {
                max: max_answers,
                cap: ANSWER_CAP,
            });
        }
        if required_correct >= max_answers {
            return Err(ConfigError::NoDistractorLeft {
                required: required_correct,
                max: max_answers,
            });
        }

        let category = category.into();
        if category.trim().is_empty() {
            return Err(ConfigError::MissingSetting("category"));
        }
        let exam_code = exam_code.into();
        if exam_code.trim().is_empty() {
            return Err(ConfigError::MissingSetting("exam_code"));
        }

        Ok(Self {
            required_correct,
            min_answers,
            max_answers,
            category,
            exam_code,
        })
    }

    pub fn required_correct(&self) -> usize {
        self.required_correct
    }

    pub fn min_answers(&self) -> usize {
        self.min_answers
    }

    pub fn max_answers(&self) -> usize {
        self.max_answers
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn exam_code(&self) -> &str {
        &self.exam_code
    }

    /// 分类必须是该考试已配置的分类之一
    pub fn ensure_known_category(&self, known: &[String]) -> Result<(), ConfigError> {
        if known.iter().any(|c| c == &self.category) {
            return Ok(());
        }
        Err(ConfigError::UnknownCategory {
            category: self.category.clone(),
            exam_code: self.exam_code.clone(),
            known: known.to_vec(),
        })
    }
}

//! 输入文本清洗
//!
//! 修正 markdown 导出链路常见的转义残留（`\[`、`\_`、`\\"` 等）。
//! 规则按固定顺序执行，纯文本替换，不理解 JSON 结构。

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// 一条清洗规则
pub struct SanitizeRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    /// 替换串中是否引用捕获组
    expand: bool,
}

impl SanitizeRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str, expand: bool) -> Self {
        Self {
            name,
            // 规则是编译期常量，构造失败属于程序错误
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("清洗规则 {} 无效: {}", name, e)),
            replacement,
            expand,
        }
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.expand {
            self.pattern.replace_all(text, self.replacement)
        } else {
            self.pattern.replace_all(text, NoExpand(self.replacement))
        }
    }
}

/// 清洗规则，按顺序执行
pub static RULES: LazyLock<Vec<SanitizeRule>> = LazyLock::new(|| {
    vec![
        SanitizeRule::new("escaped-open-bracket", r"\\(\[)", "$1", true),
        SanitizeRule::new("escaped-close-bracket", r"\\(\])", "$1", true),
        SanitizeRule::new("escaped-underscore", r"\\_", "_", false),
        SanitizeRule::new("collapsed-quote-escape", r#"\\{2,}""#, r#"\""#, false),
    ]
});

/// 清洗结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized<'t> {
    pub text: Cow<'t, str>,
    /// 是否有规则改动了文本（仅提示，不代表错误）
    pub changed: bool,
    /// 实际生效的规则名
    pub applied: Vec<&'static str>,
}

/// 依次执行全部清洗规则
pub fn sanitize(raw: &str) -> Sanitized<'_> {
    let mut text = Cow::Borrowed(raw);
    let mut applied = Vec::new();

    for rule in RULES.iter() {
        let rewritten = match rule.apply(&text) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(s) => s,
        };
        applied.push(rule.name);
        text = Cow::Owned(rewritten);
    }

    Sanitized {
        changed: !applied.is_empty(),
        text,
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_untouched() {
        let raw = r#"{"questions":[{"exam_code":"N10"}]}"#;
        let out = sanitize(raw);
        assert!(!out.changed);
        assert!(matches!(out.text, Cow::Borrowed(_)));
        assert_eq!(out.text, raw);
    }

    #[test]
    fn test_brackets_and_underscore() {
        let out = sanitize(r#"{"questions":\[{"exam\_code":"N10"}\]}"#);
        assert!(out.changed);
        assert_eq!(out.text, r#"{"questions":[{"exam_code":"N10"}]}"#);
        assert_eq!(
            out.applied,
            vec!["escaped-open-bracket", "escaped-close-bracket", "escaped-underscore"]
        );
    }

    #[test]
    fn test_collapses_runs_of_backslashes_before_quote() {
        let out = sanitize(r#"{"q":"say \\\"hi\\\\\""}"#);
        assert_eq!(out.text, r#"{"q":"say \"hi\""}"#);
        assert_eq!(out.applied, vec!["collapsed-quote-escape"]);
    }

    #[test]
    fn test_single_escaped_quote_is_valid_json_and_kept() {
        let raw = r#"{"q":"a \"quoted\" word"}"#;
        let out = sanitize(raw);
        assert!(!out.changed);
        assert_eq!(out.text, raw);
    }
}

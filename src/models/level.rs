use serde::{Deserialize, Serialize};

/// 题目难度枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// 初级
    Beginner,
    /// 中级
    Intermediate,
    /// 高级
    Advanced,
}

/// 标准名称 → 难度（精确匹配，区分大小写）
static LEVELS: phf::Map<&'static str, Level> = phf::phf_map! {
    "Beginner" => Level::Beginner,
    "Intermediate" => Level::Intermediate,
    "Advanced" => Level::Advanced,
};

impl Level {
    /// 全部难度，按由浅到深排列
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }

    /// 按标准名称查找难度
    ///
    /// 只接受标准写法，"beginner" 之类的变体视为无效
    pub fn find(s: &str) -> Option<Self> {
        LEVELS.get(s).copied()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_exact_names() {
        for level in Level::ALL {
            assert_eq!(Level::find(level.name()), Some(level));
        }
    }

    #[test]
    fn test_find_rejects_variants() {
        assert_eq!(Level::find("beginner"), None);
        assert_eq!(Level::find("Mixed"), None);
        assert_eq!(Level::find(" Advanced"), None);
    }
}

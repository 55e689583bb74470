use std::collections::HashMap;

use serde_json::Value;

use crate::models::question::QuestionRecord;

/// 更新模式下操作员选中的原题
///
/// 保留选择顺序（用于按位置回退匹配），并建立 ID → 原题的索引
#[derive(Debug, Clone, Default)]
pub struct Originals {
    records: Vec<QuestionRecord>,
    by_id: HashMap<i64, usize>,
}

impl Originals {
    /// 按选择顺序构建索引
    ///
    /// 重复 ID 以第一次出现为准
    pub fn from_selection(records: Vec<QuestionRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_id.entry(record.id).or_insert(idx);
        }
        Self { records, by_id }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&QuestionRecord> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut QuestionRecord> {
        match self.by_id.get(&id) {
            Some(&idx) => self.records.get_mut(idx),
            None => None,
        }
    }

    /// 解析候选题目对应的原题 ID
    ///
    /// 候选里带整数 `id` 时以它为准，否则按位置对应选择顺序
    pub fn resolve_id(&self, candidate: &Value, position: usize) -> Option<i64> {
        match candidate.get("id").and_then(Value::as_i64) {
            Some(id) => Some(id),
            None => self.records.get(position).map(|r| r.id),
        }
    }
}

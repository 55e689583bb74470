//! 更新模式审核会话（对齐器）
//!
//! 把模型返回的修订稿和操作员选中的原题对齐，校验后只回写允许修改的字段：
//! `question`、`explanation`、各位置答案的 `text`。
//! 写回时 `isCorrect` 一律取自原题。

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ReviewMode;
use crate::error::AppResult;
use crate::models::question::{Answer, QuestionRecord};
use crate::review::originals::Originals;
use crate::review::parser::parse_batch;
use crate::review::result::{ReviewResult, SaveSummary};
use crate::review::validator::validate_update;
use crate::services::gateway::QuestionGateway;
use crate::workflow::events::{EventSink, ReviewEvent};
use crate::workflow::session_state::SessionState;

#[derive(Debug, Deserialize)]
struct RevisedAnswer {
    text: String,
}

/// 修订稿中允许回写的部分
#[derive(Debug, Deserialize)]
struct Revision {
    question: String,
    explanation: String,
    answers: Vec<RevisedAnswer>,
}

/// 更新模式会话
pub struct UpdateSession {
    originals: Originals,
    state: SessionState,
    events: EventSink,
}

impl UpdateSession {
    /// `selection` 为操作员选中的原题，顺序即选择顺序
    pub fn new(selection: Vec<QuestionRecord>) -> Self {
        Self {
            originals: Originals::from_selection(selection),
            state: SessionState::default(),
            events: EventSink::default(),
        }
    }

    /// 连接事件出口
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn originals(&self) -> &Originals {
        &self.originals
    }

    pub fn results(&self) -> &[ReviewResult] {
        self.state.results()
    }

    pub fn sanitized(&self) -> bool {
        self.state.sanitized()
    }

    /// 解析并校验修订稿，替换之前的全部结果
    ///
    /// 返回数量和选中数量不一致时，额外追加一条合成的违规结果。
    /// 多个候选对应同一道原题时，只有第一个保留认领，其余标记为违规
    pub fn parse(&mut self, raw: &str) -> &[ReviewResult] {
        let Some(parsed) = parse_batch(raw) else {
            debug!("输入为空，跳过解析");
            return self.state.results();
        };

        let originals = &self.originals;
        self.state.replace(parsed, |candidates| {
            let mut results: Vec<ReviewResult> = candidates
                .iter()
                .enumerate()
                .map(|(i, candidate)| validate_update(candidate, i, originals))
                .collect();
            reject_duplicate_claims(&mut results);

            if results.len() != originals.len() {
                warn!(
                    "⚠️ 返回了 {} 道题目，但选中了 {} 道",
                    results.len(),
                    originals.len()
                );
                let message = format!(
                    "Returned {} questions but expected {}",
                    results.len(),
                    originals.len()
                );
                results.push(ReviewResult::synthetic(results.len(), message));
            }
            results
        });

        self.state.results()
    }

    /// 丢弃一条结果，丢弃后仍保留差异供核对
    pub fn discard(&mut self, position: usize) -> AppResult<bool> {
        self.state.discard(position)
    }

    /// 保存单条结果
    ///
    /// 对已保存 / 已丢弃 / 无效的结果是空操作
    pub async fn save_one<G: QuestionGateway>(&mut self, position: usize, gateway: &G) -> AppResult<bool> {
        let result = self.state.get(position)?;
        if !result.is_savable() {
            return Ok(false);
        }

        let original = result
            .id
            .and_then(|id| self.originals.get(id))
            .or(result.original.as_ref());
        let payload = match (original, result.candidate.as_ref()) {
            (Some(original), Some(candidate)) => build_update_payload(original, candidate),
            _ => Err("original missing".to_string()),
        };

        let outcome = match payload {
            Ok(payload) => gateway.update(&payload).await.map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(stored) => {
                // 刷新本地原题的时间戳，后续差异以新版本为基准
                if let Some(original) = self.originals.get_mut(stored.id) {
                    original.updated_at = stored.updated_at.clone();
                }
                let result = self.state.get_mut(position)?;
                result.saved = true;
                result.save_error = None;
                if let Some(original) = result.original.as_mut() {
                    original.updated_at = stored.updated_at.clone();
                }
                info!("✓ 题目已更新: #{}", stored.id);
                self.events.notify(ReviewEvent::QuestionUpdated {
                    position,
                    id: stored.id,
                });
                Ok(true)
            }
            Err(e) => {
                warn!("⚠️ 题目更新失败: 位置 {}: {}", position, e);
                self.state.get_mut(position)?.save_error = Some(e);
                Ok(false)
            }
        }
    }

    /// 按列表顺序逐条保存所有有效结果，单条失败不影响后续
    pub async fn save_all_valid<G: QuestionGateway>(&mut self, gateway: &G) -> AppResult<SaveSummary> {
        let positions = self.state.savable_positions();
        let mut summary = SaveSummary {
            attempted: positions.len(),
            ..Default::default()
        };

        for position in positions {
            if self.save_one(position, gateway).await? {
                summary.saved += 1;
            } else {
                summary.failed += 1;
            }
        }

        if summary.saved > 0 {
            self.events.notify(ReviewEvent::BatchSaved {
                mode: ReviewMode::Update,
                saved: summary.saved,
            });
        }

        Ok(summary)
    }
}

/// 同一道原题只能被一个候选认领，后来者追加违规并失效
fn reject_duplicate_claims(results: &mut [ReviewResult]) {
    let mut claimed: HashMap<i64, usize> = HashMap::new();
    for result in results.iter_mut() {
        let Some(id) = result.id.filter(|_| result.original.is_some()) else {
            continue;
        };
        match claimed.entry(id) {
            Entry::Occupied(first) => {
                warn!("⚠️ 位置 {} 与位置 {} 对应同一道题目 #{}", result.position, first.get(), id);
                result
                    .errors
                    .push(format!("id {} already matched by position {}", id, first.get()));
                result.valid = false;
            }
            Entry::Vacant(slot) => {
                slot.insert(result.position);
            }
        }
    }
}

/// 以原题整行为底，只覆盖题干、解析和各位置答案文本
///
/// 答案数量以原题为准，`isCorrect` 始终来自原题
pub fn build_update_payload(original: &QuestionRecord, candidate: &Value) -> Result<QuestionRecord, String> {
    let revision: Revision = serde_json::from_value(candidate.clone()).map_err(|e| e.to_string())?;
    if revision.answers.len() != original.answers.len() {
        return Err(format!(
            "answer count {} does not match original {}",
            revision.answers.len(),
            original.answers.len()
        ));
    }

    let mut payload = original.clone();
    payload.question = revision.question;
    payload.explanation = revision.explanation;
    payload.answers = original
        .answers
        .iter()
        .zip(revision.answers)
        .map(|(orig, revised)| Answer::new(revised.text, orig.is_correct))
        .collect();

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn original() -> QuestionRecord {
        QuestionRecord {
            id: 5,
            question: "Old".into(),
            answers: vec![Answer::new("A", true), Answer::new("B", false)],
            explanation: "<p>old</p>".into(),
            level: "Advanced".into(),
            category: Some("Security".into()),
            exam_code: "SY0".into(),
            inactive: true,
            created_at: Some("2024-01-01T00:00:00Z".into()),
            updated_at: None,
        }
    }

    #[test]
    fn test_payload_keeps_original_correctness_and_fields() {
        let candidate = json!({
            "id": 5,
            "question": "New",
            "explanation": "<p>new</p>",
            "answers": [{"text": "A2", "isCorrect": false}, {"text": "B2", "isCorrect": true}],
            "level": "Beginner",
            "category": "Other"
        });

        let payload = build_update_payload(&original(), &candidate).unwrap();
        assert_eq!(payload.question, "New");
        assert_eq!(payload.explanation, "<p>new</p>");
        assert_eq!(payload.answers, vec![Answer::new("A2", true), Answer::new("B2", false)]);
        assert_eq!(payload.level, "Advanced");
        assert_eq!(payload.category.as_deref(), Some("Security"));
        assert!(payload.inactive);
        assert_eq!(payload.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_duplicate_claims_keep_first_match() {
        let mut second = original();
        second.id = 6;
        let originals = Originals::from_selection(vec![original(), second]);
        let candidate = json!({
            "id": 5,
            "question": "New",
            "explanation": "<p>new</p>",
            "answers": [{"text": "A", "isCorrect": true}, {"text": "B", "isCorrect": false}]
        });

        let mut results = vec![
            validate_update(&candidate, 0, &originals),
            validate_update(&candidate, 1, &originals),
        ];
        reject_duplicate_claims(&mut results);

        assert!(results[0].valid, "{:?}", results[0].errors);
        assert!(!results[1].valid);
        assert_eq!(results[1].errors, vec!["id 5 already matched by position 0".to_string()]);
    }

    #[test]
    fn test_payload_rejects_length_mismatch() {
        let candidate = json!({
            "question": "New",
            "explanation": "<p>new</p>",
            "answers": [{"text": "A2", "isCorrect": true}]
        });
        assert!(build_update_payload(&original(), &candidate).is_err());
    }
}

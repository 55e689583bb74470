//! 新建模式审核会话
//!
//! 流程：粘贴文本 → 解析校验 → 操作员逐条 / 批量保存有效题目

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{CreateRules, ReviewMode};
use crate::error::AppResult;
use crate::models::exam::ExamSummary;
use crate::models::question::{Answer, NewQuestion};
use crate::review::parser::parse_batch;
use crate::review::result::{ReviewResult, SaveSummary};
use crate::review::validator::validate_new;
use crate::services::gateway::QuestionGateway;
use crate::workflow::events::{EventSink, ReviewEvent};
use crate::workflow::session_state::SessionState;

/// 通过校验后的候选题目
#[derive(Debug, Deserialize)]
struct CreateCandidate {
    question: String,
    answers: Vec<Answer>,
    explanation: String,
    level: String,
    category: String,
    exam_code: String,
}

/// 新建模式会话
pub struct CreateSession {
    rules: CreateRules,
    exam: ExamSummary,
    state: SessionState,
    events: EventSink,
}

impl CreateSession {
    pub fn new(rules: CreateRules, exam: ExamSummary) -> Self {
        Self {
            rules,
            exam,
            state: SessionState::default(),
            events: EventSink::default(),
        }
    }

    /// 连接事件出口
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn rules(&self) -> &CreateRules {
        &self.rules
    }

    pub fn results(&self) -> &[ReviewResult] {
        self.state.results()
    }

    /// 本次解析是否经过了文本清洗
    pub fn sanitized(&self) -> bool {
        self.state.sanitized()
    }

    /// 解析并校验粘贴的文本，替换之前的全部结果
    ///
    /// 空白输入不做任何事
    pub fn parse(&mut self, raw: &str) -> &[ReviewResult] {
        let Some(parsed) = parse_batch(raw) else {
            debug!("输入为空，跳过解析");
            return self.state.results();
        };

        let rules = &self.rules;
        self.state.replace(parsed, |candidates| {
            candidates
                .into_iter()
                .enumerate()
                .map(|(i, candidate)| {
                    let errors = validate_new(&candidate, rules);
                    ReviewResult::checked(i, candidate, errors)
                })
                .collect()
        });

        self.state.results()
    }

    /// 丢弃一条结果
    pub fn discard(&mut self, position: usize) -> AppResult<bool> {
        self.state.discard(position)
    }

    /// 保存单条结果
    ///
    /// 返回是否保存成功；不可保存的结果直接返回 `Ok(false)`，
    /// 网关失败记录在该条结果的 `save_error` 上
    pub async fn save_one<G: QuestionGateway>(&mut self, position: usize, gateway: &G) -> AppResult<bool> {
        let result = self.state.get(position)?;
        if !result.is_savable() {
            return Ok(false);
        }

        let payload = result
            .candidate
            .as_ref()
            .ok_or_else(|| "candidate missing".to_string())
            .and_then(|c| build_new_question(c, &self.exam));

        let outcome = match payload {
            Ok(payload) => gateway.insert(&payload).await.map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        let result = self.state.get_mut(position)?;
        match outcome {
            Ok(stored) => {
                result.saved = true;
                result.save_error = None;
                result.id = Some(stored.id);
                info!("✓ 题目已创建: 位置 {} → #{}", position, stored.id);
                self.events.notify(ReviewEvent::QuestionCreated {
                    position,
                    id: stored.id,
                });
                Ok(true)
            }
            Err(e) => {
                warn!("⚠️ 题目创建失败: 位置 {}: {}", position, e);
                result.save_error = Some(e);
                Ok(false)
            }
        }
    }

    /// 按列表顺序逐条保存所有有效结果
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
                mode: ReviewMode::Create,
                saved: summary.saved,
            });
        }

        Ok(summary)
    }
}

/// 由候选题目构建写入载荷
///
/// 题干和解析去掉首尾空白；inactive 跟随考试的启用状态
pub fn build_new_question(candidate: &Value, exam: &ExamSummary) -> Result<NewQuestion, String> {
    let c: CreateCandidate = serde_json::from_value(candidate.clone()).map_err(|e| e.to_string())?;

    Ok(NewQuestion {
        question: c.question.trim().to_string(),
        answers: c.answers,
        explanation: c.explanation.trim().to_string(),
        level: c.level,
        category: c.category,
        exam_code: c.exam_code,
        inactive: exam.new_question_inactive(),
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_new_question_trims_and_copies_inactive() {
        let exam = ExamSummary {
            exam_code: "N10".into(),
            exam_name: "Network+".into(),
            vendor: None,
            is_active: false,
        };
        let candidate = json!({
            "question": "  Q1 \n",
            "answers": [{"text": "A", "isCorrect": true, "note": "extra"}, {"text": "B", "isCorrect": false}],
            "explanation": " <p>because</p> ",
            "level": "Beginner",
            "category": "Networking",
            "exam_code": "N10"
        });

        let payload = build_new_question(&candidate, &exam).unwrap();
        assert_eq!(payload.question, "Q1");
        assert_eq!(payload.explanation, "<p>because</p>");
        assert!(payload.inactive);
        assert_eq!(payload.answers, vec![Answer::new("A", true), Answer::new("B", false)]);
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.created_at).is_ok());
    }
}

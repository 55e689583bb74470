//! 持久化网关 - 业务能力层
//!
//! 审核流程只通过这两个操作写数据库，不关心背后是哪种存储

use std::future::Future;

use crate::clients::SupabaseClient;
use crate::error::AppResult;
use crate::models::question::{NewQuestion, QuestionRecord};

/// 题目持久化能力
///
/// 调用方负责是否重试，网关本身不做自动重试
pub trait QuestionGateway {
    /// 插入新题目，返回带生成 ID 的行
    fn insert(&self, question: &NewQuestion) -> impl Future<Output = AppResult<QuestionRecord>> + Send;

    /// 整行更新，返回带新 `updated_at` 的行
    fn update(&self, question: &QuestionRecord) -> impl Future<Output = AppResult<QuestionRecord>> + Send;
}

impl QuestionGateway for SupabaseClient {
    async fn insert(&self, question: &NewQuestion) -> AppResult<QuestionRecord> {
        self.insert_question(question).await
    }

    async fn update(&self, question: &QuestionRecord) -> AppResult<QuestionRecord> {
        self.update_question(question).await
    }
}

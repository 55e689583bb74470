/// 数据库 REST API 客户端
///
/// 封装所有与托管数据库（PostgREST 接口）相关的调用逻辑
use crate::config::Config;
use crate::error::{AppError, AppResult, GatewayError};
use crate::models::exam::ExamSummary;
use crate::models::question::{NewQuestion, QuestionRecord};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const QUESTIONS_TABLE: &str = "questions";
const EXAMS_TABLE: &str = "exam_pages";
const CATEGORIES_TABLE: &str = "exam_categories";

#[derive(Deserialize)]
struct CategoryRow {
    category_name: Option<String>,
}

/// 数据库客户端
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// 创建新的数据库客户端
    pub fn new(config: &Config) -> Self {
        Self::with_credentials(&config.supabase_url, &config.supabase_anon_key)
    }

    pub fn with_credentials(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
    }

    /// 测试连接
    pub async fn test_connection(&self) -> AppResult<()> {
        let url = self.endpoint(EXAMS_TABLE);
        let response = self
            .request(Method::GET, &url)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        let _: Vec<serde_json::Value> = Self::read_rows(&url, response).await?;
        debug!("数据库连接正常: {}", self.base_url);
        Ok(())
    }

    /// 获取考试信息
    pub async fn fetch_exam(&self, exam_code: &str) -> AppResult<ExamSummary> {
        let url = self.endpoint(EXAMS_TABLE);
        let filter = format!("eq.{}", exam_code);
        let response = self
            .request(Method::GET, &url)
            .query(&[
                ("select", "exam_code,exam_name,vendor,is_active"),
                ("exam_code", filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        let rows: Vec<ExamSummary> = Self::read_rows(&url, response).await?;
        rows.into_iter().next().ok_or_else(|| {
            GatewayError::NotFound {
                table: EXAMS_TABLE.to_string(),
                key: exam_code.to_string(),
            }
            .into()
        })
    }

    /// 获取考试已配置的分类名（按 display_order 排序，去重）
    pub async fn fetch_categories(&self, exam_code: &str) -> AppResult<Vec<String>> {
        let url = self.endpoint(CATEGORIES_TABLE);
        let filter = format!("eq.{}", exam_code);
        let response = self
            .request(Method::GET, &url)
            .query(&[
                ("select", "category_name"),
                ("exam_code", filter.as_str()),
                ("order", "display_order.asc"),
            ])
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        let rows: Vec<CategoryRow> = Self::read_rows(&url, response).await?;
        Ok(category_names(rows))
    }

    /// 按 ID 获取题目，返回顺序与 `ids` 一致
    ///
    /// 不存在的 ID 会被跳过
    pub async fn fetch_questions_by_ids(&self, ids: &[i64]) -> AppResult<Vec<QuestionRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint(QUESTIONS_TABLE);
        let id_list = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        let filter = format!("in.({})", id_list);
        let response = self
            .request(Method::GET, &url)
            .query(&[("select", "*"), ("id", filter.as_str())])
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        let rows: Vec<QuestionRecord> = Self::read_rows(&url, response).await?;
        debug!("获取到 {} / {} 道题目", rows.len(), ids.len());

        Ok(order_by_selection(rows, ids))
    }

    /// 插入新题目，返回数据库中的行
    pub async fn insert_question(&self, question: &NewQuestion) -> AppResult<QuestionRecord> {
        let url = self.endpoint(QUESTIONS_TABLE);
        debug!("插入题目 Payload: {}", serde_json::to_string(question).unwrap_or_default());

        let response = self
            .write_request(Method::POST, &url, question)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        Self::first_row(&url, response).await
    }

    /// 更新题目（整行写回），返回更新后的行
    pub async fn update_question(&self, question: &QuestionRecord) -> AppResult<QuestionRecord> {
        let url = self.endpoint(QUESTIONS_TABLE);
        let mut payload = question.clone();
        payload.updated_at = Some(chrono::Utc::now().to_rfc3339());
        debug!("更新题目 #{} Payload: {}", payload.id, serde_json::to_string(&payload).unwrap_or_default());

        let filter = format!("eq.{}", payload.id);
        let response = self
            .write_request(Method::PATCH, &url, &payload)
            .query(&[("id", filter.as_str())])
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;

        Self::first_row(&url, response).await
    }

    fn write_request<T: Serialize + ?Sized>(&self, method: Method, url: &str, body: &T) -> RequestBuilder {
        self.request(method, url)
            .header("Prefer", "return=representation")
            .json(body)
    }

    async fn first_row(url: &str, response: Response) -> AppResult<QuestionRecord> {
        let rows: Vec<QuestionRecord> = Self::read_rows(url, response).await?;
        rows.into_iter().next().ok_or_else(|| {
            GatewayError::EmptyResponse {
                endpoint: url.to_string(),
            }
            .into()
        })
    }

    /// 检查状态码并解码返回的行
    async fn read_rows<T: DeserializeOwned>(url: &str, response: Response) -> AppResult<Vec<T>> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;

        if !status.is_success() {
            return Err(GatewayError::BadResponse {
                endpoint: url.to_string(),
                status: status.as_u16(),
                message: extract_error_message(&body),
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|e| {
            GatewayError::DecodeFailed {
                endpoint: url.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// 按选择顺序排列返回的行
fn order_by_selection(rows: Vec<QuestionRecord>, ids: &[i64]) -> Vec<QuestionRecord> {
    let mut by_id: HashMap<i64, QuestionRecord> = rows.into_iter().map(|r| (r.id, r)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn category_names(rows: Vec<CategoryRow>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(rows.len());
    for name in rows.into_iter().filter_map(|r| r.category_name) {
        let name = name.trim().to_string();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// 提取 PostgREST 错误体里的 message 字段
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Answer;

    fn row(id: i64) -> QuestionRecord {
        QuestionRecord {
            id,
            question: format!("Q{}", id),
            answers: vec![Answer::new("A", true), Answer::new("B", false)],
            explanation: "<p>x</p>".into(),
            level: "Beginner".into(),
            category: None,
            exam_code: "N10".into(),
            inactive: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_order_by_selection() {
        let ordered = order_by_selection(vec![row(1), row(2), row(3)], &[3, 9, 1]);
        let ids: Vec<i64> = ordered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_category_names_skip_blank_and_duplicates() {
        let rows: Vec<CategoryRow> = serde_json::from_str(
            r#"[{"category_name":"Security"},{"category_name":null},{"category_name":" "},{"category_name":"Networking"},{"category_name":"Security"}]"#,
        )
        .unwrap();
        assert_eq!(category_names(rows), vec!["Security".to_string(), "Networking".to_string()]);
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"code":"23505","message":"duplicate key value"}"#),
            "duplicate key value"
        );
        assert_eq!(extract_error_message(" Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = SupabaseClient::with_credentials("https://db.example.co/", "key");
        assert_eq!(client.endpoint("questions"), "https://db.example.co/rest/v1/questions");
    }
}

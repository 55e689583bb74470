//! # Question Review
//!
//! 认证考试题库的批量出题 / 批量修订审核工具：
//! 把大模型返回的 JSON 文本解析、校验、与原题对齐，再写回托管数据库。
//!
//! ## 架构设计
//!
//! ### ① 模型层（Models）
//! - `models/` - 题目、答案、难度、考试等数据结构，以及设置文件加载
//!
//! ### ② 校验核心（Review）
//! - `review/sanitize` - 有序的文本清洗规则
//! - `review/parser` - 批量解析（清洗 + JSON 解码）
//! - `review/validator` - 新建 / 更新两种模式的逐条校验
//! - `review/originals` - 更新模式下的原题索引
//!
//! ### ③ 能力层（Clients / Services）
//! - `clients/` - 数据库 REST 客户端
//! - `services/` - 持久化网关、无效题目报告
//!
//! ### ④ 流程层（Workflow）
//! - `CreateSession` - 新建模式：解析 → 校验 → 保存
//! - `UpdateSession` - 更新模式：解析 → 对齐原题 → 差异 → 回写
//!
//! ### ⑤ 编排层（App）
//! - `app` - 读取配置与输入，运行会话，输出统计

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod review;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::SupabaseClient;
pub use config::{Config, CreateRules, ReviewMode, ReviewSettings};
pub use error::{AppError, AppResult};
pub use models::{Answer, ExamSummary, Level, NewQuestion, QuestionRecord};
pub use review::{ReviewResult, SaveSummary};
pub use services::QuestionGateway;
pub use workflow::{CreateSession, EventSink, ReviewEvent, UpdateSession};

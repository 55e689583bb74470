use crate::clients::SupabaseClient;
use crate::config::{Config, ReviewMode, ReviewSettings};
use crate::error::BusinessError;
use crate::models::loaders::{load_input_text, load_review_settings};
use crate::review::result::{ReviewResult, SaveSummary};
use crate::services::ReportWriter;
use crate::utils::logging::{log_parse_summary, log_startup, print_final_stats};
use crate::workflow::{CreateSession, EventSink, UpdateSession};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 应用主结构
pub struct App {
    config: Config,
    settings: ReviewSettings,
    client: SupabaseClient,
}

/// 当前会话（按模式二选一）
enum Session {
    Create(CreateSession),
    Update(UpdateSession),
}

impl Session {
    fn parse(&mut self, raw: &str) -> &[ReviewResult] {
        match self {
            Session::Create(s) => s.parse(raw),
            Session::Update(s) => s.parse(raw),
        }
    }

    fn sanitized(&self) -> bool {
        match self {
            Session::Create(s) => s.sanitized(),
            Session::Update(s) => s.sanitized(),
        }
    }

    async fn save_all_valid(&mut self, client: &SupabaseClient) -> Result<SaveSummary> {
        let summary = match self {
            Session::Create(s) => s.save_all_valid(client).await?,
            Session::Update(s) => s.save_all_valid(client).await?,
        };
        Ok(summary)
    }
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let settings = load_review_settings(Path::new(&config.review_settings_path)).await?;
        log_startup(&settings);

        let client = SupabaseClient::new(&config);
        client
            .test_connection()
            .await
            .context("数据库连接测试失败")?;
        info!("✓ 数据库连接正常");

        Ok(Self {
            config,
            settings,
            client,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let (events, mut receiver) = EventSink::channel();
        let listener: JoinHandle<()> = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                info!("🔔 {}", event);
            }
        });

        let mut session = self.open_session(events).await?;

        let raw = load_input_text(Path::new(&self.config.input_file)).await?;
        let results = session.parse(&raw).to_vec();
        if results.is_empty() {
            info!("⚠️ 输入中没有可审核的题目，程序结束");
            drop(session);
            let _ = listener.await;
            return Ok(());
        }
        log_parse_summary(&results, session.sanitized());

        let report = ReportWriter::with_path(&self.config.reject_report_file);
        report.init(self.settings.mode, &self.settings.exam_code)?;
        let rejected = report.write_rejected(&results)?;

        let summary = if self.config.auto_save {
            info!("📤 正在保存全部有效题目...");
            Some(session.save_all_valid(&self.client).await?)
        } else {
            None
        };

        // 关闭事件出口，等待剩余通知输出完毕
        drop(session);
        if let Err(e) = listener.await {
            error!("事件监听任务异常退出: {}", e);
        }

        print_final_stats(summary.as_ref(), rejected, report.path());
        Ok(())
    }

    async fn open_session(&self, events: EventSink) -> Result<Session> {
        match self.settings.mode {
            ReviewMode::Create => {
                let rules = self.settings.create_rules()?;
                let exam = self
                    .client
                    .fetch_exam(&self.settings.exam_code)
                    .await
                    .with_context(|| format!("无法获取考试 {}", self.settings.exam_code))?;
                info!("✓ 考试: {} (启用: {})", exam, exam.is_active);

                let categories = self
                    .client
                    .fetch_categories(&self.settings.exam_code)
                    .await
                    .with_context(|| format!("无法获取考试 {} 的分类", self.settings.exam_code))?;
                rules.ensure_known_category(&categories)?;
                Ok(Session::Create(CreateSession::new(rules, exam).with_events(events)))
            }
            ReviewMode::Update => {
                let ids = &self.settings.selected_ids;
                if ids.is_empty() {
                    return Err(BusinessError::EmptySelection.into());
                }
                let selection = self.client.fetch_questions_by_ids(ids).await?;
                let missing: Vec<i64> = ids
                    .iter()
                    .copied()
                    .filter(|id| !selection.iter().any(|q| q.id == *id))
                    .collect();
                if !missing.is_empty() {
                    return Err(BusinessError::MissingOriginals { ids: missing }.into());
                }
                info!("✓ 已加载 {} 道待修订题目", selection.len());
                Ok(Session::Update(UpdateSession::new(selection).with_events(events)))
            }
        }
    }
}

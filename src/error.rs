use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入文本解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 数据库网关错误
    #[error("数据库错误: {0}")]
    Gateway(#[from] GatewayError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
}

/// 批量文本解析错误
///
/// Display 文本会原样展示给操作员，所以保持英文且简短
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// JSON 语法错误（保留解析器原始信息）
    #[error("{message}")]
    Json { message: String },
    /// 根节点既不是数组，也不是带 questions 数组的对象
    #[error("Root must have questions array")]
    RootShape,
}

/// 数据库网关错误
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 网络请求失败
    #[error("request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回非 2xx 状态
    #[error("{endpoint} returned {status}: {message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 返回空结果
    #[error("{endpoint} returned no rows")]
    EmptyResponse { endpoint: String },
    /// 返回内容无法解码
    #[error("could not decode response from {endpoint}: {message}")]
    DecodeFailed { endpoint: String, message: String },
    /// 记录不存在
    #[error("{table} row not found: {key}")]
    NotFound { table: String, key: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 正确答案数量必须 >= 1
    #[error("required_correct 必须 >= 1 (当前: {0})")]
    RequiredCorrectTooSmall(usize),
    /// 最少答案数必须 >= 2
    #[error("min_answers 必须 >= 2 (当前: {0})")]
    MinAnswersTooSmall(usize),
    /// 最多答案数不能小于最少答案数
    #[error("max_answers ({max}) 不能小于 min_answers ({min})")]
    AnswerRangeInverted { min: usize, max: usize },
    /// 最多答案数超过上限
    #[error("max_answers ({max}) 不能超过 {cap}")]
    MaxAnswersTooLarge { max: usize, cap: usize },
    /// 正确答案数必须小于最多答案数，至少保留一个干扰项
    #[error("required_correct ({required}) 必须小于 max_answers ({max})")]
    NoDistractorLeft { required: usize, max: usize },
    /// 分类不属于该考试
    #[error("分类 {category} 不属于考试 {exam_code} (可选: {known:?})")]
    UnknownCategory {
        category: String,
        exam_code: String,
        known: Vec<String>,
    },
    /// 必填设置项为空
    #[error("设置项 {0} 不能为空")]
    MissingSetting(&'static str),
}

/// 业务逻辑错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusinessError {
    /// 位置超出结果列表范围
    #[error("位置 {position} 超出范围 (共 {len} 条结果)")]
    PositionOutOfRange { position: usize, len: usize },
    /// 更新模式下没有选中任何题目
    #[error("更新模式需要至少选择一道题目")]
    EmptySelection,
    /// 选中的题目在数据库中不存在
    #[error("选中的题目不存在: {ids:?}")]
    MissingOriginals { ids: Vec<i64> },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Gateway(GatewayError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

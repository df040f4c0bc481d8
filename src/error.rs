//! 统一错误处理
//!
//! 提供翻译流程中所有阶段共用的错误类型和分类机制

use thiserror::Error;

/// 翻译错误类型
///
/// 覆盖从凭证加载、资源解析到批次分发和结果合并的完整流程。
/// 每个致命错误都携带可操作的提示信息，因为这是一个交互式工具。
#[derive(Error, Debug, Clone)]
pub enum TranslateError {
    /// 未配置任何凭证，运行在任何网络调用前即中止
    #[error("未找到任何 API 凭证。请在配置文件的 api_keys 中添加凭证，\
             或设置环境变量 GOOGLE_AI_API_KEY（可在 https://aistudio.google.com/app/apikey 免费申请）")]
    NoCredentials,

    /// 上游返回 HTTP 429，凭证暂时被限流
    #[error("请求频率已达上限（HTTP 429），凭证 {key} 暂时被限流")]
    RateLimit {
        /// 被限流凭证的掩码形式（仅前缀）
        key: String,
    },

    /// 请求超时，不自动重试，提示缩小批次
    #[error("翻译请求超时（{timeout_secs} 秒，批次含 {batch_size} 条字符串）。\
             建议把批次大小降到 {batch_size} 以下，或检查网络连接")]
    Timeout {
        timeout_secs: u64,
        batch_size: usize,
    },

    /// 上游接口返回非 200 状态
    #[error("上游接口返回异常状态 {status}: {body}")]
    Upstream { status: u16, body: String },

    /// 网络传输层错误（连接失败、传输中断等）
    #[error("网络错误: {0}")]
    Network(String),

    /// 响应形状或基数校验失败，不重试
    #[error("响应校验失败: {0}")]
    Validation(String),

    /// 资源文档解析失败
    #[error("资源文件解析失败: {0}")]
    Parse(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 用户主动取消，不属于故障
    #[error("翻译任务已取消")]
    Cancelled,

    /// 文件读写错误
    #[error("IO 错误: {0}")]
    Io(String),
}

impl TranslateError {
    /// 是否允许换一个凭证重试
    ///
    /// 仅传输层故障值得换凭证再试一次；限流走独立的冷却逻辑，
    /// 超时和校验失败重试同样的请求没有意义。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranslateError::Network(_) | TranslateError::Upstream { .. }
        )
    }

    /// 是否为取消信号
    ///
    /// 取消不计入错误统计，调用方不应将其记录为故障。
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TranslateError::Cancelled)
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslateError::NoCredentials => ErrorSeverity::Critical,
            TranslateError::Config(_) => ErrorSeverity::Critical,
            TranslateError::RateLimit { .. } => ErrorSeverity::Warning,
            TranslateError::Network(_) => ErrorSeverity::Warning,
            TranslateError::Timeout { .. } => ErrorSeverity::Warning,
            TranslateError::Upstream { .. } => ErrorSeverity::Error,
            TranslateError::Validation(_) => ErrorSeverity::Error,
            TranslateError::Parse(_) => ErrorSeverity::Error,
            TranslateError::Io(_) => ErrorSeverity::Error,
            TranslateError::Cancelled => ErrorSeverity::Info,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslateError::NoCredentials => ErrorCategory::Credentials,
            TranslateError::RateLimit { .. } => ErrorCategory::RateLimit,
            TranslateError::Timeout { .. } => ErrorCategory::Timeout,
            TranslateError::Upstream { .. } => ErrorCategory::Upstream,
            TranslateError::Network(_) => ErrorCategory::Network,
            TranslateError::Validation(_) => ErrorCategory::Validation,
            TranslateError::Parse(_) => ErrorCategory::Parsing,
            TranslateError::Config(_) => ErrorCategory::Configuration,
            TranslateError::Cancelled => ErrorCategory::Cancellation,
            TranslateError::Io(_) => ErrorCategory::Io,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Credentials,
    RateLimit,
    Timeout,
    Upstream,
    Network,
    Validation,
    Parsing,
    Configuration,
    Cancellation,
    Io,
}

impl From<std::io::Error> for TranslateError {
    fn from(error: std::io::Error) -> Self {
        TranslateError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(error: serde_json::Error) -> Self {
        TranslateError::Validation(format!("JSON 解析错误: {error}"))
    }
}

impl From<toml::de::Error> for TranslateError {
    fn from(error: toml::de::Error) -> Self {
        TranslateError::Config(format!("TOML 解析错误: {error}"))
    }
}

/// 错误结果类型别名
pub type TranslateResult<T> = Result<T, TranslateError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录并返回错误
    pub fn log_error<T>(error: TranslateError) -> TranslateResult<T> {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("{}", error),
            ErrorSeverity::Warning => tracing::warn!("{}", error),
            ErrorSeverity::Error => tracing::error!("{}", error),
            ErrorSeverity::Critical => tracing::error!("严重错误: {}", error),
        }

        Err(error)
    }
}

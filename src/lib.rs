//! # Stringflow Library
//!
//! 批量翻译 Android 字符串资源的工具库：读取源资源文件，把
//! 字符串切成批次并发调用生成式翻译端点（多凭证轮换、限流
//! 退避），再把结果按语言幂等地合并回 values-<lang> 资源文件。
//!
//! ## 模块组织
//!
//! - `resource` - 资源文件编解码、转义与合并
//! - `pipeline` - 限定符过滤和批次划分
//! - `api` - 翻译端点客户端与提示词构造
//! - `keys` - 凭证池与轮换
//! - `orchestrator` - 并发编排、重试、进度与取消
//! - `config` - 配置管理
//! - `module` - Android 模块输入模型
//! - `error` - 统一错误处理

pub mod api;
pub mod config;
pub mod error;
pub mod keys;
pub mod module;
pub mod orchestrator;
pub mod pipeline;
pub mod resource;

// Re-export commonly used items for convenience
pub use api::{GeminiClient, TranslationApi, TranslationRequest, TranslationResponse};
pub use config::{ConfigManager, Settings};
pub use error::{TranslateError, TranslateResult};
pub use keys::{ApiKey, KeyPool};
pub use module::AndroidModule;
pub use orchestrator::{
    CancelToken, NoopPacer, Pacer, ProgressEvent, ProgressSink, RunReport, RunStage,
    TranslationOrchestrator, WallClockPacer,
};
pub use pipeline::filter::ResourceFilter;

//! 配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, Settings};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 批次处理相关
    pub const DEFAULT_BATCH_SIZE: usize = 50;
    pub const MAX_BATCH_SIZE: usize = 100;

    // 速率相关：免费档每个凭证大约每分钟 10 次调用
    pub const PER_KEY_CALLS_PER_MINUTE: usize = 10;
    pub const BATCH_COOLDOWN: Duration = Duration::from_millis(2000);
    pub const GROUP_COOLDOWN: Duration = Duration::from_millis(2000);
    pub const FOLDER_COOLDOWN: Duration = Duration::from_millis(1000);
    pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(4);
    pub const KEY_SWITCH_COOLDOWN: Duration = Duration::from_secs(4);

    // 超时：基础 30 秒 + 每条字符串 5 秒，上限 5 分钟
    pub const BASE_TIMEOUT_SECS: u64 = 30;
    pub const PER_STRING_TIMEOUT_SECS: u64 = 5;
    pub const MIN_TIMEOUT_SECS: u64 = 30;
    pub const MAX_TIMEOUT_SECS: u64 = 300;
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const MODEL_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

    // 默认 API 设置
    pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const MODEL_CONFIG_URL: &str =
        "https://storage.googleapis.com/stringflow-release/model-config.json";

    // 上游错误正文截断长度
    pub const ERROR_BODY_LIMIT: usize = 500;

    // 资源文件约定
    pub const RESOURCE_FILE_NAME: &str = "strings.xml";
    pub const VALUES_PREFIX: &str = "values";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "stringflow.toml",
        ".stringflow.toml",
        "~/.config/stringflow/config.toml",
        "/etc/stringflow/config.toml",
    ];

    // 环境变量里的默认凭证（按顺序探测）
    pub const CREDENTIAL_ENV_VARS: &[&str] = &[
        "GOOGLE_AI_API_KEY",
        "GOOGLE_AI_API_KEY_1",
        "GOOGLE_AI_API_KEY_2",
    ];
}

/// 检查是否存在配置文件
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS.iter().any(|path| {
        let expanded = shellexpand::tilde(path);
        std::path::Path::new(expanded.as_ref()).exists()
    })
}

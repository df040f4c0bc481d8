//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::error::{TranslateError, TranslateResult};

/// 翻译运行配置
///
/// 覆盖凭证来源、批次大小、速率预算和各阶段冷却时间。
/// 所有字段都有可用的默认值，配置文件只需覆盖关心的部分。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    // 基础配置
    pub source_language: String,
    pub api_base: String,
    /// 固定模型标识；为空时先尝试远程查询再退回默认值
    pub model: Option<String>,
    pub model_config_url: Option<String>,

    // 凭证配置
    pub api_keys: Vec<String>,
    /// 是否合并环境变量里的默认凭证
    pub use_default_keys: bool,

    // 批次与速率配置
    pub batch_size: usize,
    pub per_key_calls_per_minute: usize,
    pub batch_cooldown_ms: u64,
    pub group_cooldown_ms: u64,
    pub rate_limit_cooldown_ms: u64,
    pub key_switch_cooldown_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            api_base: constants::DEFAULT_API_BASE.to_string(),
            model: None,
            model_config_url: None,

            api_keys: Vec::new(),
            use_default_keys: true,

            batch_size: constants::DEFAULT_BATCH_SIZE,
            per_key_calls_per_minute: constants::PER_KEY_CALLS_PER_MINUTE,
            batch_cooldown_ms: constants::BATCH_COOLDOWN.as_millis() as u64,
            group_cooldown_ms: constants::GROUP_COOLDOWN.as_millis() as u64,
            rate_limit_cooldown_ms: constants::RATE_LIMIT_COOLDOWN.as_millis() as u64,
            key_switch_cooldown_ms: constants::KEY_SWITCH_COOLDOWN.as_millis() as u64,
        }
    }
}

impl Settings {
    /// 验证配置
    pub fn validate(&self) -> TranslateResult<()> {
        if self.batch_size == 0 {
            return Err(TranslateError::Config("批次大小不能为 0".to_string()));
        }

        if self.batch_size > constants::MAX_BATCH_SIZE {
            return Err(TranslateError::Config(format!(
                "批次大小 {} 超过上限 {}，过大的批次容易触发超时",
                self.batch_size,
                constants::MAX_BATCH_SIZE
            )));
        }

        if self.per_key_calls_per_minute == 0 {
            return Err(TranslateError::Config(
                "每个凭证的每分钟调用预算不能为 0".to_string(),
            ));
        }

        if self.source_language.trim().is_empty() {
            return Err(TranslateError::Config("源语言不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        if let Ok(lang) = std::env::var("STRINGFLOW_SOURCE_LANG") {
            if !lang.trim().is_empty() {
                self.source_language = lang;
            }
        }

        if let Ok(base) = std::env::var("STRINGFLOW_API_BASE") {
            if !base.trim().is_empty() {
                tracing::info!("环境变量覆盖 API 地址: {}", base);
                self.api_base = base;
            }
        }

        if let Ok(model) = std::env::var("STRINGFLOW_MODEL") {
            if !model.trim().is_empty() {
                self.model = Some(model);
            }
        }

        if let Ok(size) = std::env::var("STRINGFLOW_BATCH_SIZE") {
            match size.parse::<usize>() {
                Ok(parsed) => self.batch_size = parsed,
                Err(_) => tracing::warn!("忽略无效的 STRINGFLOW_BATCH_SIZE: {}", size),
            }
        }
    }

    // Duration 便捷取值
    pub fn batch_cooldown(&self) -> Duration {
        Duration::from_millis(self.batch_cooldown_ms)
    }

    pub fn group_cooldown(&self) -> Duration {
        Duration::from_millis(self.group_cooldown_ms)
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_millis(self.rate_limit_cooldown_ms)
    }

    pub fn key_switch_cooldown(&self) -> Duration {
        Duration::from_millis(self.key_switch_cooldown_ms)
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    settings: Settings,
}

impl ConfigManager {
    /// 创建新的配置管理器
    ///
    /// 依次执行：加载 .env 文件、按搜索路径查找配置文件、
    /// 应用环境变量覆盖、验证配置。
    pub fn new() -> TranslateResult<Self> {
        let mut settings = Self::load_settings()?;
        settings.apply_env_overrides();
        settings.validate()?;

        Ok(Self { settings })
    }

    /// 使用指定配置文件创建管理器
    pub fn from_file(path: &Path) -> TranslateResult<Self> {
        Self::load_dotenv();

        let mut settings = Self::load_from_file(&path.to_string_lossy())?;
        settings.apply_env_overrides();
        settings.validate()?;

        Ok(Self { settings })
    }

    /// 获取配置
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 从搜索路径加载配置
    fn load_settings() -> TranslateResult<Settings> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        // 查找配置文件
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(Settings::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> TranslateResult<Settings> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslateError::Config(format!("读取配置文件失败: {e}")))?;

        // 尝试 TOML 格式
        if path.ends_with(".toml") {
            toml::from_str(&content)
                .map_err(|e| TranslateError::Config(format!("解析 TOML 配置失败: {e}")))
        } else {
            // 尝试 JSON 格式
            serde_json::from_str(&content)
                .map_err(|e| TranslateError::Config(format!("解析 JSON 配置失败: {e}")))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() {
                if dotenv::from_filename(env_file).is_ok() {
                    tracing::info!("已加载环境变量文件: {}", env_file);
                    break;
                }
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslateResult<()> {
        let settings = Settings::default();
        let content = toml::to_string_pretty(&settings)
            .map_err(|e| TranslateError::Config(format!("序列化配置失败: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| TranslateError::Config(format!("写入配置文件失败: {e}")))?;

        Ok(())
    }
}

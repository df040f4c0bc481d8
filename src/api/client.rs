//! 生成式翻译端点客户端
//!
//! 所有网络调用都是工作线程上的阻塞调用，没有事件循环。
//! 凭证通过查询参数传递；请求超时按批次大小动态计算。

use once_cell::sync::OnceCell;

use crate::config::{constants, Settings};
use crate::error::{TranslateError, TranslateResult};
use crate::keys::ApiKey;

use super::prompt::build_prompt;
use super::{
    GenerateRequest, GenerateResponse, ModelConfig, TranslationApi, TranslationRequest,
    TranslationResponse, WireContent, WirePart,
};

/// 生成式翻译端点的阻塞客户端
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    /// 配置固定的模型标识；为空时走远程查询
    fixed_model: Option<String>,
    model_config_url: String,
    /// 查询到的模型标识，进程内只解析一次
    resolved_model: OnceCell<String>,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> TranslateResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(constants::CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TranslateError::Network(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            fixed_model: settings.model.clone(),
            model_config_url: settings
                .model_config_url
                .clone()
                .unwrap_or_else(|| constants::MODEL_CONFIG_URL.to_string()),
            resolved_model: OnceCell::new(),
        })
    }

    /// 按批次大小计算请求超时
    ///
    /// 基础 30 秒，每条字符串加 5 秒，限制在 30 秒到 5 分钟之间。
    pub fn calculate_timeout(string_count: usize) -> std::time::Duration {
        let dynamic =
            constants::BASE_TIMEOUT_SECS + string_count as u64 * constants::PER_STRING_TIMEOUT_SECS;
        let clamped = dynamic.clamp(constants::MIN_TIMEOUT_SECS, constants::MAX_TIMEOUT_SECS);
        std::time::Duration::from_secs(clamped)
    }

    /// 当前使用的模型标识
    ///
    /// 优先级：配置固定值 > 远程查询结果 > 内置默认值。
    /// 远程查询是尽力而为的加速手段，任何失败都不致命。
    pub fn model(&self) -> &str {
        if let Some(model) = &self.fixed_model {
            return model;
        }

        self.resolved_model.get_or_init(|| {
            match self.lookup_model() {
                Some(model) => {
                    tracing::info!("远程模型配置: {}", model);
                    model
                }
                None => {
                    tracing::debug!("模型查询失败，退回默认模型 {}", constants::DEFAULT_MODEL);
                    constants::DEFAULT_MODEL.to_string()
                }
            }
        })
    }

    /// 查询远程模型配置，失败一律返回 None
    fn lookup_model(&self) -> Option<String> {
        let response = self
            .http
            .get(&self.model_config_url)
            .timeout(constants::MODEL_LOOKUP_TIMEOUT)
            .send()
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let config: ModelConfig = response.json().ok()?;
        let model = config.model.trim().to_string();
        (!model.is_empty()).then_some(model)
    }

    /// 调用生成端点并取出生成文本
    fn call_endpoint(
        &self,
        key: &ApiKey,
        prompt: String,
        batch_size: usize,
    ) -> TranslateResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base,
            self.model()
        );

        let body = GenerateRequest {
            contents: vec![WireContent {
                parts: vec![WirePart { text: prompt }],
            }],
        };

        let timeout = Self::calculate_timeout(batch_size);
        tracing::debug!(
            "调用翻译端点: {} 条字符串, 超时 {} 秒, 凭证 {}",
            batch_size,
            timeout.as_secs(),
            key.masked()
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", key.reveal())])
            .timeout(timeout)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TranslateError::Timeout {
                        timeout_secs: timeout.as_secs(),
                        batch_size,
                    }
                } else if e.is_connect() {
                    TranslateError::Network(format!(
                        "无法连接翻译端点，请检查网络: {e}"
                    ))
                } else {
                    TranslateError::Network(format!("请求发送失败: {e}"))
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TranslateError::RateLimit { key: key.masked() });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let body: String = body.chars().take(constants::ERROR_BODY_LIMIT).collect();
            return Err(TranslateError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let wire: GenerateResponse = response
            .json()
            .map_err(|e| TranslateError::Validation(format!("端点响应不是合法 JSON: {e}")))?;

        wire.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| TranslateError::Validation("响应中没有生成内容".to_string()))
    }
}

impl TranslationApi for GeminiClient {
    fn translate(
        &self,
        request: &TranslationRequest,
        key: &ApiKey,
    ) -> TranslateResult<TranslationResponse> {
        let prompt = build_prompt(request)?;
        let generated = self.call_endpoint(key, prompt, request.strings.len())?;

        let clean = strip_code_fences(&generated);
        let response: TranslationResponse = serde_json::from_str(clean).map_err(|e| {
            tracing::debug!("无法解析的响应文本: {}", generated);
            TranslateError::Validation(format!("翻译响应解析失败: {e}"))
        })?;

        response.validated(request.strings.len())
    }
}

/// 剥掉响应外层的 Markdown 代码围栏
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let without_head = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);

    without_head
        .strip_suffix("```")
        .unwrap_or(without_head)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_scales_with_batch_size() {
        assert_eq!(GeminiClient::calculate_timeout(0).as_secs(), 30);
        assert_eq!(GeminiClient::calculate_timeout(6).as_secs(), 60);
        assert_eq!(GeminiClient::calculate_timeout(50).as_secs(), 280);
    }

    #[test]
    fn timeout_is_clamped_to_bounds() {
        // 下限 30 秒
        assert_eq!(GeminiClient::calculate_timeout(0).as_secs(), 30);
        // 上限 300 秒
        assert_eq!(GeminiClient::calculate_timeout(100).as_secs(), 300);
        assert_eq!(GeminiClient::calculate_timeout(10_000).as_secs(), 300);
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{\"plain\":true}"), "{\"plain\":true}");
        assert_eq!(strip_code_fences("  {\"ws\":true}  "), "{\"ws\":true}");
    }

    #[test]
    fn fixed_model_skips_remote_lookup() {
        let settings = Settings {
            model: Some("gemini-custom".to_string()),
            ..Settings::default()
        };

        let client = GeminiClient::new(&settings).unwrap();
        assert_eq!(client.model(), "gemini-custom");
    }
}

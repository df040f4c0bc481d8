//! 翻译接口模块
//!
//! 定义翻译请求/响应的领域模型、上游生成式接口的线格式，
//! 以及把两者串起来的 `TranslationApi` 抽象。编排器只依赖
//! 这个抽象，测试里可以换成脚本化的后端。

pub mod client;
pub mod prompt;

pub use client::GeminiClient;

use serde::{Deserialize, Serialize};

use crate::error::{TranslateError, TranslateResult};
use crate::keys::ApiKey;

/// 单条待翻译字符串
///
/// `id` 是批次内的位置（从 1 开始），在一次请求里唯一。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringItem {
    pub id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 一个批次的翻译请求，构造后不再修改
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRequest {
    pub source_language: String,
    pub target_language: String,
    pub strings: Vec<StringItem>,
}

impl TranslationRequest {
    /// 从 (name, text) 对构造请求，id 按位置从 1 编号
    pub fn from_pairs(
        source_language: &str,
        target_language: &str,
        pairs: &[(String, String)],
    ) -> Self {
        let strings = pairs
            .iter()
            .enumerate()
            .map(|(index, (name, text))| StringItem {
                id: index as i64 + 1,
                text: text.clone(),
                name: Some(name.clone()),
            })
            .collect();

        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            strings,
        }
    }
}

/// 单条翻译结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedItem {
    pub id: i64,
    pub text: String,
}

/// 一个批次的翻译响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationResponse {
    pub translations: Vec<TranslatedItem>,
}

impl TranslationResponse {
    /// 校验并规整响应
    ///
    /// 强制策略：条目数必须与请求一致、id 必须恰好构成
    /// {1..N}、不允许重复或非正值。校验失败一律 `Validation`
    /// 错误，不重试——缺失的翻译绝不悄悄用原文顶替。
    /// 通过校验后按 id 排序，下游可以安全地按位置配对。
    pub fn validated(mut self, expected: usize) -> TranslateResult<Self> {
        if self.translations.is_empty() {
            return Err(TranslateError::Validation(
                "翻译结果为空".to_string(),
            ));
        }

        if let Some(bad) = self.translations.iter().find(|t| t.id <= 0) {
            return Err(TranslateError::Validation(format!(
                "出现非法的翻译 id: {}",
                bad.id
            )));
        }

        if self.translations.len() != expected {
            return Err(TranslateError::Validation(format!(
                "翻译条目数不匹配: 请求 {} 条，返回 {} 条",
                expected,
                self.translations.len()
            )));
        }

        self.translations.sort_by_key(|t| t.id);

        for (index, item) in self.translations.iter().enumerate() {
            let expected_id = index as i64 + 1;
            if item.id != expected_id {
                return Err(TranslateError::Validation(format!(
                    "翻译 id 序列异常: 期望 {expected_id}，实际 {}（重复或越界）",
                    item.id
                )));
            }
        }

        Ok(self)
    }
}

/// 翻译后端抽象
///
/// 实现方必须返回已通过 `validated` 规整的响应。
pub trait TranslationApi: Send + Sync {
    fn translate(
        &self,
        request: &TranslationRequest,
        key: &ApiKey,
    ) -> TranslateResult<TranslationResponse>;
}

// ---------------------------------------------------------------------------
// 上游生成式接口的线格式
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<WireContent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireContent {
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WirePart {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCandidate {
    pub content: Option<WireContent>,
}

/// 模型名查询响应
#[derive(Debug, Deserialize)]
pub(crate) struct ModelConfig {
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(ids: &[i64]) -> TranslationResponse {
        TranslationResponse {
            translations: ids
                .iter()
                .map(|&id| TranslatedItem {
                    id,
                    text: format!("t{id}"),
                })
                .collect(),
        }
    }

    #[test]
    fn request_ids_are_one_based_positions() {
        let pairs = vec![
            ("a".to_string(), "Alpha".to_string()),
            ("b".to_string(), "Beta".to_string()),
        ];
        let request = TranslationRequest::from_pairs("en", "vi", &pairs);

        assert_eq!(request.strings.len(), 2);
        assert_eq!(request.strings[0].id, 1);
        assert_eq!(request.strings[1].id, 2);
        assert_eq!(request.strings[0].name.as_deref(), Some("a"));
    }

    #[test]
    fn validation_rejects_empty_response() {
        assert!(matches!(
            response(&[]).validated(0),
            Err(TranslateError::Validation(_))
        ));
    }

    #[test]
    fn validation_rejects_non_positive_ids() {
        assert!(response(&[1, 0, 3]).validated(3).is_err());
        assert!(response(&[-1, 2, 3]).validated(3).is_err());
    }

    #[test]
    fn validation_rejects_duplicate_ids() {
        assert!(response(&[1, 2, 2]).validated(3).is_err());
    }

    #[test]
    fn validation_rejects_cardinality_mismatch() {
        assert!(response(&[1, 2]).validated(3).is_err());
        assert!(response(&[1, 2, 3, 4]).validated(3).is_err());
    }

    #[test]
    fn validation_rejects_ids_outside_range() {
        // 条目数对，但 id 不构成 {1..N}
        assert!(response(&[1, 2, 5]).validated(3).is_err());
    }

    #[test]
    fn validation_sorts_by_id() {
        let validated = response(&[3, 1, 2]).validated(3).unwrap();
        let ids: Vec<i64> = validated.translations.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}

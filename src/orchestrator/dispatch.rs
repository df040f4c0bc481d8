//! 单批次执行与重试策略
//!
//! 重试规则（按错误类型分流）：
//! - 限流：固定冷却后用同一凭证重试恰好一次，再失败就上浮
//! - 传输层故障：池里有富余凭证时换下一个凭证重试恰好一次
//! - 超时：绝不自动重试，错误里带着缩小批次的提示直接上浮
//! - 校验失败：不重试，同样的请求再发一遍大概率还是坏的

use crate::api::{TranslationApi, TranslationRequest};
use crate::config::Settings;
use crate::error::{TranslateError, TranslateResult};
use crate::keys::KeyPool;
use crate::pipeline::batch::BatchJob;

use super::cancel::CancelToken;
use super::pace::Pacer;

/// 执行一个批次，返回按输入顺序配对的 (name, 译文)
pub(crate) fn execute_batch(
    api: &dyn TranslationApi,
    keys: &KeyPool,
    pacer: &dyn Pacer,
    cancel: &CancelToken,
    settings: &Settings,
    target_language: &str,
    job: &BatchJob,
) -> TranslateResult<Vec<(String, String)>> {
    cancel.check()?;

    let request = TranslationRequest::from_pairs(
        &settings.source_language,
        target_language,
        &job.pairs,
    );
    let key = keys.next_key();

    let response = match api.translate(&request, key) {
        Ok(response) => response,
        Err(TranslateError::RateLimit { .. }) => {
            tracing::warn!(
                "批次 {} 命中限流，冷却 {:?} 后用同一凭证重试",
                job.index,
                settings.rate_limit_cooldown()
            );
            cancel.check()?;
            pacer.pause(settings.rate_limit_cooldown());
            cancel.check()?;
            api.translate(&request, key)?
        }
        Err(e) if e.is_retryable() && keys.len() > 1 => {
            tracing::warn!("批次 {} 调用失败（{}），换下一个凭证重试", job.index, e);
            cancel.check()?;
            pacer.pause(settings.key_switch_cooldown());
            cancel.check()?;
            let retry_key = keys.next_key();
            api.translate(&request, retry_key)?
        }
        Err(e) => return Err(e),
    };

    // 后端承诺返回已校验的响应；这里仍按 id 重排并复核条数，
    // 配对只认 id，不认上游返回顺序
    let mut translations = response.translations;
    translations.sort_by_key(|t| t.id);

    if translations.len() != job.pairs.len() {
        return Err(TranslateError::Validation(format!(
            "批次 {} 条目数不匹配: 期望 {} 条，实际 {} 条",
            job.index,
            job.pairs.len(),
            translations.len()
        )));
    }

    let pairs = job
        .pairs
        .iter()
        .zip(translations)
        .map(|((name, _), item)| (name.clone(), item.text))
        .collect();

    // 批次后冷却，把单个凭证的调用频率压在预算内
    pacer.pause(settings.batch_cooldown());

    Ok(pairs)
}

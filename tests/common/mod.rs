// 集成测试公共模块
//
// 提供脚本化的翻译后端、记录型节拍器和资源文件构造助手，
// 让编排器测试完全脱离网络和真实时钟。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use stringflow::api::{TranslatedItem, TranslationApi, TranslationRequest, TranslationResponse};
use stringflow::keys::ApiKey;
use stringflow::orchestrator::Pacer;
use stringflow::{Settings, TranslateError, TranslateResult};

/// 脚本化后端的单步行为
pub enum ScriptStep {
    /// 正常翻译（脚本耗尽后的默认行为）
    Succeed,
    /// 返回指定错误
    Fail(TranslateError),
}

/// 脚本化翻译后端
///
/// 译文格式固定为 `<目标语言>:<原文>`，方便断言配对正确性。
/// 步骤队列按调用顺序消费，耗尽后一律成功。
pub struct ScriptedApi {
    steps: Mutex<VecDeque<ScriptStep>>,
    calls: AtomicUsize,
    /// 返回的 translations 按 id 倒序排列，模拟上游乱序
    reverse_ids: bool,
    /// 给靠前的批次更长的延迟，制造乱序完成
    stagger: bool,
    /// 指定目标语言的请求固定失败
    fail_language: Option<(String, TranslateError)>,
}

impl ScriptedApi {
    pub fn always_ok() -> Self {
        Self::with_steps(Vec::new())
    }

    pub fn with_steps(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            reverse_ids: false,
            stagger: false,
            fail_language: None,
        }
    }

    pub fn reversed_ids() -> Self {
        Self {
            reverse_ids: true,
            ..Self::always_ok()
        }
    }

    pub fn staggered() -> Self {
        Self {
            stagger: true,
            ..Self::always_ok()
        }
    }

    pub fn failing_language(language: &str, error: TranslateError) -> Self {
        Self {
            fail_language: Some((language.to_string(), error)),
            ..Self::always_ok()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &TranslationRequest) -> TranslationResponse {
        let mut translations: Vec<TranslatedItem> = request
            .strings
            .iter()
            .map(|item| TranslatedItem {
                id: item.id,
                text: format!("{}:{}", request.target_language, item.text),
            })
            .collect();

        if self.reverse_ids {
            translations.reverse();
        }

        TranslationResponse { translations }
    }
}

impl TranslationApi for ScriptedApi {
    fn translate(
        &self,
        request: &TranslationRequest,
        _key: &ApiKey,
    ) -> TranslateResult<TranslationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((language, error)) = &self.fail_language {
            if request.target_language == *language {
                return Err(error.clone());
            }
        }

        let step = self.steps.lock().unwrap().pop_front();
        if let Some(ScriptStep::Fail(error)) = step {
            return Err(error);
        }

        if self.stagger {
            // 第一条字符串的序号越小睡得越久，靠前的批次最后完成
            let first_index = request
                .strings
                .first()
                .and_then(|s| s.name.as_deref())
                .and_then(|name| name.rsplit('_').next())
                .and_then(|tail| tail.parse::<u64>().ok())
                .unwrap_or(0);
            let delay = 40u64.saturating_sub(first_index * 7);
            std::thread::sleep(Duration::from_millis(delay));
        }

        Ok(self.respond(request))
    }
}

/// 记录每次暂停的节拍器，测试里零等待
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }

    pub fn count_of(&self, duration: Duration) -> usize {
        self.pauses().iter().filter(|d| **d == duration).count()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// 构造 count 条 (name_i, Text i) 对
pub fn sample_pairs(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|i| (format!("name_{i}"), format!("Text {i}")))
        .collect()
}

/// 测试用的小批次配置
pub fn test_settings(batch_size: usize) -> Settings {
    Settings {
        batch_size,
        source_language: "en".to_string(),
        use_default_keys: false,
        ..Settings::default()
    }
}

/// 在 res 目录下写入一个 values/strings.xml 源文件
pub fn write_source_file(res_dir: &std::path::Path, content: &str) {
    let values = res_dir.join("values");
    std::fs::create_dir_all(&values).unwrap();
    std::fs::write(values.join("strings.xml"), content).unwrap();
}

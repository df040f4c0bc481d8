//! 批次编排器
//!
//! 一次翻译运行的生命周期归编排器所有：划分批次、按凭证池
//! 的容量并发分发、按批次序号还原顺序、合并写盘。多语言时
//! 先按速率预算分组，组间串行、组内并行。
//!
//! 运行阶段推进：Partitioning → Dispatching → Collecting →
//! Merging → Done；Dispatching / Collecting 期间可被取消令牌
//! 打断进入 Cancelled。

pub mod cancel;
mod dispatch;
pub mod pace;
pub mod plan;
pub mod progress;

pub use cancel::CancelToken;
pub use pace::{NoopPacer, Pacer, WallClockPacer};
pub use progress::{ProgressEvent, ProgressSink, RunStage};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::api::{GeminiClient, TranslationApi};
use crate::config::{constants, Settings};
use crate::error::{TranslateError, TranslateResult};
use crate::keys::KeyPool;
use crate::module::AndroidModule;
use crate::pipeline::batch::{batch_count, partition};
use crate::pipeline::filter::ResourceFilter;
use crate::resource::{add_or_update, extract_translatable, merge_into};

use plan::plan_language_groups;

/// 单个语言的运行结果
#[derive(Debug)]
pub struct LanguageOutcome {
    pub language: String,
    /// 成功时为写入的条目数
    pub result: TranslateResult<usize>,
}

/// 一次多语言运行的汇总报告
///
/// 部分成功是正常结局：某个语言失败不会回滚已经合并完成
/// 的语言，报告里逐个列出结果，调用方负责呈现。
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<LanguageOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.language.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &TranslateError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.language.as_str(), e)))
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// 翻译运行编排器
///
/// 后端、凭证池和节拍器都走抽象注入，测试可以完全脱离
/// 网络和真实时钟运行。
pub struct TranslationOrchestrator {
    api: Arc<dyn TranslationApi>,
    keys: Arc<KeyPool>,
    pacer: Arc<dyn Pacer>,
    filter: ResourceFilter,
    settings: Settings,
    progress: ProgressSink,
    cancel: CancelToken,
}

impl TranslationOrchestrator {
    pub fn new(settings: Settings, api: Arc<dyn TranslationApi>, keys: Arc<KeyPool>) -> Self {
        Self {
            api,
            keys,
            pacer: Arc::new(WallClockPacer),
            filter: ResourceFilter::new(),
            settings,
            progress: ProgressSink::disabled(),
            cancel: CancelToken::new(),
        }
    }

    /// 从配置组装真实后端（凭证池 + 生成式端点客户端）
    pub fn from_settings(settings: &Settings) -> TranslateResult<Self> {
        let keys = Arc::new(KeyPool::acquire(settings)?);
        let client = Arc::new(GeminiClient::new(settings)?);
        Ok(Self::new(settings.clone(), client, keys))
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = sink;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// 本次运行的取消令牌，交给外部触发
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// 翻译一组 (name, text) 到单个目标语言
    ///
    /// 结果顺序与输入一致，与批次完成顺序无关。
    pub fn translate_pairs(
        &self,
        pairs: &[(String, String)],
        target_language: &str,
    ) -> TranslateResult<Vec<(String, String)>> {
        self.dispatch_language(pairs, target_language)
    }

    /// 翻译整个模块的源字符串到多个目标语言
    ///
    /// 前置检查全部通过后才会发出第一个网络调用；单个语言的
    /// 失败不影响其他语言，最终以报告形式返回逐语言结果。
    pub fn translate_module(
        &self,
        module: &AndroidModule,
        languages: &[String],
    ) -> TranslateResult<RunReport> {
        self.cancel.check()?;

        if languages.is_empty() {
            return Err(TranslateError::Config(
                "没有指定目标语言，请至少添加一个语言".to_string(),
            ));
        }

        // 多语言并行依赖多凭证分摊速率，单凭证直接快速失败
        if languages.len() > 1 && self.keys.len() < 2 {
            return Err(TranslateError::Config(format!(
                "并行翻译 {} 个语言至少需要 2 个 API 凭证（当前只有 {} 个）。\
                 请减少目标语言数量，或在配置中补充凭证",
                languages.len(),
                self.keys.len()
            )));
        }

        let source_file = module.strings_file.as_ref().ok_or_else(|| {
            TranslateError::Config(format!(
                "模块 {} 没有 values/{} 源文件",
                module.name,
                constants::RESOURCE_FILE_NAME
            ))
        })?;

        let content = std::fs::read_to_string(source_file)?;
        let extract = extract_translatable(&content, &self.filter)?;

        if extract.strings.is_empty() {
            tracing::info!("模块 {} 没有待翻译的字符串", module.name);
            return Ok(RunReport::default());
        }

        let batches = batch_count(extract.strings.len(), self.settings.batch_size);
        let groups = plan_language_groups(
            languages,
            batches,
            self.keys.len(),
            self.settings.per_key_calls_per_minute,
        );

        tracing::info!(
            "开始翻译模块 {}: {} 条字符串 × {} 个语言，分 {} 组执行",
            module.name,
            extract.strings.len(),
            languages.len(),
            groups.len()
        );

        let strings = &extract.strings;
        let mut outcomes = Vec::with_capacity(languages.len());

        for (group_index, group) in groups.iter().enumerate() {
            self.cancel.check()?;

            if group_index > 0 {
                // 组间冷却，即使上游没有 429 也不越过速率红线
                self.pacer.pause(self.settings.group_cooldown());
                self.cancel.check()?;
            }

            tracing::info!(
                "语言组 {}/{}: {}",
                group_index + 1,
                groups.len(),
                group.join(", ")
            );

            // 组内语言全并行，各自带着自己的批次子池
            let group_outcomes: Vec<LanguageOutcome> = std::thread::scope(|scope| {
                let handles: Vec<_> = group
                    .iter()
                    .map(|language| {
                        let lang = language.clone();
                        let handle =
                            scope.spawn(move || self.run_language(module, strings, &lang));
                        (language.clone(), handle)
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(language, handle)| {
                        let result = handle.join().unwrap_or_else(|_| {
                            Err(TranslateError::Config(
                                "语言工作线程异常退出".to_string(),
                            ))
                        });
                        LanguageOutcome { language, result }
                    })
                    .collect()
            });

            outcomes.extend(group_outcomes);
        }

        if self.cancel.is_cancelled() {
            self.progress.report(RunStage::Cancelled, None, None, 0.0);
            return Err(TranslateError::Cancelled);
        }

        let report = RunReport { outcomes };
        for (language, error) in report.failed() {
            if !error.is_cancelled() {
                tracing::error!("语言 {} 翻译失败: {}", language, error);
            }
        }
        tracing::info!(
            "模块 {} 运行结束: {} 个语言成功, {} 个失败",
            module.name,
            report.succeeded().len(),
            report.failed().len()
        );

        Ok(report)
    }

    /// 向多个目标文件夹添加或更新单个字符串
    ///
    /// `values` 文件夹写入原文，语言文件夹写入译文；条目级
    /// 更新走字符串手术，锁定条目不受影响。
    pub fn add_string(
        &self,
        module: &AndroidModule,
        name: &str,
        text: &str,
        folders: &[String],
    ) -> TranslateResult<()> {
        for (index, folder) in folders.iter().enumerate() {
            self.cancel.check()?;

            if !folder.starts_with(constants::VALUES_PREFIX) {
                return Err(TranslateError::Config(format!(
                    "目标文件夹 {folder} 不是 values 文件夹"
                )));
            }

            if index > 0 {
                self.pacer.pause(constants::FOLDER_COOLDOWN);
            }

            let translated_text = match AndroidModule::language_for_folder(folder) {
                None => text.to_string(),
                Some(language) => {
                    let pair = vec![(name.to_string(), text.to_string())];
                    let mut translated = self.dispatch_language(&pair, language)?;
                    translated
                        .pop()
                        .map(|(_, t)| t)
                        .ok_or_else(|| {
                            TranslateError::Validation("翻译结果为空".to_string())
                        })?
                }
            };

            let path = module.strings_file_for(folder);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let existing = std::fs::read_to_string(&path).ok();
            let updated = add_or_update(existing.as_deref(), name, &translated_text)?;
            std::fs::write(&path, updated)?;

            tracing::info!("条目 {} 已写入 {}", name, path.display());
        }

        Ok(())
    }

    /// 单语言分发：划分批次、并发执行、按序号还原
    fn dispatch_language(
        &self,
        pairs: &[(String, String)],
        target_language: &str,
    ) -> TranslateResult<Vec<(String, String)>> {
        self.cancel.check()?;
        self.progress
            .report(RunStage::Partitioning, Some(target_language), None, 0.0);

        let jobs = partition(pairs, self.settings.batch_size);
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        // 工作池容量取凭证池基数，批次少时不开多余线程
        let workers = self.keys.len().min(jobs.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| TranslateError::Config(format!("创建工作线程池失败: {e}")))?;

        tracing::debug!(
            "语言 {}: {} 个批次, {} 个工作线程",
            target_language,
            jobs.len(),
            workers
        );

        let total = jobs.len();
        let completed = AtomicUsize::new(0);
        // 同语言兄弟批次的中止信号：首个失败触发，其余尽快退出
        let abort = CancelToken::new();

        let results: Vec<(usize, TranslateResult<Vec<(String, String)>>)> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    if self.cancel.is_cancelled() || abort.is_cancelled() {
                        return (job.index, Err(TranslateError::Cancelled));
                    }

                    self.progress.report(
                        RunStage::Dispatching,
                        Some(target_language),
                        Some(job.index),
                        percent(completed.load(Ordering::Relaxed), total),
                    );

                    let outcome = dispatch::execute_batch(
                        self.api.as_ref(),
                        &self.keys,
                        self.pacer.as_ref(),
                        &self.cancel,
                        &self.settings,
                        target_language,
                        job,
                    );

                    match &outcome {
                        Ok(_) => {
                            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            self.progress.report(
                                RunStage::Collecting,
                                Some(target_language),
                                Some(job.index),
                                percent(done, total),
                            );
                        }
                        Err(e) if !e.is_cancelled() => {
                            abort.cancel();
                        }
                        Err(_) => {}
                    }

                    (job.index, outcome)
                })
                .collect()
        });

        // 先挑根因错误（兄弟批次的 Cancelled 不算），再还原顺序
        let mut first_error: Option<TranslateError> = None;
        let mut collected: Vec<(usize, Vec<(String, String)>)> = Vec::with_capacity(total);

        for (index, outcome) in results {
            match outcome {
                Ok(batch_pairs) => collected.push((index, batch_pairs)),
                Err(e) => {
                    if !e.is_cancelled() && first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        self.cancel.check()?;

        if collected.len() != total {
            // 只剩取消信号却没有根因错误，按取消处理
            return Err(TranslateError::Cancelled);
        }

        collected.sort_by_key(|(index, _)| *index);

        Ok(collected
            .into_iter()
            .flat_map(|(_, batch_pairs)| batch_pairs)
            .collect())
    }

    /// 单个语言的完整流程：分发、收集、合并写盘
    fn run_language(
        &self,
        module: &AndroidModule,
        strings: &[(String, String)],
        language: &str,
    ) -> TranslateResult<usize> {
        let translated = self.dispatch_language(strings, language)?;

        self.cancel.check()?;
        self.progress
            .report(RunStage::Merging, Some(language), None, 100.0);

        let folder = AndroidModule::folder_for_language(language);
        let path = module.strings_file_for(&folder);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let existing = std::fs::read_to_string(&path).ok();
        let merged = merge_into(existing.as_deref(), &translated);
        std::fs::write(&path, merged)?;

        tracing::info!(
            "语言 {} 完成: {} 条写入 {}",
            language,
            translated.len(),
            path.display()
        );
        self.progress
            .report(RunStage::Done, Some(language), None, 100.0);

        Ok(translated.len())
    }
}

fn percent(done: usize, total: usize) -> f32 {
    if total == 0 {
        100.0
    } else {
        done as f32 / total as f32 * 100.0
    }
}

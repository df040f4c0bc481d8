//! 限定符过滤器
//!
//! 资源目录里大量 values 文件夹编码的是设备配置（密度、横竖屏、
//! 夜间模式、API 版本……）而不是语言，这些文件夹和命中同样后缀
//! 的字符串名都不应该进入翻译流程。过滤规则是一张固定的正则
//! 片段表，大小写不敏感，按子串匹配。

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::constants;
use crate::error::{TranslateError, TranslateResult};

/// 限定符排除模式表
///
/// 片段按限定符类别分组，既用于文件夹名也用于字符串名。
const EXCLUDE_PATTERNS: &[&str] = &[
    // 版本限定符（v21、v29、v30 等）
    r"-v\d+",
    r"value-v\d+",
    // 夜间模式限定符
    "-night",
    "-notnight",
    "value-night",
    "value-notnight",
    // 横竖屏限定符
    "-land",
    "-port",
    "value-land",
    "value-port",
    // 屏幕尺寸限定符
    "-small",
    "-normal",
    "-large",
    "-xlarge",
    "value-small",
    "value-normal",
    "value-large",
    "value-xlarge",
    // 屏幕密度限定符
    "-ldpi",
    "-mdpi",
    "-hdpi",
    "-xhdpi",
    "-xxhdpi",
    "-xxxhdpi",
    "-nodpi",
    "-tvdpi",
    "value-ldpi",
    "value-mdpi",
    "value-hdpi",
    "value-xhdpi",
    "value-xxhdpi",
    "value-xxxhdpi",
    // 屏幕宽高限定符
    r"-sw\d+dp",
    r"-w\d+dp",
    r"-h\d+dp",
    r"value-sw\d+dp",
    r"value-w\d+dp",
    r"value-h\d+dp",
    // UI 模式限定符
    "-car",
    "-desk",
    "-television",
    "-appliance",
    "-watch",
    "-vrheadset",
    "value-car",
    "value-desk",
    "value-television",
    "value-appliance",
    "value-watch",
    "value-vrheadset",
    // 键盘与输入限定符
    "-keysexposed",
    "-keyshidden",
    "-keyssoft",
    "-notouch",
    "-stylus",
    "-finger",
    "-trackball",
    "-wheel",
    "-dpad",
    // 导航限定符
    "-navexposed",
    "-navhidden",
    "-nonav",
    // 圆形屏幕限定符（手表）
    "-round",
    "-notround",
];

/// 编译后的模式表，进程内只编译一次
static COMPILED_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    EXCLUDE_PATTERNS
        .iter()
        .map(|pattern| {
            let regex = Regex::new(&format!("(?i){pattern}")).unwrap();
            (*pattern, regex)
        })
        .collect()
});

/// 排除诊断结果
#[derive(Debug, Clone)]
pub struct ExclusionCheck {
    pub excluded: bool,
    /// 命中的模式片段列表，未命中时为空
    pub matched_patterns: Vec<String>,
}

/// 限定符过滤器
///
/// 规则固定，实例无状态，可以随意跨线程共享。
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceFilter;

impl ResourceFilter {
    pub fn new() -> Self {
        Self
    }

    /// 字符串名是否命中排除规则
    pub fn is_excluded_name(&self, string_name: &str) -> bool {
        COMPILED_PATTERNS
            .iter()
            .any(|(_, regex)| regex.is_match(string_name))
    }

    /// values 文件夹是否应排除
    ///
    /// 两条硬规则：`values` 本身永远保留；不以 `values` 开头的
    /// 名字根本不是候选，直接放行。
    pub fn is_excluded_folder(&self, folder_name: &str) -> bool {
        if !folder_name.starts_with(constants::VALUES_PREFIX) {
            return false;
        }

        if folder_name == constants::VALUES_PREFIX {
            return false;
        }

        COMPILED_PATTERNS
            .iter()
            .any(|(_, regex)| regex.is_match(folder_name))
    }

    /// 诊断入口：报告某个名字会不会被排除、命中了哪些模式
    pub fn test_exclusion(&self, name: &str, is_folder: bool) -> ExclusionCheck {
        let excluded = if is_folder {
            self.is_excluded_folder(name)
        } else {
            self.is_excluded_name(name)
        };

        let matched_patterns = if excluded {
            COMPILED_PATTERNS
                .iter()
                .filter(|(_, regex)| regex.is_match(name))
                .map(|(pattern, _)| (*pattern).to_string())
                .collect()
        } else {
            Vec::new()
        };

        ExclusionCheck {
            excluded,
            matched_patterns,
        }
    }

    /// 列出资源目录下通过过滤的 values 文件夹
    ///
    /// 结果按名字排序；被排除的文件夹记一条日志。
    pub fn filtered_values_folders(&self, resource_dir: &Path) -> TranslateResult<Vec<String>> {
        if !resource_dir.is_dir() {
            return Err(TranslateError::Config(format!(
                "资源目录不存在或不是目录: {}",
                resource_dir.display()
            )));
        }

        let mut kept = Vec::new();
        let mut excluded = Vec::new();

        for entry in std::fs::read_dir(resource_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let folder_name = entry.file_name().to_string_lossy().to_string();
            if !folder_name.starts_with(constants::VALUES_PREFIX) {
                continue;
            }

            if self.is_excluded_folder(&folder_name) {
                excluded.push(folder_name);
            } else {
                kept.push(folder_name);
            }
        }

        kept.sort();

        if !excluded.is_empty() {
            tracing::info!(
                "按限定符规则排除 {} 个文件夹: {}",
                excluded.len(),
                excluded.join(", ")
            );
        }

        Ok(kept)
    }

    /// 已配置的模式数量，供诊断信息展示
    pub fn pattern_count(&self) -> usize {
        EXCLUDE_PATTERNS.len()
    }
}

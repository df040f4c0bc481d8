//! Android 模块输入模型
//!
//! 对核心流程而言模块是只读输入：一个资源根目录、一份可能
//! 存在的源字符串文件、一组候选 values 文件夹名。目录扫描
//! 的启发式逻辑属于外部协作方，这里只做最直接的发现。

use std::path::{Path, PathBuf};

use crate::config::constants;
use crate::error::TranslateResult;
use crate::pipeline::filter::ResourceFilter;

/// 一个待翻译的 Android 模块
#[derive(Debug, Clone)]
pub struct AndroidModule {
    pub name: String,
    /// 资源根目录（res/）
    pub res_dir: PathBuf,
    /// 默认 values 目录
    pub values_dir: PathBuf,
    /// 源 strings.xml，可能不存在
    pub strings_file: Option<PathBuf>,
    /// 通过限定符过滤的候选 values 文件夹名
    pub value_folders: Vec<String>,
}

impl AndroidModule {
    /// 从资源根目录构造模块
    pub fn from_res_dir(
        name: impl Into<String>,
        res_dir: impl Into<PathBuf>,
        filter: &ResourceFilter,
    ) -> TranslateResult<Self> {
        let res_dir = res_dir.into();
        let values_dir = res_dir.join(constants::VALUES_PREFIX);

        let strings_file = {
            let candidate = values_dir.join(constants::RESOURCE_FILE_NAME);
            candidate.is_file().then_some(candidate)
        };

        let value_folders = filter.filtered_values_folders(&res_dir)?;

        let module = Self {
            name: name.into(),
            res_dir,
            values_dir,
            strings_file,
            value_folders,
        };

        tracing::debug!(
            "模块 {} 就绪: {} 个候选文件夹, 源文件{}存在",
            module.name,
            module.value_folders.len(),
            if module.has_strings_file() { "" } else { "不" }
        );

        Ok(module)
    }

    pub fn has_strings_file(&self) -> bool {
        self.strings_file.is_some()
    }

    /// 指定文件夹下 strings.xml 的完整路径
    pub fn strings_file_for(&self, folder: &str) -> PathBuf {
        self.res_dir.join(folder).join(constants::RESOURCE_FILE_NAME)
    }

    /// 语言代码对应的目标文件夹名
    pub fn folder_for_language(lang_code: &str) -> String {
        format!("{}-{}", constants::VALUES_PREFIX, lang_code)
    }

    /// 文件夹名对应的语言代码；`values` 本身没有语言代码
    pub fn language_for_folder(folder: &str) -> Option<&str> {
        if folder == constants::VALUES_PREFIX {
            return None;
        }
        folder.strip_prefix("values-")
    }
}

/// 便捷函数：目录是否像一个资源根（含 values 子目录）
pub fn looks_like_res_dir(path: &Path) -> bool {
    path.join(constants::VALUES_PREFIX).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_name_round_trip() {
        assert_eq!(AndroidModule::folder_for_language("vi"), "values-vi");
        assert_eq!(AndroidModule::language_for_folder("values-vi"), Some("vi"));
        assert_eq!(AndroidModule::language_for_folder("values"), None);
    }

    #[test]
    fn module_discovery_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let values = dir.path().join("values");
        std::fs::create_dir(&values).unwrap();
        std::fs::write(
            values.join("strings.xml"),
            "<resources>\n    <string name=\"a\">Ay</string>\n</resources>",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("values-v21")).unwrap();
        std::fs::create_dir(dir.path().join("values-vi")).unwrap();

        let filter = ResourceFilter::new();
        let module = AndroidModule::from_res_dir("app", dir.path(), &filter).unwrap();

        assert!(module.has_strings_file());
        assert_eq!(module.value_folders, vec!["values", "values-vi"]);
        assert!(module
            .strings_file_for("values-vi")
            .ends_with("values-vi/strings.xml"));
    }
}

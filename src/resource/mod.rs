//! 资源编解码模块
//!
//! 负责字符串资源文件的解析、序列化、提取与合并：
//!
//! - `parse` / `render` - 文档与有序元素列表之间的互转
//! - `extract_translatable` - 提取待翻译条目并汇报跳过原因
//! - `escape` / `unescape` - 控制字符与实体的转义规则
//! - `merge_into` / `add_or_update` - 幂等地写回翻译结果
//!
//! 文档被当作一种简化的 XML 方言处理：根元素包裹一串
//! `<string>` 元素，文本内容里允许穿插行内标记，不做完整的
//! schema 校验。

pub mod escape;
pub mod merge;

pub use escape::{escape, unescape};
pub use merge::{add_or_update, merge_into};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{TranslateError, TranslateResult};
use crate::pipeline::filter::ResourceFilter;

/// 匹配单个 string 元素（文本可跨行，行内标记留在文本里）
static STRING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<string\b([^>]*)>(.*?)</string>").unwrap());

/// 匹配元素属性
static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_][A-Za-z0-9_.:-]*)\s*=\s*"([^"]*)""#).unwrap());

/// 持久化形态的单个字符串条目
///
/// `name` 在一个资源文件内唯一；`translatable` 为显式的
/// 三态标记，`Some(false)` 的条目在任何合并操作中都不可变；
/// 其余属性按出现顺序原样保留。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringElement {
    pub name: String,
    pub text: String,
    pub translatable: Option<bool>,
    pub other_attributes: Vec<(String, String)>,
}

impl StringElement {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            translatable: None,
            other_attributes: Vec::new(),
        }
    }

    /// 是否被 translatable="false" 锁定
    pub fn is_locked(&self) -> bool {
        self.translatable == Some(false)
    }
}

/// 提取结果与跳过统计
///
/// 跳过从来不是错误，只作为元数据上报给调用方和日志。
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// 按原始文档顺序排列的 (name, text) 待翻译对
    pub strings: Vec<(String, String)>,
    /// 因 translatable="false" 跳过的条目名
    pub skipped_locked: Vec<String>,
    /// 因限定符过滤规则跳过的条目名
    pub skipped_excluded: Vec<String>,
}

/// 解析资源文档为有序元素列表
///
/// 锁定条目保留并打上不可变标记；name 为空的条目、
/// 未锁定且文本为空的条目直接丢弃；其余属性原样保留。
/// 文档缺少根元素时返回 `Parse` 错误。
pub fn parse(content: &str) -> TranslateResult<Vec<StringElement>> {
    ensure_document(content)?;

    let mut elements = Vec::new();

    for caps in STRING_TAG.captures_iter(content) {
        let attrs = parse_attributes(&caps[1]);
        let text = caps[2].to_string();

        let mut name = String::new();
        let mut translatable = None;
        let mut other_attributes = Vec::new();

        for (key, value) in attrs {
            match key.as_str() {
                "name" => name = value,
                "translatable" => {
                    translatable = Some(!value.eq_ignore_ascii_case("false"));
                }
                _ => other_attributes.push((key, value)),
            }
        }

        let element = StringElement {
            name,
            text,
            translatable,
            other_attributes,
        };

        if element.name.is_empty() {
            continue;
        }
        if element.text.is_empty() && !element.is_locked() {
            continue;
        }

        elements.push(element);
    }

    Ok(elements)
}

/// 序列化元素列表为完整文档
///
/// 条目按 name 排序输出，文本经过转义规则处理。
pub fn render(elements: &[StringElement]) -> String {
    let mut sorted: Vec<&StringElement> = elements.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<resources>\n");

    for element in sorted {
        out.push_str("    <string name=\"");
        out.push_str(&element.name);
        out.push('"');

        if let Some(translatable) = element.translatable {
            out.push_str(" translatable=\"");
            out.push_str(if translatable { "true" } else { "false" });
            out.push('"');
        }

        for (key, value) in &element.other_attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }

        out.push('>');
        out.push_str(&escape(&element.text));
        out.push_str("</string>\n");
    }

    out.push_str("</resources>\n");
    out
}

/// 提取待翻译条目
///
/// 在 `parse` 的基础上过滤掉锁定条目和命中排除规则的条目，
/// 并把跳过数量记入日志。对初始读取来说解析失败是致命的，
/// 由调用方决定如何处理。
pub fn extract_translatable(
    content: &str,
    filter: &ResourceFilter,
) -> TranslateResult<ExtractReport> {
    let elements = parse(content)?;
    let mut report = ExtractReport::default();

    for element in elements {
        if element.is_locked() {
            report.skipped_locked.push(element.name);
            continue;
        }

        if filter.is_excluded_name(&element.name) {
            report.skipped_excluded.push(element.name);
            continue;
        }

        report.strings.push((element.name, element.text));
    }

    tracing::info!("资源分析: {} 条字符串待翻译", report.strings.len());
    if !report.skipped_excluded.is_empty() {
        tracing::info!(
            "按限定符规则跳过 {} 条: {}{}",
            report.skipped_excluded.len(),
            report
                .skipped_excluded
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            if report.skipped_excluded.len() > 3 { " ..." } else { "" }
        );
    }
    if !report.skipped_locked.is_empty() {
        tracing::info!(
            "跳过 {} 条 translatable=\"false\" 的锁定条目",
            report.skipped_locked.len()
        );
    }

    Ok(report)
}

/// 确认文档具备根元素
fn ensure_document(content: &str) -> TranslateResult<()> {
    if content.trim().is_empty() {
        return Err(TranslateError::Parse("文档为空".to_string()));
    }

    if !content.contains("<resources") {
        return Err(TranslateError::Parse(
            "缺少 <resources> 根元素".to_string(),
        ));
    }

    if !content.contains("</resources>") {
        return Err(TranslateError::Parse(
            "缺少 </resources> 闭合标签".to_string(),
        ));
    }

    Ok(())
}

/// 解析属性串为有序键值对
fn parse_attributes(attrs: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(attrs)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="app_name" translatable="false">Stringflow</string>
    <string name="greeting">Hello</string>
    <string name="styled" formatted="true">Tap <b>Allow</b> to continue</string>
    <string name="">no name</string>
    <string name="empty_one"></string>
</resources>
"#;

    #[test]
    fn parse_keeps_order_and_drops_empty_entries() {
        let elements = parse(SAMPLE).unwrap();
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["app_name", "greeting", "styled"]);
    }

    #[test]
    fn parse_marks_locked_elements() {
        let elements = parse(SAMPLE).unwrap();
        assert!(elements[0].is_locked());
        assert!(!elements[1].is_locked());
    }

    #[test]
    fn parse_preserves_unknown_attributes() {
        let elements = parse(SAMPLE).unwrap();
        let styled = elements.iter().find(|e| e.name == "styled").unwrap();

        assert_eq!(
            styled.other_attributes,
            vec![("formatted".to_string(), "true".to_string())]
        );
        assert!(styled.text.contains("<b>Allow</b>"));
    }

    #[test]
    fn parse_rejects_documents_without_root() {
        assert!(matches!(parse(""), Err(TranslateError::Parse(_))));
        assert!(matches!(
            parse("<string name=\"a\">x</string>"),
            Err(TranslateError::Parse(_))
        ));
        assert!(matches!(
            parse("<resources><string name=\"a\">x</string>"),
            Err(TranslateError::Parse(_))
        ));
    }

    #[test]
    fn render_sorts_by_name_and_escapes() {
        let elements = vec![
            StringElement::new("zeta", "Don't stop"),
            StringElement::new("alpha", "Fish & Chips"),
        ];

        let doc = render(&elements);
        let alpha_pos = doc.find("alpha").unwrap();
        let zeta_pos = doc.find("zeta").unwrap();

        assert!(alpha_pos < zeta_pos, "entries must be name-sorted");
        assert!(doc.contains("Fish &amp; Chips"));
        assert!(doc.contains("Don&apos;t stop"));
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(doc.trim_end().ends_with("</resources>"));
    }

    #[test]
    fn render_keeps_locked_flag_and_extra_attributes() {
        let locked = StringElement {
            name: "app_name".to_string(),
            text: "Stringflow".to_string(),
            translatable: Some(false),
            other_attributes: vec![("tools:ignore".to_string(), "Typos".to_string())],
        };

        let doc = render(&[locked]);
        assert!(doc.contains(r#"<string name="app_name" translatable="false" tools:ignore="Typos">"#));
    }

    #[test]
    fn extract_skips_locked_and_excluded() {
        let filter = ResourceFilter::new();
        let content = r#"<resources>
    <string name="app_name" translatable="false">App</string>
    <string name="banner-land">Legacy</string>
    <string name="hello">Hello</string>
</resources>"#;

        let report = extract_translatable(content, &filter).unwrap();

        assert_eq!(report.strings, vec![("hello".to_string(), "Hello".to_string())]);
        assert_eq!(report.skipped_locked, vec!["app_name"]);
        assert_eq!(report.skipped_excluded, vec!["banner-land"]);
    }

    #[test]
    fn round_trip_parse_render_is_stable() {
        let elements = parse(SAMPLE).unwrap();
        let doc = render(&elements);
        let reparsed = parse(&doc).unwrap();
        let doc2 = render(&reparsed);

        assert_eq!(doc, doc2);
    }
}

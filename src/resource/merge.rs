//! 翻译结果的写回与合并
//!
//! 两种写回方式：`merge_into` 对整个语言的翻译集做幂等合并，
//! `add_or_update` 用字符串手术更新单个条目。两者都保证
//! 锁定条目（translatable="false"）永远不被改写。

use std::collections::BTreeMap;

use regex::Regex;

use super::{escape, parse, render, StringElement};
use crate::error::{TranslateError, TranslateResult};

/// 空文档骨架，目标文件不存在时由此起步
const EMPTY_DOCUMENT: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n</resources>\n";

/// 把一组翻译合并进已有文档
///
/// 已有文档按 name 建索引；每个传入的 (name, text)：
/// - 命中锁定条目时保持原条目不变
/// - 命中普通条目时替换文本、保留其余属性
/// - 未命中时插入新条目
///
/// 输出是两者的并集，按 name 排序。同一组翻译合并两次
/// 产生完全相同的文件（幂等）。
///
/// 已有内容无法解析时视为从零开始，只记一条警告——合并
/// 的目标本来就可能是全新或半成品文件。
pub fn merge_into(existing: Option<&str>, translations: &[(String, String)]) -> String {
    let mut index: BTreeMap<String, StringElement> = BTreeMap::new();

    if let Some(content) = existing {
        if !content.trim().is_empty() {
            match parse(content) {
                Ok(elements) => {
                    for element in elements {
                        index.insert(element.name.clone(), element);
                    }
                }
                Err(e) => {
                    tracing::warn!("已有文件无法解析，按空文件处理: {}", e);
                }
            }
        }
    }

    for (name, text) in translations {
        match index.get_mut(name) {
            Some(element) if element.is_locked() => {
                // 锁定条目不可变
                continue;
            }
            Some(element) => {
                element.text = text.clone();
            }
            None => {
                index.insert(name.clone(), StringElement::new(name.clone(), text.clone()));
            }
        }
    }

    let elements: Vec<StringElement> = index.into_values().collect();
    render(&elements)
}

/// 添加或更新单个条目
///
/// `merge_into` 的单条目变体，用字符串手术实现：已有条目
/// 原地替换文本，新条目插入到根元素闭合标签之前，其余内容
/// 一个字节都不动。文件为空或不存在时先合成最小空文档。
pub fn add_or_update(
    content: Option<&str>,
    name: &str,
    text: &str,
) -> TranslateResult<String> {
    let mut document = match content {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => EMPTY_DOCUMENT.to_string(),
    };

    // 锁定检查依赖解析；解析不了的文件按空文件处理
    match parse(&document) {
        Ok(elements) => {
            if let Some(existing) = elements.iter().find(|e| e.name == name) {
                if existing.is_locked() {
                    tracing::debug!("条目 {} 被 translatable=\"false\" 锁定，跳过更新", name);
                    return Ok(document);
                }
            }
        }
        Err(e) => {
            tracing::warn!("已有文件无法解析，按空文件处理: {}", e);
            document = EMPTY_DOCUMENT.to_string();
        }
    }

    let escaped = escape(text);

    // 原地替换已有条目（闭包替换避免文本里的 $ 被当成组引用）
    let pattern = format!(
        r#"(?s)(<string\b[^>]*\bname="{}"[^>]*>).*?(</string>)"#,
        regex::escape(name)
    );
    let element_regex = Regex::new(&pattern)
        .map_err(|e| TranslateError::Parse(format!("条目名无法构成匹配模式: {e}")))?;

    if element_regex.is_match(&document) {
        let updated = element_regex.replace(&document, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], escaped, &caps[2])
        });
        return Ok(updated.into_owned());
    }

    // 新条目插入到闭合标签之前
    let insert_position = document
        .rfind("</resources>")
        .ok_or_else(|| TranslateError::Parse("缺少 </resources> 闭合标签".to_string()))?;

    let before = document[..insert_position].trim_end();
    let after = &document[insert_position..];
    let element_line = format!("    <string name=\"{name}\">{escaped}</string>");

    Ok(format!("{before}\n{element_line}\n{after}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn merge_into_empty_produces_sorted_document() {
        let doc = merge_into(None, &pairs(&[("b", "Bee"), ("a", "Ay")]));

        let a = doc.find("name=\"a\"").unwrap();
        let b = doc.find("name=\"b\"").unwrap();
        assert!(a < b);
        assert!(doc.contains(">Ay</string>"));
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = r#"<resources>
    <string name="old">Stale</string>
</resources>"#;
        let translations = pairs(&[("old", "Fresh"), ("new", "Shiny & New")]);

        let once = merge_into(Some(existing), &translations);
        let twice = merge_into(Some(&once), &translations);

        assert_eq!(once, twice);
        assert!(once.contains(">Fresh</string>"));
        assert!(once.contains("Shiny &amp; New"));
    }

    #[test]
    fn merge_never_touches_locked_entries() {
        let existing = r#"<resources>
    <string name="a" translatable="false">Keep</string>
</resources>"#;

        let doc = merge_into(Some(existing), &pairs(&[("a", "Changed")]));

        assert!(doc.contains(">Keep</string>"));
        assert!(!doc.contains("Changed"));
        assert!(doc.contains("translatable=\"false\""));
    }

    #[test]
    fn merge_keeps_unrelated_entries() {
        let existing = r#"<resources>
    <string name="untouched">Still here</string>
</resources>"#;

        let doc = merge_into(Some(existing), &pairs(&[("fresh", "Hi")]));

        assert!(doc.contains(">Still here</string>"));
        assert!(doc.contains(">Hi</string>"));
    }

    #[test]
    fn merge_treats_garbage_as_fresh_start() {
        let doc = merge_into(Some("not a document at all"), &pairs(&[("a", "Ay")]));
        assert!(doc.contains(">Ay</string>"));
    }

    #[test]
    fn add_or_update_synthesizes_empty_document() {
        let doc = add_or_update(None, "first", "First entry").unwrap();

        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(doc.contains("    <string name=\"first\">First entry</string>"));
        assert!(doc.trim_end().ends_with("</resources>"));
    }

    #[test]
    fn add_or_update_inserts_before_closing_tag() {
        let existing = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="a">Ay</string>
</resources>"#;

        let doc = add_or_update(Some(existing), "b", "Bee").unwrap();
        let a = doc.find("name=\"a\"").unwrap();
        let b = doc.find("name=\"b\"").unwrap();
        let close = doc.rfind("</resources>").unwrap();

        assert!(a < b && b < close);
    }

    #[test]
    fn add_or_update_replaces_in_place() {
        let existing = r#"<resources>
    <string name="a">Old</string>
    <string name="b">Bee</string>
</resources>"#;

        let doc = add_or_update(Some(existing), "a", "New $1 value").unwrap();

        assert!(doc.contains(">New $1 value</string>"));
        assert!(!doc.contains(">Old</string>"));
        assert!(doc.contains(">Bee</string>"));
    }

    #[test]
    fn add_or_update_respects_locked_entries() {
        let existing = r#"<resources>
    <string name="a" translatable="false">Keep</string>
</resources>"#;

        let doc = add_or_update(Some(existing), "a", "Changed").unwrap();
        assert_eq!(doc, existing);
    }
}

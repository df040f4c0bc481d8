//! 资源文本的转义与还原
//!
//! 输出文件里不允许出现裸的控制字符，它们一律转成两字符的
//! 可见转义记号；尖括号和双引号刻意保持原样，行内标记
//! （`<b>`、`<font color="...">` 等）必须原封不动地写回。

use once_cell::sync::Lazy;
use regex::Regex;

/// 优先匹配完整实体，否则匹配裸 & 符号
///
/// 分支顺序即优先级：`&amp;`、`&#8230;` 这类已有实体整体
/// 命中第一支并原样保留，只有落到第二支的裸 & 才被转义。
static AMPERSAND_OR_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]+;|&").unwrap());

/// 转义资源文本
///
/// 规则：
/// - 不属于实体的 `&` 转成 `&amp;`
/// - `'` 转成 `&apos;`
/// - 换行、制表、回车转成字面的 `\n`、`\t`、`\r` 记号
pub fn escape(text: &str) -> String {
    let text = AMPERSAND_OR_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let matched = &caps[0];
        if matched == "&" {
            "&amp;".to_string()
        } else {
            matched.to_string()
        }
    });
    text.replace('\'', "&apos;")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
}

/// 还原转义文本
///
/// `escape` 的逆操作。对不含字面转义记号的可打印文本，
/// `unescape(escape(t)) == t` 成立。
pub fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\r", "\r")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

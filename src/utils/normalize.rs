use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static ZERO_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{200B}-\u{200D}\u{FEFF}]").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// 规范化姓名：NFKC、去除零宽字符、连续空白压缩为单个空格、去首尾空白
///
/// 零宽字符须在 NFKC 之前去除，否则结果不幂等。
pub fn normalize(text: &str) -> String {
    let stripped = ZERO_WIDTH.replace_all(text, "");
    let composed: String = stripped.nfkc().collect();
    let collapsed = WHITESPACE_RUN.replace_all(&composed, " ");
    collapsed.trim().to_string()
}

/// 缺失值视为空串
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

static CODE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("valid regex"));

/// 前缀 + 6位补零数字（如 "72" -> "72004821"）
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    format!("{}{:06}", prefix, rng.gen_range(0..=999_999u32))
}

/// 生成 `is_taken` 判定为未占用的军番，最多尝试 `max_attempts` 次；耗尽返回 None
pub fn generate_unique_code<R, F>(
    rng: &mut R,
    prefix: &str,
    max_attempts: u32,
    is_taken: F,
) -> Option<String>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    (0..max_attempts)
        .map(|_| generate_code(rng, prefix))
        .find(|candidate| !is_taken(candidate.as_str()))
}

/// 是否符合 `前缀 + 6位数字` 的形状
pub fn is_valid_code(code: &str, prefix: &str) -> bool {
    code.strip_prefix(prefix)
        .is_some_and(|rest| CODE_SHAPE.is_match(rest))
}

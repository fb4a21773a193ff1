use crate::error::{AppError, AppResult};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// `k` 超过去重后的候选数时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// 拒绝（名册抽签）
    Strict,
    /// 降为候选数（临时名单抽取）
    Clamp,
}

/// 不放回抽样，每次调用都使用新的随机数
pub fn sample_without_replacement(
    items: &[String],
    k: usize,
    mode: SampleMode,
) -> AppResult<Vec<String>> {
    sample_with_rng(&mut rand::thread_rng(), items, k, mode)
}

pub fn sample_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    items: &[String],
    k: usize,
    mode: SampleMode,
) -> AppResult<Vec<String>> {
    if k == 0 {
        return Err(AppError::InvalidArgument(
            "1 이상의 숫자를 입력하세요.".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let distinct: Vec<&String> = items.iter().filter(|s| seen.insert(s.as_str())).collect();

    let k = match mode {
        SampleMode::Strict if k > distinct.len() => {
            return Err(AppError::InvalidArgument(format!(
                "추첨 인원이 대상 수({}명)를 초과합니다.",
                distinct.len()
            )));
        }
        SampleMode::Strict => k,
        SampleMode::Clamp => k.min(distinct.len()),
    };

    let mut picked: Vec<String> = distinct
        .choose_multiple(rng, k)
        .map(|s| (*s).clone())
        .collect();
    // 输出顺序也随机
    picked.shuffle(rng);
    Ok(picked)
}

/// 掷骰子：1..=sides
pub fn roll_die(sides: u32) -> AppResult<u32> {
    if sides == 0 {
        return Err(AppError::InvalidArgument(
            "주사위 면 수는 1 이상이어야 합니다.".to_string(),
        ));
    }
    Ok(rand::thread_rng().gen_range(1..=sides))
}

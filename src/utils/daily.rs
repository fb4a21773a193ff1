//! 按日固定的伪随机选择。
//!
//! 同一天（UTC+9）、同一个键、同一个候选池，无论调用多少次、进程是否重启，
//! 结果都相同。种子只来自数据本身：
//!
//! ```text
//! seed = SHA-256("{YYYY-MM-DD}|{seed_key}|{pool_len}")
//! ```
//!
//! 候选池长度参与种子，池子变化时会得到新的序列，而不是复用旧的随机流。

use super::time::kst_today;
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use sha2::{Digest, Sha256};

pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// 种子原文：`日期|键|候选数`
pub fn daily_seed_material(day: NaiveDate, seed_key: &str, pool_len: usize) -> String {
    format!("{}|{}|{}", day_key(day), seed_key, pool_len)
}

pub fn daily_rng(day: NaiveDate, seed_key: &str, pool_len: usize) -> StdRng {
    let digest = Sha256::digest(daily_seed_material(day, seed_key, pool_len).as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    StdRng::from_seed(seed)
}

/// 去首尾空白并丢弃空值
fn non_empty(pool: &[String]) -> Vec<String> {
    pool.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 去重（保持首次出现的顺序），同时丢弃空值
pub fn unique_non_empty(pool: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    non_empty(pool)
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySelector {
    day: NaiveDate,
}

impl DailySelector {
    pub fn for_day(day: NaiveDate) -> Self {
        Self { day }
    }

    /// 以当前 UTC+9 日期构造
    pub fn today() -> Self {
        Self::for_day(kst_today())
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// 从候选池中按日固定地取一个；没有有效候选时返回 None
    pub fn pick_one(&self, pool: &[String], seed_key: &str) -> Option<String> {
        let pool = non_empty(pool);
        if pool.is_empty() {
            return None;
        }
        let mut rng = daily_rng(self.day, seed_key, pool.len());
        pool.choose(&mut rng).cloned()
    }

    /// 去重后按日固定地打乱，返回完整排列
    pub fn rank_all(&self, pool: &[String], seed_key: &str) -> Vec<String> {
        let mut order = unique_non_empty(pool);
        let mut rng = daily_rng(self.day, seed_key, order.len());
        order.shuffle(&mut rng);
        order
    }
}

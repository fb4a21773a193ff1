//! 表格记录存储抽象。
//!
//! 行列均为 1 起始；第 1 行为表头，是否跳过由调用方决定，存储本身不处理。

pub mod memory;

pub use memory::MemoryStore;

use crate::error::AppResult;
use std::sync::Arc;

pub type SharedStore = Arc<dyn RecordStore>;

/// 单元格坐标（1 起始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

impl CellRef {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// A1 记法，例如 (13, 9) -> "I13"
    pub fn a1(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row)
    }
}

/// 1 -> "A", 26 -> "Z", 27 -> "AA"
pub fn column_letters(column: usize) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

pub trait RecordStore: Send + Sync {
    /// 按行顺序读取整列（含表头）；末尾空单元格可能被省略
    fn read_column(&self, sheet: &str, column: usize) -> AppResult<Vec<String>>;

    /// 读取单元格，空单元格返回 ""
    fn read_cell(&self, sheet: &str, cell: CellRef) -> AppResult<String>;

    /// 读取整张表（含表头）
    fn read_rows(&self, sheet: &str) -> AppResult<Vec<Vec<String>>>;

    /// 以字面文本写入单元格。
    ///
    /// 实现必须保证回读得到的就是 `text` 本身：列格式固定为文本、
    /// 先清除旧值（含公式）再写入，且三步作为一个整体生效。
    fn write_cell_text(&self, sheet: &str, cell: CellRef, text: &str) -> AppResult<()>;

    /// 在某列中查找与 `pattern` 完全相同（去除首尾空白后）的第一行，跳过表头
    fn find_exact(&self, sheet: &str, column: usize, pattern: &str) -> AppResult<Option<usize>> {
        let target = pattern.trim();
        if target.is_empty() {
            return Ok(None);
        }
        let values = self.read_column(sheet, column)?;
        Ok(values
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, v)| v.trim() == target)
            .map(|(idx, _)| idx + 1))
    }
}

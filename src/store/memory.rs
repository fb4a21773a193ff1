use super::{CellRef, RecordStore};
use crate::error::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// 单元格内容：普通文本，或带缓存值的公式（模拟表格中残留的计算公式）
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Formula { expr: String, cached: String },
}

impl Cell {
    fn display(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Formula { cached, .. } => cached,
        }
    }
}

#[derive(Debug, Default)]
struct Grid {
    rows: Vec<Vec<Option<Cell>>>,
    text_columns: HashSet<usize>,
}

impl Grid {
    fn get(&self, cell: CellRef) -> Option<&Cell> {
        self.rows
            .get(cell.row.checked_sub(1)?)
            .and_then(|r| r.get(cell.column.checked_sub(1)?))
            .and_then(|c| c.as_ref())
    }

    fn slot(&mut self, cell: CellRef) -> &mut Option<Cell> {
        if self.rows.len() < cell.row {
            self.rows.resize_with(cell.row, Vec::new);
        }
        let row = &mut self.rows[cell.row - 1];
        if row.len() < cell.column {
            row.resize(cell.column, None);
        }
        &mut row[cell.column - 1]
    }
}

/// 进程内的表格存储，离线模式与测试使用。
///
/// 写入路径与远端表格一致：固定列为文本格式、清除旧值、写入字面文本，
/// 三步在同一把写锁内完成。
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: RwLock<HashMap<String, Grid>>,
    failing_writes: RwLock<HashSet<(String, CellRef)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&self, sheet: &str) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        sheets.entry(sheet.to_string()).or_default();
    }

    /// 从第 1 行开始写入整列（覆盖已有值）
    pub fn set_column(&self, sheet: &str, column: usize, values: &[&str]) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.entry(sheet.to_string()).or_default();
        for (idx, v) in values.iter().enumerate() {
            *grid.slot(CellRef::new(idx + 1, column)) = Some(Cell::Text(v.to_string()));
        }
    }

    /// 按行写入整张表（第 1 行为表头）
    pub fn set_rows(&self, sheet: &str, rows: &[&[&str]]) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.entry(sheet.to_string()).or_default();
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                *grid.slot(CellRef::new(r + 1, c + 1)) = Some(Cell::Text(v.to_string()));
            }
        }
    }

    pub fn set_cell(&self, sheet: &str, cell: CellRef, value: &str) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.entry(sheet.to_string()).or_default();
        *grid.slot(cell) = Some(Cell::Text(value.to_string()));
    }

    pub fn set_formula(&self, sheet: &str, cell: CellRef, expr: &str, cached: &str) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.entry(sheet.to_string()).or_default();
        *grid.slot(cell) = Some(Cell::Formula {
            expr: expr.to_string(),
            cached: cached.to_string(),
        });
    }

    pub fn cell(&self, sheet: &str, cell: CellRef) -> Option<Cell> {
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        sheets.get(sheet).and_then(|g| g.get(cell).cloned())
    }

    pub fn is_text_column(&self, sheet: &str, column: usize) -> bool {
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        sheets
            .get(sheet)
            .map(|g| g.text_columns.contains(&column))
            .unwrap_or(false)
    }

    /// 让指定单元格的写入失败（测试用）
    pub fn fail_writes_to(&self, sheet: &str, cell: CellRef) {
        let mut failing = self.failing_writes.write().unwrap_or_else(|e| e.into_inner());
        failing.insert((sheet.to_string(), cell));
    }

    fn sheet_missing(sheet: &str) -> AppError {
        AppError::StoreFailure(format!("sheet '{sheet}' not found"))
    }

    fn check_position(row: usize, column: usize) -> AppResult<()> {
        if row == 0 || column == 0 {
            return Err(AppError::InvalidArgument(format!(
                "row/column are 1-based, got ({row}, {column})"
            )));
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn read_column(&self, sheet: &str, column: usize) -> AppResult<Vec<String>> {
        Self::check_position(1, column)?;
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.get(sheet).ok_or_else(|| Self::sheet_missing(sheet))?;
        let mut values: Vec<String> = grid
            .rows
            .iter()
            .map(|r| {
                r.get(column - 1)
                    .and_then(|c| c.as_ref())
                    .map(|c| c.display().to_string())
                    .unwrap_or_default()
            })
            .collect();
        // 与远端一致：省略末尾空单元格
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }
        Ok(values)
    }

    fn read_cell(&self, sheet: &str, cell: CellRef) -> AppResult<String> {
        Self::check_position(cell.row, cell.column)?;
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.get(sheet).ok_or_else(|| Self::sheet_missing(sheet))?;
        Ok(grid
            .get(cell)
            .map(|c| c.display().to_string())
            .unwrap_or_default())
    }

    fn read_rows(&self, sheet: &str) -> AppResult<Vec<Vec<String>>> {
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.get(sheet).ok_or_else(|| Self::sheet_missing(sheet))?;
        Ok(grid
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| c.as_ref().map(|c| c.display().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect())
    }

    fn write_cell_text(&self, sheet: &str, cell: CellRef, text: &str) -> AppResult<()> {
        Self::check_position(cell.row, cell.column)?;
        {
            let failing = self.failing_writes.read().unwrap_or_else(|e| e.into_inner());
            if failing.contains(&(sheet.to_string(), cell)) {
                return Err(AppError::StoreFailure(format!(
                    "write to {sheet}!{} rejected",
                    cell.a1()
                )));
            }
        }

        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let grid = sheets.get_mut(sheet).ok_or_else(|| Self::sheet_missing(sheet))?;
        grid.text_columns.insert(cell.column);
        // 先清除旧值（含公式），再写入字面文本
        let slot = grid.slot(cell);
        slot.take();
        *slot = Some(Cell::Text(text.to_string()));
        Ok(())
    }
}

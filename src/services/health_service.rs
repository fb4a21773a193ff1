use crate::error::AppResult;
use crate::store::{CellRef, SharedStore};

/// 连通性检查：向固定单元格写入再读回
#[derive(Clone)]
pub struct HealthService {
    store: SharedStore,
    sheet: String,
}

impl HealthService {
    pub fn new(store: SharedStore, sheet: String) -> Self {
        Self { store, sheet }
    }

    pub fn probe(&self, stamp: &str) -> AppResult<String> {
        let a1 = CellRef::new(1, 1);
        self.store
            .write_cell_text(&self.sheet, a1, &format!("✅ 연결 OK @ {stamp}"))?;
        self.store.read_cell(&self.sheet, a1)
    }
}

use crate::config::RosterConfig;
use crate::error::{AppError, AppResult};
use crate::models::{DrawResult, IssuedCode};
use crate::store::{CellRef, SharedStore};
use crate::utils::{
    ResolvePolicy, RowMatch, SampleMode, generate_unique_code, resolve_row,
    sample_without_replacement,
};
use rand::Rng;
use std::collections::HashSet;

#[derive(Clone)]
pub struct RosterService {
    store: SharedStore,
    config: RosterConfig,
}

impl RosterService {
    pub fn new(store: SharedStore, config: RosterConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// 在名册姓名列中查找（只读）
    pub fn resolve(&self, name: &str, policy: ResolvePolicy) -> AppResult<RowMatch> {
        let sheet = &self.config.sheet;
        let column_idx = self.config.name_column;
        // 原文精确匹配交给存储，未命中再按规范化规则扫描整列
        let policy = match policy {
            ResolvePolicy::ExactFirst => {
                if let Some(row) = self.store.find_exact(sheet, column_idx, name)? {
                    return Ok(RowMatch::Found(row));
                }
                ResolvePolicy::NormalizedOnly
            }
            other => other,
        };
        let column = self.store.read_column(sheet, column_idx)?;
        let found = resolve_row(&column, name, policy);
        if let RowMatch::Ambiguous(rows) = &found {
            log::debug!("Ambiguous name '{name}' matches rows {rows:?}");
        }
        Ok(found)
    }

    /// 查找行号；未找到与多义都视为 NotFound
    pub fn find_row(&self, name: &str, policy: ResolvePolicy) -> AppResult<usize> {
        self.resolve(name, policy)?.row().ok_or_else(|| {
            AppError::NotFound(format!(
                "'{}' 시트에서 '{}'을(를) 찾지 못했습니다.",
                self.config.sheet, name
            ))
        })
    }

    /// 军番列中现有的全部军番（跳过表头，去空白，丢弃空值）
    pub fn existing_codes(&self) -> AppResult<HashSet<String>> {
        let column = self
            .store
            .read_column(&self.config.sheet, self.config.code_column)?;
        Ok(column
            .iter()
            .skip(1)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect())
    }

    /// 按姓名发放军番（原文精确匹配优先）
    pub fn issue_for_name(&self, name: &str, force: bool, actor: &str) -> AppResult<IssuedCode> {
        let row = self.find_row(name, ResolvePolicy::ExactFirst)?;
        self.issue_code(row, name, force, actor)
    }

    pub fn issue_code(
        &self,
        row: usize,
        name: &str,
        force: bool,
        actor: &str,
    ) -> AppResult<IssuedCode> {
        self.issue_code_with_rng(&mut rand::thread_rng(), row, name, force, actor)
    }

    /// 发放或重新发放军番。
    ///
    /// 1. 已有军番且未强制：返回 `AlreadyIssued`，不做任何写入
    /// 2. 收集现有军番；重新发放时把本行旧军番移出集合，让其他行可以复用
    /// 3. 随机生成不冲突的军番，超过重试上限返回 `GenerationExhausted`
    /// 4. 以字面文本写入；随后尽力记录操作人，失败只记日志
    pub fn issue_code_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        row: usize,
        name: &str,
        force: bool,
        actor: &str,
    ) -> AppResult<IssuedCode> {
        if row < 2 {
            return Err(AppError::InvalidArgument(format!(
                "row {row} is the header or out of range"
            )));
        }
        let sheet = &self.config.sheet;
        let code_cell = CellRef::new(row, self.config.code_column);

        let current = self.store.read_cell(sheet, code_cell)?.trim().to_string();
        if !current.is_empty() && !force {
            return Err(AppError::AlreadyIssued {
                name: name.to_string(),
                code: current,
            });
        }

        let mut existing = self.existing_codes()?;
        existing.remove(&current);

        // 重新发放时新号不能与本行旧号相同
        let code = generate_unique_code(
            rng,
            &self.config.code_prefix,
            self.config.max_attempts,
            |candidate| existing.contains(candidate) || candidate == current,
        )
        .ok_or(AppError::GenerationExhausted {
            attempts: self.config.max_attempts,
        })?;

        self.store.write_cell_text(sheet, code_cell, &code)?;

        let audit_cell = CellRef::new(self.config.audit_row, self.config.audit_column);
        if let Err(e) = self.store.write_cell_text(sheet, audit_cell, actor) {
            log::warn!("Failed to record last editor at {}: {e}", audit_cell.a1());
        }

        let previous = (!current.is_empty()).then_some(current);
        match &previous {
            Some(old) => log::info!("Reissued code for '{name}' (row {row}): {old} -> {code}"),
            None => log::info!("Issued code {code} to '{name}' (row {row})"),
        }

        Ok(IssuedCode {
            name: name.to_string(),
            row,
            code,
            previous,
        })
    }

    /// 名册抽签：从 `draw_start_row` 起的姓名中抽取 k 人，超过人数则拒绝
    pub fn draw(&self, k: usize) -> AppResult<DrawResult> {
        let candidates = self.draw_candidates()?;
        if candidates.is_empty() {
            return Err(AppError::EmptyPool(format!(
                "추첨 대상이 없습니다. ({}{} 이후가 비어 있음)",
                crate::store::column_letters(self.config.name_column),
                self.config.draw_start_row
            )));
        }
        let winners = sample_without_replacement(&candidates, k, SampleMode::Strict)?;
        let total = candidates.iter().collect::<HashSet<_>>().len();
        Ok(DrawResult {
            count: winners.len(),
            total,
            winners,
        })
    }

    fn draw_candidates(&self) -> AppResult<Vec<String>> {
        let column = self
            .store
            .read_column(&self.config.sheet, self.config.name_column)?;
        Ok(column
            .iter()
            .skip(self.config.draw_start_row - 1)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect())
    }

    /// 查询阶级（仅规范化匹配）；找不到人或阶级为空都返回 NotFound
    pub fn rank_of(&self, name: &str) -> AppResult<String> {
        let not_found = || {
            AppError::NotFound(format!(
                "'{}' 시트에서 '{}'의 계급을 찾지 못했습니다.",
                self.config.sheet, name
            ))
        };
        let row = self
            .resolve(name, ResolvePolicy::NormalizedOnly)?
            .row()
            .ok_or_else(not_found)?;
        let rank = self
            .store
            .read_cell(&self.config.sheet, CellRef::new(row, self.config.rank_column))?
            .trim()
            .to_string();
        if rank.is_empty() {
            return Err(not_found());
        }
        Ok(rank)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::{MemoryStore, RecordStore};
    use crate::utils::{generate_code, is_valid_code};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 名册：B=姓名 C=阶级 D=军番，第 1 行表头
    pub(crate) fn roster_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set_rows(
            "군번",
            &[
                &["", "이름", "계급", "군번"],
                &["", "김철수", "병장", "72000001"],
                &["", "이영희", "상병", ""],
                &["", "박민수", "", "72000003"],
                &["", "홍길동", "일병", ""],
                &["", "최강", "이병", ""],
                &["", "정하늘", "일병", ""],
            ],
        );
        store
    }

    fn service(store: &Arc<MemoryStore>) -> RosterService {
        RosterService::new(store.clone(), RosterConfig::default())
    }

    /// 记录 `find_exact` 调用次数的存储
    struct CountingStore {
        inner: Arc<MemoryStore>,
        exact_calls: AtomicUsize,
    }

    impl RecordStore for CountingStore {
        fn read_column(&self, sheet: &str, column: usize) -> AppResult<Vec<String>> {
            self.inner.read_column(sheet, column)
        }

        fn read_cell(&self, sheet: &str, cell: CellRef) -> AppResult<String> {
            self.inner.read_cell(sheet, cell)
        }

        fn read_rows(&self, sheet: &str) -> AppResult<Vec<Vec<String>>> {
            self.inner.read_rows(sheet)
        }

        fn write_cell_text(&self, sheet: &str, cell: CellRef, text: &str) -> AppResult<()> {
            self.inner.write_cell_text(sheet, cell, text)
        }

        fn find_exact(&self, sheet: &str, column: usize, pattern: &str) -> AppResult<Option<usize>> {
            self.exact_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_exact(sheet, column, pattern)
        }
    }

    #[test]
    fn test_exact_lookup_goes_through_store() {
        let store = Arc::new(CountingStore {
            inner: roster_store(),
            exact_calls: AtomicUsize::new(0),
        });
        let svc = RosterService::new(store.clone(), RosterConfig::default());

        assert_eq!(svc.find_row("홍길동", ResolvePolicy::ExactFirst).unwrap(), 5);
        assert_eq!(store.exact_calls.load(Ordering::SeqCst), 1);

        // 原文不一致时退回规范化匹配
        assert_eq!(svc.find_row("홍\u{200B}길동", ResolvePolicy::ExactFirst).unwrap(), 5);
        assert_eq!(store.exact_calls.load(Ordering::SeqCst), 2);

        assert_eq!(svc.find_row("홍길동", ResolvePolicy::NormalizedOnly).unwrap(), 5);
        assert_eq!(store.exact_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_find_row_policies() {
        let store = roster_store();
        let svc = service(&store);
        assert_eq!(svc.find_row("홍길동", ResolvePolicy::ExactFirst).unwrap(), 5);
        assert_eq!(svc.find_row(" 홍\u{200B}길동", ResolvePolicy::NormalizedOnly).unwrap(), 5);
        assert!(matches!(
            svc.find_row("없는사람", ResolvePolicy::ExactFirst),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_issue_writes_literal_code_and_audit() {
        let store = roster_store();
        let svc = service(&store);
        let issued = svc.issue_for_name("이영희", false, "관리자").unwrap();

        assert_eq!(issued.row, 3);
        assert!(!issued.is_reissue());
        assert!(is_valid_code(&issued.code, "72"));
        assert_eq!(store.read_cell("군번", CellRef::new(3, 4)).unwrap(), issued.code);
        assert_eq!(store.read_cell("군번", CellRef::new(13, 9)).unwrap(), "관리자");
        assert!(store.is_text_column("군번", 4));
    }

    #[test]
    fn test_issue_never_collides_with_existing() {
        let store = roster_store();
        let svc = service(&store);
        // 让种子产生的前 30 个候选都已存在
        let mut probe = StdRng::seed_from_u64(99);
        for r in 0..30 {
            store.set_cell("군번", CellRef::new(20 + r, 4), &generate_code(&mut probe, "72"));
        }
        let before = svc.existing_codes().unwrap();

        let mut rng = StdRng::seed_from_u64(99);
        let issued = svc.issue_code_with_rng(&mut rng, 5, "홍길동", false, "t").unwrap();
        assert!(!before.contains(&issued.code));
    }

    #[test]
    fn test_issue_without_force_is_idempotent() {
        let store = roster_store();
        let svc = service(&store);
        let first = svc.issue_code(3, "이영희", false, "t").unwrap();
        let second = svc.issue_code(3, "이영희", false, "t");
        match second {
            Err(AppError::AlreadyIssued { code, .. }) => assert_eq!(code, first.code),
            other => panic!("expected AlreadyIssued, got {other:?}"),
        }
        assert_eq!(store.read_cell("군번", CellRef::new(3, 4)).unwrap(), first.code);
    }

    #[test]
    fn test_exhaustion_performs_no_write() {
        let store = roster_store();
        let config = RosterConfig {
            max_attempts: 5,
            ..RosterConfig::default()
        };
        let svc = RosterService::new(store.clone(), config);
        let mut probe = StdRng::seed_from_u64(3);
        for r in 0..5 {
            store.set_cell("군번", CellRef::new(30 + r, 4), &generate_code(&mut probe, "72"));
        }

        let mut rng = StdRng::seed_from_u64(3);
        let err = svc
            .issue_code_with_rng(&mut rng, 5, "홍길동", false, "t")
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationExhausted { attempts: 5 }));
        assert_eq!(store.read_cell("군번", CellRef::new(5, 4)).unwrap(), "");
        assert_eq!(store.read_cell("군번", CellRef::new(13, 9)).unwrap(), "");
    }

    #[test]
    fn test_stale_formula_is_replaced() {
        let store = roster_store();
        store.set_formula("군번", CellRef::new(6, 4), "=D5", "");
        let svc = service(&store);
        let issued = svc.issue_code(6, "최강", false, "t").unwrap();
        assert_eq!(
            store.cell("군번", CellRef::new(6, 4)),
            Some(crate::store::memory::Cell::Text(issued.code))
        );
    }

    #[test]
    fn test_audit_failure_does_not_fail_issue() {
        let store = roster_store();
        store.fail_writes_to("군번", CellRef::new(13, 9));
        let svc = service(&store);
        let issued = svc.issue_code(7, "정하늘", false, "t").unwrap();
        assert_eq!(store.read_cell("군번", CellRef::new(7, 4)).unwrap(), issued.code);
    }

    #[test]
    fn test_code_write_failure_propagates() {
        let store = roster_store();
        store.fail_writes_to("군번", CellRef::new(7, 4));
        let svc = service(&store);
        let err = svc.issue_code(7, "정하늘", false, "t").unwrap_err();
        assert!(err.is_store_failure());
    }

    #[test]
    fn test_end_to_end_issue_and_reissue() {
        let store = roster_store();
        let svc = service(&store);
        assert_eq!(svc.find_row("홍길동", ResolvePolicy::ExactFirst).unwrap(), 5);

        // 首次发放
        let first = svc
            .issue_code_with_rng(&mut StdRng::seed_from_u64(11), 5, "홍길동", false, "a")
            .unwrap();
        assert!(is_valid_code(&first.code, "72"));
        assert_eq!(first.previous, None);

        // 未强制：返回相同军番
        match svc.issue_code(5, "홍길동", false, "a") {
            Err(AppError::AlreadyIssued { code, .. }) => assert_eq!(code, first.code),
            other => panic!("expected AlreadyIssued, got {other:?}"),
        }

        // 强制重新发放：换成新号
        let second = svc
            .issue_code_with_rng(&mut StdRng::seed_from_u64(11), 5, "홍길동", true, "a")
            .unwrap();
        assert_ne!(second.code, first.code);
        assert_eq!(second.previous.as_deref(), Some(first.code.as_str()));
        assert!(!svc.existing_codes().unwrap().contains(&first.code));

        // 旧号可以发给其他行：同一种子的第一个候选就是旧号
        let other = svc
            .issue_code_with_rng(&mut StdRng::seed_from_u64(11), 6, "최강", false, "a")
            .unwrap();
        assert_eq!(other.code, first.code);
    }

    #[test]
    fn test_draw_strict() {
        let store = roster_store();
        let svc = service(&store);
        // 第 6 行起：최강, 정하늘
        let result = svc.draw(2).unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.total, 2);
        let mut winners = result.winners.clone();
        winners.sort();
        assert_eq!(winners, vec!["정하늘".to_string(), "최강".to_string()]);

        assert!(matches!(svc.draw(3), Err(AppError::InvalidArgument(_))));
        assert!(matches!(svc.draw(0), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_draw_empty_pool() {
        let store = Arc::new(MemoryStore::new());
        store.set_column("군번", 2, &["이름", "a", "b", "c"]);
        let svc = service(&store);
        assert!(matches!(svc.draw(1), Err(AppError::EmptyPool(_))));
    }

    #[test]
    fn test_rank_of() {
        let store = roster_store();
        let svc = service(&store);
        assert_eq!(svc.rank_of("홍길동").unwrap(), "일병");
        // 部分匹配唯一
        assert_eq!(svc.rank_of("김철").unwrap(), "병장");
        // 阶级为空
        assert!(matches!(svc.rank_of("박민수"), Err(AppError::NotFound(_))));
        assert!(matches!(svc.rank_of("누구"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_store_failure_propagates_from_resolve() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let svc = RosterService::new(store.clone(), RosterConfig::default());
        let err = svc.find_row("홍길동", ResolvePolicy::ExactFirst).unwrap_err();
        assert!(err.is_store_failure());
        assert!(store.read_rows("군번").is_err());
    }
}

use super::normalize::normalize;

/// 按姓名查找行的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePolicy {
    /// 原文精确匹配优先，其次规范化匹配，最后唯一的部分匹配（发放军番）
    ExactFirst,
    /// 只做规范化匹配与唯一的部分匹配（运势查询阶级）
    NormalizedOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMatch {
    Found(usize),
    Missing,
    /// 部分匹配命中多行，不做猜测
    Ambiguous(Vec<usize>),
}

impl RowMatch {
    pub fn row(&self) -> Option<usize> {
        match self {
            RowMatch::Found(row) => Some(*row),
            _ => None,
        }
    }
}

/// 在姓名列中查找目标行。
///
/// `column` 为整列数据（下标 0 是第 1 行表头），返回的行号为 1 起始。
pub fn resolve_row(column: &[String], target: &str, policy: ResolvePolicy) -> RowMatch {
    let norm_target = normalize(target);
    if norm_target.is_empty() {
        return RowMatch::Missing;
    }

    let rows = || column.iter().enumerate().skip(1).map(|(idx, v)| (idx + 1, v));

    if policy == ResolvePolicy::ExactFirst {
        let raw_target = target.trim();
        if let Some((row, _)) = rows().find(|(_, v)| v.trim() == raw_target) {
            return RowMatch::Found(row);
        }
    }

    let normalized: Vec<(usize, String)> = rows().map(|(row, v)| (row, normalize(v))).collect();

    if let Some((row, _)) = normalized.iter().find(|(_, v)| *v == norm_target) {
        return RowMatch::Found(*row);
    }

    let candidates: Vec<usize> = normalized
        .iter()
        .filter(|(_, v)| {
            !v.is_empty() && (v.contains(norm_target.as_str()) || norm_target.contains(v.as_str()))
        })
        .map(|(row, _)| *row)
        .collect();

    match candidates.len() {
        0 => RowMatch::Missing,
        1 => RowMatch::Found(candidates[0]),
        _ => RowMatch::Ambiguous(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(names: &[&str]) -> Vec<String> {
        std::iter::once("이름")
            .chain(names.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_exact_raw_match_wins() {
        let col = column(&["Kim", "Kim ", "Ki m"]);
        assert_eq!(
            resolve_row(&col, "Kim", ResolvePolicy::ExactFirst),
            RowMatch::Found(2)
        );
        assert_eq!(
            resolve_row(&col, "Kim", ResolvePolicy::NormalizedOnly),
            RowMatch::Found(2)
        );
    }

    #[test]
    fn test_exact_match_preferred_over_earlier_normalized_match() {
        // 第 2 行规范化后等于目标，但第 3 行是原文精确匹配
        let col = column(&["Ｋｉｍ", "Kim"]);
        assert_eq!(
            resolve_row(&col, "Kim", ResolvePolicy::ExactFirst),
            RowMatch::Found(3)
        );
        assert_eq!(
            resolve_row(&col, "Kim", ResolvePolicy::NormalizedOnly),
            RowMatch::Found(2)
        );
    }

    #[test]
    fn test_normalized_match() {
        let col = column(&["김철수", "홍\u{200B}길동"]);
        assert_eq!(
            resolve_row(&col, " 홍길동 ", ResolvePolicy::ExactFirst),
            RowMatch::Found(3)
        );
    }

    #[test]
    fn test_unique_substring_match() {
        let col = column(&["김철수", "홍길동 병장"]);
        assert_eq!(
            resolve_row(&col, "홍길동", ResolvePolicy::NormalizedOnly),
            RowMatch::Found(3)
        );
        // 反方向：目标包含表中姓名
        assert_eq!(
            resolve_row(&col, "김철수님", ResolvePolicy::NormalizedOnly),
            RowMatch::Found(2)
        );
    }

    #[test]
    fn test_ambiguous_substring_is_not_found() {
        let col = column(&["Kim Min", "Kim Minsu"]);
        let m = resolve_row(&col, "Min", ResolvePolicy::ExactFirst);
        assert_eq!(m, RowMatch::Ambiguous(vec![2, 3]));
        assert_eq!(m.row(), None);
    }

    #[test]
    fn test_empty_target_and_header_ignored() {
        let col = column(&["", "Kim"]);
        assert_eq!(
            resolve_row(&col, " \u{200B} ", ResolvePolicy::ExactFirst),
            RowMatch::Missing
        );
        // 表头不参与匹配
        assert_eq!(
            resolve_row(&col, "이름", ResolvePolicy::ExactFirst),
            RowMatch::Missing
        );
        assert_eq!(
            resolve_row(&col, "Lee", ResolvePolicy::NormalizedOnly),
            RowMatch::Missing
        );
    }
}

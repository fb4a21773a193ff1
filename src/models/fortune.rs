use chrono::NaiveDate;

/// 运势表中按表头取出的各列（已去首尾空白，保留空值与重复）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FortuneCatalog {
    pub ranks: Vec<String>,
    pub fortunes: Vec<String>,
    pub advices: Vec<String>,
    pub lucky_items: Vec<String>,
}

/// 个人运势
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FortuneReading {
    pub name: String,
    /// 名册中的阶级
    pub rank: String,
    pub fortune: String,
    pub advice: String,
    pub lucky_item: String,
}

/// 当日综合排名（完整排列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallRanking {
    pub day: NaiveDate,
    pub ranks: Vec<String>,
}

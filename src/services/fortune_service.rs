use crate::config::FortuneConfig;
use crate::error::{AppError, AppResult};
use crate::models::{FortuneCatalog, FortuneReading, OverallRanking};
use crate::services::RosterService;
use crate::store::SharedStore;
use crate::utils::DailySelector;
use chrono::NaiveDate;
use std::collections::HashMap;

/// 某列没有任何有效值时显示的文字
pub const NO_DATA: &str = "데이터 없음";

#[derive(Clone)]
pub struct FortuneService {
    store: SharedStore,
    config: FortuneConfig,
    roster: RosterService,
}

impl FortuneService {
    pub fn new(store: SharedStore, config: FortuneConfig, roster: RosterService) -> Self {
        Self {
            store,
            config,
            roster,
        }
    }

    /// 读取运势表，按表头标题定位必需的四列
    pub fn catalog(&self) -> AppResult<FortuneCatalog> {
        let values = self.store.read_rows(&self.config.sheet)?;
        let Some((header, rows)) = values.split_first() else {
            return Err(AppError::MalformedSheet(format!(
                "{} 시트가 비어 있습니다.",
                self.config.sheet
            )));
        };

        let col_idx: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect(); // 重名表头以最右边一列为准

        let column = |title: &str| -> AppResult<Vec<String>> {
            let idx = *col_idx.get(title).ok_or_else(|| {
                AppError::MalformedSheet(format!(
                    "{} 시트에 '{}' 열이 없습니다. (헤더 1행 확인)",
                    self.config.sheet, title
                ))
            })?;
            Ok(rows
                .iter()
                .map(|r| r.get(idx).map(|v| v.trim().to_string()).unwrap_or_default())
                .collect())
        };

        Ok(FortuneCatalog {
            ranks: column(self.config.rank_header.as_str())?,
            fortunes: column(self.config.fortune_header.as_str())?,
            advices: column(self.config.advice_header.as_str())?,
            lucky_items: column(self.config.lucky_header.as_str())?,
        })
    }

    /// 个人运势：名册中查阶级，再按 (日期, 姓名|类别, 候选数) 固定抽取
    pub fn personal_reading(&self, name: &str, day: NaiveDate) -> AppResult<FortuneReading> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidArgument("이름을 입력하세요.".to_string()));
        }

        let rank = self.roster.rank_of(name)?;
        let catalog = self.catalog()?;
        let selector = DailySelector::for_day(day);
        let pick = |pool: &[String], category: &str| {
            selector
                .pick_one(pool, &format!("{name}|{category}"))
                .unwrap_or_else(|| NO_DATA.to_string())
        };

        Ok(FortuneReading {
            name: name.to_string(),
            rank,
            fortune: pick(catalog.fortunes.as_slice(), "fortune"),
            advice: pick(catalog.advices.as_slice(), "advice"),
            lucky_item: pick(catalog.lucky_items.as_slice(), "lucky"),
        })
    }

    /// 当日综合排名：阶级去重后按日固定打乱，输出全部
    pub fn overall_ranking(&self, day: NaiveDate) -> AppResult<OverallRanking> {
        let catalog = self.catalog()?;
        let ranks = DailySelector::for_day(day).rank_all(&catalog.ranks, "overall");
        if ranks.is_empty() {
            return Err(AppError::EmptyPool(format!(
                "'{}' 시트에 '{}' 데이터가 없습니다.",
                self.config.sheet, self.config.rank_header
            )));
        }
        Ok(OverallRanking { day, ranks })
    }
}

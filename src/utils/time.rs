use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// 日界线固定为 UTC+9
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

pub fn kst_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

/// 给定时刻在 UTC+9 下的日历日期
pub fn kst_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&kst()).date_naive()
}

pub fn kst_today() -> NaiveDate {
    kst_date(Utc::now())
}

/// 回复末尾的时间戳格式
pub fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

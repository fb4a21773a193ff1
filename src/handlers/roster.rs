use super::CommandContext;
use crate::error::{AppError, AppResult};
use crate::models::DrawResult;
use crate::services::RosterService;
use crate::utils::{SampleMode, parse_count, parse_names_and_count, sample_without_replacement};

/// 允许强制重新发放的选项（去空白后不区分大小写）
const FORCE_FLAGS: [&str; 4] = ["강제", "--force", "force", "재발급"];

pub fn is_force_flag(option: &str) -> bool {
    FORCE_FLAGS.contains(&option.trim().to_lowercase().as_str())
}

/// `!군번 이름 [강제]`
pub fn issue(roster: &RosterService, args: &[String], ctx: &CommandContext) -> AppResult<String> {
    let Some(name) = args.first() else {
        return Err(AppError::InvalidArgument(
            "이름을 입력하세요. 예) `!군번 홍길동`".to_string(),
        ));
    };
    let force = args.get(1).is_some_and(|opt| is_force_flag(opt));

    let issued = roster.issue_for_name(name, force, &ctx.author)?;
    Ok(match &issued.previous {
        Some(old) => format!(
            "✅ '{}' 군번 재발급 완료: `{}` → `{}`",
            issued.name, old, issued.code
        ),
        None => format!("✅ '{}'에게 군번 `{}` 부여 완료.", issued.name, issued.code),
    })
}

/// `!추첨 k`：名册抽签
pub fn draw(roster: &RosterService, args: &[String]) -> AppResult<String> {
    let Some(raw) = args.first() else {
        return Err(AppError::InvalidArgument(
            "숫자를 입력하세요. 예) `!추첨 3`".to_string(),
        ));
    };
    let k = parse_count(raw)?;
    let result = roster.draw(k)?;
    log::info!("Roster draw picked {} of {}", result.count, result.total);
    Ok(format!(
        "추첨 결과 ({}명): {}",
        result.count,
        result.winners.join(", ")
    ))
}

/// `!랜덤 이름... k`：从给定姓名中抽取，k 超出时取全部
pub fn random_pick(args: &[String]) -> AppResult<String> {
    let (names, k) = parse_names_and_count(args)?;
    let winners = sample_without_replacement(&names, k, SampleMode::Clamp)?;
    let result = DrawResult {
        count: winners.len(),
        total: names.len(),
        winners,
    };
    Ok(format!(
        "랜덤 선택 ({}명): {}",
        result.count,
        result.winners.join(", ")
    ))
}

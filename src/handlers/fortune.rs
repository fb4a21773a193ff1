use super::{CommandContext, wrap_reply};
use crate::error::{AppError, AppResult};
use crate::services::FortuneService;

/// `!운세` 不带参数时的菜单提示
pub fn menu(ctx: &CommandContext) -> String {
    format!(
        "{} 운세 메뉴를 선택하세요:\n[종합] `!운세 종합`\n[개인] `!운세 개인 이름`",
        ctx.author
    )
}

/// 当日全部阶级排名
pub fn overall(fortune: &FortuneService, ctx: &CommandContext) -> AppResult<String> {
    let ranking = fortune.overall_ranking(ctx.now.date_naive())?;
    let mut lines = vec!["오늘의 종합 운세 순위".to_string()];
    lines.extend(
        ranking
            .ranks
            .iter()
            .enumerate()
            .map(|(i, rank)| format!("{}위: {}", i + 1, rank)),
    );
    Ok(lines.join("\n"))
}

/// 个人运势；姓名可以含空格
pub fn personal(fortune: &FortuneService, args: &[String], ctx: &CommandContext) -> AppResult<String> {
    let name = args.join(" ");
    if name.trim().is_empty() {
        return Err(AppError::InvalidArgument("이름을 입력하세요.".to_string()));
    }
    let reading = fortune.personal_reading(&name, ctx.now.date_naive())?;
    Ok(format!(
        "오늘의 운세 결과\n이름: {}\n계급: {}\n운세: {}\n조언: {}\n행운의 아이템: {}",
        reading.name, reading.rank, reading.fortune, reading.advice, reading.lucky_item
    ))
}

/// 未知子菜单
pub fn unknown_menu(option: &str, ctx: &CommandContext) -> String {
    wrap_reply(
        &format!("⚠️ 알 수 없는 운세 메뉴입니다: {option} (종합 / 개인)"),
        ctx,
    )
}

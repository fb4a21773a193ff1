use super::CommandContext;
use crate::error::{AppError, AppResult};
use crate::models::{DICE_SIDES, DiceRoll};
use crate::services::HealthService;
use crate::utils::roll_die;

pub fn ping(ctx: &CommandContext) -> String {
    format!("현재 봇이 구동 중입니다.\n{}", ctx.timestamp())
}

/// 写入 `A1` 再读回，确认表格可以访问
pub fn sheet_test(health: &HealthService, ctx: &CommandContext) -> String {
    match health.probe(&ctx.timestamp()) {
        Ok(value) => format!("A1 = {value}"),
        Err(e) => {
            log::error!("Sheet connectivity check failed: {e}");
            format!("❌ 시트 접근 실패: {e}")
        }
    }
}

fn parse_sides(raw: &str) -> AppResult<u32> {
    let raw = raw.trim().trim_start_matches("1d").trim_start_matches('d');
    raw.parse::<u32>()
        .ok()
        .filter(|sides| DICE_SIDES.contains(sides))
        .ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "지원하지 않는 주사위입니다. ({})",
                dice_list()
            ))
        })
}

fn dice_list() -> String {
    DICE_SIDES
        .iter()
        .map(|s| format!("1d{s}"))
        .collect::<Vec<_>>()
        .join(" / ")
}

pub fn roll(raw: &str) -> AppResult<DiceRoll> {
    let sides = parse_sides(raw)?;
    Ok(DiceRoll {
        sides,
        value: roll_die(sides)?,
    })
}

/// `!다이스 [6|10|100]`：不带参数时列出可用骰子
pub fn dice(args: &[String], ctx: &CommandContext) -> String {
    let Some(raw) = args.first() else {
        return format!(
            "{} 굴릴 주사위를 선택하세요: {}\n예) `!다이스 6`",
            ctx.author,
            dice_list()
        );
    };
    match roll(raw) {
        Ok(r) => format!(
            "{}의 **1d{}** 결과: **{}**\n{}",
            ctx.author,
            r.sides,
            r.value,
            ctx.timestamp()
        ),
        Err(e) => super::wrap_reply(&e.reply_text(), ctx),
    }
}

pub fn help(prefix: &str) -> String {
    [
        ("접속", "봇 구동 상태를 확인합니다."),
        ("시트테스트", "'연결 확인' 시트 A1에 기록 후 다시 읽습니다."),
        ("다이스 [6|10|100]", "주사위를 굴립니다."),
        ("군번 이름 [강제]", "'군번' 시트에서 이름을 찾아 고유 군번(72******)을 기입합니다."),
        ("추첨 숫자", "'군번' 시트 B6 이후 이름 중에서 무작위 추첨합니다."),
        ("랜덤 이름1 이름2 ... 숫자", "입력한 이름 중 서로 다른 k명을 뽑습니다."),
        ("운세 종합", "오늘의 종합 운세 순위를 보여줍니다."),
        ("운세 개인 이름", "오늘의 개인 운세를 보여줍니다."),
    ]
    .iter()
    .map(|(usage, desc)| format!("`{prefix}{usage}` {desc}"))
    .collect::<Vec<_>>()
    .join("\n")
}

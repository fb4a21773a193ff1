pub mod fortune;
pub mod misc;
pub mod roster;

use crate::error::AppResult;
use crate::services::{FortuneService, HealthService, RosterService};
use crate::utils::{format_timestamp, kst_now};
use chrono::{DateTime, FixedOffset};

/// 一条命令的调用上下文
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// 发送者显示名，同时作为名册的最后修改人
    pub author: String,
    /// UTC+9 当前时刻
    pub now: DateTime<FixedOffset>,
}

impl CommandContext {
    pub fn new(author: impl Into<String>) -> Self {
        Self::at(author, kst_now())
    }

    pub fn at(author: impl Into<String>, now: DateTime<FixedOffset>) -> Self {
        Self {
            author: author.into(),
            now,
        }
    }

    pub fn timestamp(&self) -> String {
        format_timestamp(&self.now)
    }
}

/// 拆分 `!命令 参数...`；不是命令时返回 None
pub fn parse_command(text: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    let rest = text.trim().strip_prefix(prefix)?;
    // 前缀后紧跟空白（如 "! 군번"）不算命令
    if rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut parts = rest.split_whitespace();
    let command = parts.next()?.to_string();
    let args = parts.map(String::from).collect();
    Some((command, args))
}

/// 统一回复格式：`[결과]`、正文、时间戳
pub fn wrap_reply(body: &str, ctx: &CommandContext) -> String {
    format!("[결과]\n{}\n{}", body, ctx.timestamp())
}

fn render(result: AppResult<String>, ctx: &CommandContext) -> String {
    let body = match result {
        Ok(body) => body,
        Err(e) => e.reply_text(),
    };
    wrap_reply(&body, ctx)
}

/// 命令分发
#[derive(Clone)]
pub struct Dispatcher {
    roster: RosterService,
    fortune: FortuneService,
    health: HealthService,
    prefix: String,
}

impl Dispatcher {
    pub fn new(
        roster: RosterService,
        fortune: FortuneService,
        health: HealthService,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            roster,
            fortune,
            health,
            prefix: prefix.into(),
        }
    }

    /// 处理一条消息；非命令或未知命令不回复
    pub fn handle(&self, text: &str, ctx: &CommandContext) -> Option<String> {
        let (command, args) = parse_command(text, &self.prefix)?;
        log::debug!("Command '{command}' from '{}' with {} args", ctx.author, args.len());

        let reply = match command.as_str() {
            "접속" => misc::ping(ctx),
            "시트테스트" => misc::sheet_test(&self.health, ctx),
            "다이스" => misc::dice(&args, ctx),
            "도움말" => misc::help(&self.prefix),
            "군번" => render(roster::issue(&self.roster, &args, ctx), ctx),
            "추첨" => render(roster::draw(&self.roster, &args), ctx),
            "랜덤" => render(roster::random_pick(&args), ctx),
            "운세" => match args.first().map(String::as_str) {
                None => fortune::menu(ctx),
                Some("종합") => render(fortune::overall(&self.fortune, ctx), ctx),
                Some("개인") => render(fortune::personal(&self.fortune, &args[1..], ctx), ctx),
                Some(other) => fortune::unknown_menu(other, ctx),
            },
            _ => {
                log::debug!("Ignoring unknown command '{command}'");
                return None;
            }
        };
        Some(reply)
    }
}

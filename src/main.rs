use env_logger::{Env, Target};
use std::io::{BufRead, Write}; // for env_logger custom formatter and the console loop
use chrono::Local;  // timestamp in log lines
use std::sync::Arc;

use roster_bot::{
    config::Config,
    external::SheetsStore,
    handlers::{CommandContext, Dispatcher},
    services::*,
    store::{CellRef, MemoryStore, SharedStore, column_letters},
};

/// 离线模式：只建好表头的空白工作表
fn offline_store(config: &Config) -> MemoryStore {
    let store = MemoryStore::new();
    let roster = &config.roster;
    for (column, title) in [
        (roster.name_column, "이름"),
        (roster.rank_column, "계급"),
        (roster.code_column, "군번"),
    ] {
        store.set_cell(&roster.sheet, CellRef::new(1, column), title);
    }
    let fortune = &config.fortune;
    store.set_rows(
        &fortune.sheet,
        &[&[
            fortune.rank_header.as_str(),
            fortune.fortune_header.as_str(),
            fortune.advice_header.as_str(),
            fortune.lucky_header.as_str(),
        ]],
    );
    store.add_sheet(&config.bot.health_sheet);
    store
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        // 标准输出留给回复
        .target(Target::Stderr)
        .init();

    // 加载配置
    let config = Config::from_toml().map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    // 创建存储
    let store: SharedStore = if config.bot.offline {
        log::warn!("Running offline with an in-memory store; nothing is persisted");
        Arc::new(offline_store(&config))
    } else {
        Arc::new(SheetsStore::new(config.sheets.clone())?)
    };

    // 创建服务
    let roster_service = RosterService::new(store.clone(), config.roster.clone());
    let fortune_service =
        FortuneService::new(store.clone(), config.fortune.clone(), roster_service.clone());
    let health_service = HealthService::new(store.clone(), config.bot.health_sheet.clone());

    let dispatcher = Dispatcher::new(
        roster_service,
        fortune_service,
        health_service,
        config.bot.command_prefix.clone(),
    );

    log::info!(
        "Bot ready (sheet '{}', names in column {}, prefix '{}')",
        config.roster.sheet,
        column_letters(config.roster.name_column),
        config.bot.command_prefix
    );

    // 逐行读取标准输入，每行一条消息
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let ctx = CommandContext::new(config.bot.actor.clone());
        if let Some(reply) = dispatcher.handle(&line, &ctx) {
            writeln!(stdout, "{reply}")?;
            writeln!(stdout)?;
            stdout.flush()?;
        }
    }

    log::info!("Input closed, shutting down");
    Ok(())
}

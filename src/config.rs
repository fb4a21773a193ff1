use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub fortune: FortuneConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64, // seconds
}

/// '군번' 시트布局（列/行均为 1 起始）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub sheet: String,
    pub name_column: usize,
    pub rank_column: usize,
    pub code_column: usize,
    pub audit_row: usize,
    pub audit_column: usize,
    pub draw_start_row: usize,
    pub code_prefix: String,
    pub max_attempts: u32,
}

/// '운세' 시트：按表头标题定位列
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FortuneConfig {
    pub sheet: String,
    pub rank_header: String,
    pub fortune_header: String,
    pub advice_header: String,
    pub lucky_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub command_prefix: String,
    pub actor: String,
    pub offline: bool,
    pub health_sheet: String,
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            access_token: String::new(),
            base_url: default_sheets_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            sheet: "군번".to_string(),
            name_column: 2,
            rank_column: 3,
            code_column: 4,
            audit_row: 13,
            audit_column: 9,
            draw_start_row: 6,
            code_prefix: "72".to_string(),
            max_attempts: 2000,
        }
    }
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            sheet: "운세".to_string(),
            rank_header: "계급".to_string(),
            fortune_header: "운세".to_string(),
            advice_header: "조언".to_string(),
            lucky_header: "행운 아이템".to_string(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: "!".to_string(),
            actor: "console".to_string(),
            offline: false,
            health_sheet: "연결 확인".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 先读配置文件；不存在时完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let offline = get_env_parse("BOT_OFFLINE", false);
                // 在线模式且无配置文件时必须提供表格 ID
                let spreadsheet_id = match get_env("SHEET_KEY") {
                    Some(v) => v,
                    None if offline => String::new(),
                    None => {
                        return Err("缺少 SHEET_KEY 环境变量，且未找到配置文件 config.toml".into());
                    }
                };

                Config {
                    sheets: SheetsConfig {
                        spreadsheet_id,
                        access_token: get_env("SHEETS_ACCESS_TOKEN").unwrap_or_default(),
                        base_url: get_env("SHEETS_BASE_URL")
                            .unwrap_or_else(default_sheets_base_url),
                        timeout_secs: get_env_parse("SHEETS_TIMEOUT_SECS", default_timeout_secs()),
                    },
                    roster: RosterConfig::default(),
                    fortune: FortuneConfig::default(),
                    bot: BotConfig {
                        offline,
                        ..BotConfig::default()
                    },
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| format!("解析配置文件失败: {e}"))?;
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SHEET_KEY") {
            self.sheets.spreadsheet_id = v;
        }
        if let Ok(v) = env::var("SHEETS_ACCESS_TOKEN") {
            self.sheets.access_token = v;
        }
        if let Ok(v) = env::var("SHEETS_BASE_URL") {
            self.sheets.base_url = v;
        }
        if let Ok(v) = env::var("SHEETS_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.sheets.timeout_secs = n;
            }
        }
        if let Ok(v) = env::var("BOT_ACTOR") {
            self.bot.actor = v;
        }
        if let Ok(v) = env::var("BOT_COMMAND_PREFIX") {
            self.bot.command_prefix = v;
        }
        if let Ok(v) = env::var("BOT_OFFLINE") {
            if let Ok(b) = v.parse() {
                self.bot.offline = b;
            }
        }
        if let Ok(v) = env::var("ROSTER_MAX_ATTEMPTS") {
            if let Ok(n) = v.parse() {
                self.roster.max_attempts = n;
            }
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.bot.offline && self.sheets.spreadsheet_id.is_empty() {
            return Err("sheets.spreadsheet_id 不能为空（或设置 bot.offline = true）".into());
        }
        if self.bot.command_prefix.is_empty() {
            return Err("bot.command_prefix 不能为空".into());
        }
        let r = &self.roster;
        if [r.name_column, r.rank_column, r.code_column, r.audit_row, r.audit_column]
            .contains(&0)
        {
            return Err("roster 的行/列编号从 1 开始".into());
        }
        if r.draw_start_row < 2 {
            return Err("roster.draw_start_row 必须跳过表头（>= 2）".into());
        }
        // 键空间为 10^6，重试次数过低会导致正常规模下也可能耗尽
        if r.max_attempts < 1000 {
            return Err("roster.max_attempts 至少为 1000".into());
        }
        if r.code_prefix.is_empty() || !r.code_prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err("roster.code_prefix 必须是数字".into());
        }
        Ok(())
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse(
            r#"
            [sheets]
            spreadsheet_id = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.sheets.spreadsheet_id, "abc");
        assert_eq!(config.sheets.base_url, "https://sheets.googleapis.com");
        assert_eq!(config.roster.sheet, "군번");
        assert_eq!(config.roster.code_column, 4);
        assert_eq!(config.roster.max_attempts, 2000);
        assert_eq!(config.fortune.lucky_header, "행운 아이템");
        assert_eq!(config.bot.command_prefix, "!");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_overrides_sections() {
        let config = Config::parse(
            r#"
            [roster]
            sheet = "Roster"
            draw_start_row = 2

            [bot]
            offline = true
            actor = "tester"
            "#,
        )
        .unwrap();
        assert_eq!(config.roster.sheet, "Roster");
        assert_eq!(config.roster.draw_start_row, 2);
        // 未写的字段保持默认
        assert_eq!(config.roster.code_prefix, "72");
        assert!(config.bot.offline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::parse("[bot]\noffline = true\n").unwrap();
        config.roster.max_attempts = 10;
        assert!(config.validate().is_err());

        let mut config = Config::parse("[bot]\noffline = true\n").unwrap();
        config.roster.code_column = 0;
        assert!(config.validate().is_err());

        let config = Config::parse("").unwrap();
        // 在线模式缺少 spreadsheet_id
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let config = Config::parse(include_str!("../config.toml.example")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.roster.audit_row, RosterConfig::default().audit_row);
        assert_eq!(config.bot.health_sheet, BotConfig::default().health_sheet);
    }
}

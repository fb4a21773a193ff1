use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Code already issued: {code}")]
    AlreadyIssued { name: String, code: String },

    #[error("Code generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    #[error("Empty pool: {0}")]
    EmptyPool(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store failure: {0}")]
    StoreFailure(String),

    #[error("Malformed sheet: {0}")]
    MalformedSheet(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// 外部存储（表格）相关的失败
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            AppError::StoreFailure(_) | AppError::HttpError(_) | AppError::SerdeJsonError(_)
        )
    }

    /// 转换为回复正文（不含 `[결과]` 头与时间戳）
    pub fn reply_text(&self) -> String {
        match self {
            AppError::NotFound(msg) => {
                log::warn!("Not found: {msg}");
                format!("❌ {msg}")
            }
            AppError::AlreadyIssued { name, code } => {
                format!("ℹ️ '{name}'은(는) 이미 군번 `{code}`가 있습니다.")
            }
            AppError::GenerationExhausted { attempts } => {
                log::error!("Code generation exhausted after {attempts} attempts");
                "❌ 군번 생성 실패: 잠시 후 다시 시도해 주세요.".to_string()
            }
            AppError::EmptyPool(msg) => {
                log::warn!("Empty pool: {msg}");
                format!("⚠️ {msg}")
            }
            AppError::InvalidArgument(msg) => {
                log::warn!("Invalid argument: {msg}");
                format!("⚠️ {msg}")
            }
            AppError::MalformedSheet(msg) => {
                log::error!("Malformed sheet: {msg}");
                format!("❌ {msg}")
            }
            _ => {
                log::error!("Store error: {self}");
                format!("❌ 처리 실패: {self}")
            }
        }
    }
}

use crate::config::SheetsConfig;
use crate::error::{AppError, AppResult};
use crate::store::{CellRef, RecordStore, column_letters};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(rename = "majorDimension", default)]
    pub major_dimension: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

/// Google Sheets v4 REST 存储。
///
/// 只实现名册/运势所需的单元格读写；访问令牌由外部签发并通过配置传入。
pub struct SheetsStore {
    client: Client,
    config: SheetsConfig,
    sheet_ids: RwLock<HashMap<String, i64>>,
}

impl SheetsStore {
    pub fn new(config: SheetsConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent("roster-bot/sheets")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            sheet_ids: RwLock::new(HashMap::new()),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/{segments...}`，各段自动百分号编码
    fn url(&self, tail: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AppError::ConfigError(format!("invalid sheets base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("sheets base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(tail);
        Ok(url)
    }

    fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(AppError::StoreFailure(format!(
            "Sheets API HTTP {}: {}",
            status.as_u16(),
            body
        )))
    }

    fn get_values(&self, range: &str, major_dimension: &str) -> AppResult<Vec<Vec<String>>> {
        let url = self.url(&[self.config.spreadsheet_id.as_str(), "values", range])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .query(&[
                ("majorDimension", major_dimension),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()?;
        let result: ValueRange = Self::check(response)?.json()?;
        Ok(result.values)
    }

    /// 工作表标题 -> 数字 sheetId（带缓存）
    fn sheet_id(&self, sheet: &str) -> AppResult<Option<i64>> {
        {
            let cache = self.sheet_ids.read().unwrap_or_else(|e| e.into_inner());
            if let Some(id) = cache.get(sheet) {
                return Ok(Some(*id));
            }
        }

        let url = self.url(&[self.config.spreadsheet_id.as_str()])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()?;
        let meta: SpreadsheetMeta = Self::check(response)?.json()?;

        let mut cache = self.sheet_ids.write().unwrap_or_else(|e| e.into_inner());
        for entry in meta.sheets {
            cache.insert(entry.properties.title, entry.properties.sheet_id);
        }
        Ok(cache.get(sheet).copied())
    }

    fn batch_update(&self, requests: Vec<Value>) -> AppResult<()> {
        let endpoint = format!("{}:batchUpdate", self.config.spreadsheet_id);
        let url = self.url(&[endpoint.as_str()])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "requests": requests }))
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn put_raw(&self, range: &str, text: &str) -> AppResult<()> {
        let url = self.url(&[self.config.spreadsheet_id.as_str(), "values", range])?;
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.config.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": [[text]] }))
            .send()?;
        Self::check(response)?;
        Ok(())
    }
}

/// `'시트'!B:B` 之类的 A1 区间；工作表名中的单引号需要双写
pub fn a1_range(sheet: &str, range: Option<&str>) -> String {
    let quoted = format!("'{}'", sheet.replace('\'', "''"));
    match range {
        Some(r) => format!("{quoted}!{r}"),
        None => quoted,
    }
}

/// 字面文本写入的三个请求：整列固定为 TEXT 格式、清除目标单元格、写入字符串值。
/// 放在同一个 batchUpdate 里，要么全部生效要么都不生效。
pub fn text_write_requests(sheet_id: i64, cell: CellRef, text: &str) -> Vec<Value> {
    let row = cell.row as i64;
    let col = cell.column as i64;
    let target = json!({
        "sheetId": sheet_id,
        "startRowIndex": row - 1,
        "endRowIndex": row,
        "startColumnIndex": col - 1,
        "endColumnIndex": col,
    });
    vec![
        json!({
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startColumnIndex": col - 1,
                    "endColumnIndex": col,
                },
                "cell": { "userEnteredFormat": { "numberFormat": { "type": "TEXT" } } },
                "fields": "userEnteredFormat.numberFormat",
            }
        }),
        json!({
            "updateCells": {
                "range": target.clone(),
                "fields": "userEnteredValue",
            }
        }),
        json!({
            "updateCells": {
                "range": target,
                "rows": [{ "values": [{ "userEnteredValue": { "stringValue": text } }] }],
                "fields": "userEnteredValue",
            }
        }),
    ]
}

impl RecordStore for SheetsStore {
    fn read_column(&self, sheet: &str, column: usize) -> AppResult<Vec<String>> {
        let letters = column_letters(column);
        let range = a1_range(sheet, Some(&format!("{letters}:{letters}")));
        let values = self.get_values(&range, "COLUMNS")?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    fn read_cell(&self, sheet: &str, cell: CellRef) -> AppResult<String> {
        let range = a1_range(sheet, Some(&cell.a1()));
        let values = self.get_values(&range, "ROWS")?;
        Ok(values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }

    fn read_rows(&self, sheet: &str) -> AppResult<Vec<Vec<String>>> {
        self.get_values(&a1_range(sheet, None), "ROWS")
    }

    fn write_cell_text(&self, sheet: &str, cell: CellRef, text: &str) -> AppResult<()> {
        match self.sheet_id(sheet)? {
            Some(id) => self.batch_update(text_write_requests(id, cell, text))?,
            None => {
                // 拿不到 sheetId 时退回 RAW 写入
                log::warn!("sheetId for '{sheet}' not found, falling back to RAW write");
                self.put_raw(&a1_range(sheet, Some(&cell.a1())), text)?;
            }
        }
        log::debug!("Wrote text to {sheet}!{}", cell.a1());
        Ok(())
    }
}

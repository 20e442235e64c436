use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ROW_HEIGHT_PX: f64 = 60.0;
pub const DEFAULT_TICK_SECONDS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_START_COLUMN: &str = "start_time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HourFormat {
    #[default]
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "12h")]
    H12,
}

impl FromStr for HourFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" | "24" => Ok(Self::H24),
            "12h" | "12" => Ok(Self::H12),
            other => Err(format!("unknown hour format '{}', expected 24h or 12h", other)),
        }
    }
}

impl fmt::Display for HourFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H24 => f.write_str("24h"),
            Self::H12 => f.write_str("12h"),
        }
    }
}

/// 網格顯示設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    /// 每小時一列的像素高度
    pub row_height_px: f64,
    pub week_starts_on: Weekday,
    pub hour_format: HourFormat,
    /// 目前時間指示線的刷新間隔
    pub tick_seconds: u64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
            week_starts_on: Weekday::Sun,
            hour_format: HourFormat::H24,
            tick_seconds: DEFAULT_TICK_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// 用來依範圍過濾的欄位名稱
    pub start_column: String,
    /// 後端回傳帶時區的時間時，轉換成診所當地時間所用的偏移
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileSettings {
    pub path: String,
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceSettings {
    Rest(RestSettings),
    File(FileSettings),
    /// 內建的示範資料
    Demo,
}

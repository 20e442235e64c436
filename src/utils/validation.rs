//! 日曆設定值的檢查。錯誤訊息都帶著設定欄位名稱，方便對照設定檔或命令列參數。

use crate::utils::error::{CalendarError, Result};
use std::ops::RangeInclusive;
use std::path::Path;
use url::Url;

/// 允許的時區偏移（分鐘），UTC-12:00 到 UTC+14:00
pub const UTC_OFFSET_MINUTES: RangeInclusive<i32> = -720..=840;

/// 每小時一列的高度（px）
pub const ROW_HEIGHT_PX: RangeInclusive<f64> = 10.0..=400.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> CalendarError {
    CalendarError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn require<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CalendarError::MissingConfigError {
        field: field.to_string(),
    })
}

/// 預約 API 位址：http 或 https，且要有主機
pub fn endpoint(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value.trim())
        .map_err(|e| invalid(field, value, format!("Not a usable endpoint URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Appointments are fetched over http(s), got {}://", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field, value, "Endpoint URL has no host"));
    }
    Ok(())
}

/// 預約 JSON 檔。檔案可以之後才出現，但不能是目錄
pub fn appointment_file(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Appointment file path is empty"));
    }
    if Path::new(path).is_dir() {
        return Err(invalid(field, path, "Expected a JSON file, found a directory"));
    }
    Ok(())
}

/// 篩選用的時間欄位，會直接放進查詢參數名稱
pub fn column_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(field, name, "Column name is empty"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(
            field,
            name,
            "Column names may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

pub fn utc_offset_minutes(field: &str, minutes: i32) -> Result<()> {
    if UTC_OFFSET_MINUTES.contains(&minutes) {
        return Ok(());
    }
    Err(invalid(
        field,
        minutes,
        format!(
            "UTC offset must be between {} and {} minutes",
            UTC_OFFSET_MINUTES.start(),
            UTC_OFFSET_MINUTES.end()
        ),
    ))
}

pub fn row_height_px(field: &str, px: f64) -> Result<()> {
    // NaN 不在任何範圍內
    if ROW_HEIGHT_PX.contains(&px) {
        return Ok(());
    }
    Err(invalid(
        field,
        px,
        format!(
            "Row height must be between {} and {} px",
            ROW_HEIGHT_PX.start(),
            ROW_HEIGHT_PX.end()
        ),
    ))
}

/// 逾時與更新間隔，至少一秒
pub fn interval_seconds(field: &str, seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(invalid(field, seconds, "Interval must be at least 1 second"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert!(endpoint("source.endpoint", "https://clinic.supabase.co/rest/v1/appointments").is_ok());
        assert!(endpoint("source.endpoint", "http://localhost:54321").is_ok());
        assert!(endpoint("source.endpoint", "").is_err());
        assert!(endpoint("source.endpoint", "not a url").is_err());
        assert!(endpoint("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_appointment_file() {
        assert!(appointment_file("source.path", "appointments.json").is_ok());
        assert!(appointment_file("source.path", "  ").is_err());

        let dir = tempfile::tempdir().unwrap();
        let err = appointment_file("source.path", &dir.path().to_string_lossy()).unwrap_err();
        assert!(err.to_string().contains("source.path"));
    }

    #[test]
    fn test_column_name_rejects_query_syntax() {
        assert!(column_name("source.start_column", "start_time").is_ok());
        assert!(column_name("source.start_column", "StartsAt2").is_ok());
        assert!(column_name("source.start_column", "").is_err());
        assert!(column_name("source.start_column", "start_time&select=secret").is_err());
        assert!(column_name("source.start_column", "start time").is_err());
    }

    #[test]
    fn test_utc_offset_bounds() {
        assert!(utc_offset_minutes("source.utc_offset_minutes", -720).is_ok());
        assert!(utc_offset_minutes("source.utc_offset_minutes", 840).is_ok());
        assert!(utc_offset_minutes("source.utc_offset_minutes", 841).is_err());
        assert!(utc_offset_minutes("source.utc_offset_minutes", i32::MAX).is_err());
    }

    #[test]
    fn test_row_height_bounds() {
        assert!(row_height_px("display.row_height_px", 60.0).is_ok());
        assert!(row_height_px("display.row_height_px", 4.0).is_err());
        assert!(row_height_px("display.row_height_px", f64::NAN).is_err());
    }

    #[test]
    fn test_require_and_interval() {
        let present = Some("appointments.json".to_string());
        let missing: Option<String> = None;
        assert!(require("source.path", &present).is_ok());
        assert!(matches!(
            require("source.path", &missing),
            Err(CalendarError::MissingConfigError { .. })
        ));

        assert!(interval_seconds("display.tick_seconds", 1).is_ok());
        assert!(interval_seconds("display.tick_seconds", 0).is_err());
    }
}
